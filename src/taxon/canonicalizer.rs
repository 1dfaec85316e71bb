//! Canonicalizes raw taxon labels (stripping authorship and year noise).
use crate::error::{CrateError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Parenthesised authorship citations, e.g. "(Kunth) H.Rob.".
static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("valid parenthetical regex"));

/// Epithets are lowercase latinized words, optionally hyphenated.
static EPITHET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z-]*$").expect("valid epithet regex"));

/// Infraspecific rank markers that stay part of the canonical form.
const RANK_MARKERS: [&str; 5] = ["var.", "subsp.", "ssp.", "f.", "forma"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Genus,
    Species,
}

/// A name reduced to its comparable form: genus plus epithets, authorship
/// and publication year removed, rank markers retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalName {
    pub value: String,
    pub rank: Rank,
    pub word_count: usize,
}

/// Strips authorship/year from a raw name string and classifies it by shape:
/// one token is a genus-rank name, two or more a species-rank name.
///
/// Pure and idempotent; fails only when nothing usable remains.
pub fn canonicalize(raw: &str) -> Result<CanonicalName> {
    let stripped = PARENTHETICAL.replace_all(raw, " ");
    let mut tokens = stripped.split_whitespace();

    let genus = match tokens.next() {
        Some(t) if t.chars().next().is_some_and(|c| c.is_alphabetic()) => t,
        _ => {
            return Err(CrateError::MalformedName {
                raw: raw.to_string(),
            });
        }
    };

    let mut kept: Vec<&str> = vec![genus];
    let mut pending_marker: Option<&str> = None;
    for token in tokens {
        if RANK_MARKERS.contains(&token) {
            pending_marker = Some(token);
            continue;
        }
        if EPITHET.is_match(token) {
            if let Some(marker) = pending_marker.take() {
                kept.push(marker);
            }
            kept.push(token);
            continue;
        }
        // Capitalized author abbreviation, year or citation junk: everything
        // from here on is authorship.
        break;
    }

    let word_count = kept.len();
    let rank = if word_count == 1 {
        Rank::Genus
    } else {
        Rank::Species
    };

    Ok(CanonicalName {
        value: kept.join(" "),
        rank,
        word_count,
    })
}

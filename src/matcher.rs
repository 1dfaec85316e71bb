//! Cascading matcher: consult reference sources in priority order, stop at
//! the first exact or within-threshold fuzzy hit.
use crate::distance::levenshtein;
use crate::source::{ReferenceRecord, ReferenceSource, SourceId};
use crate::taxon::canonicalizer::CanonicalName;
use log::warn;

/// Outcome of one cascaded resolution. `record` is None iff no source
/// produced a candidate within threshold.
#[derive(Debug)]
pub struct MatchResult {
    pub query: CanonicalName,
    pub record: Option<ReferenceRecord>,
    pub distance: Option<f64>,
    pub source: Option<SourceId>,
}

impl MatchResult {
    fn unmatched(query: CanonicalName) -> Self {
        Self {
            query,
            record: None,
            distance: None,
            source: None,
        }
    }
}

/// Resolves one canonical name against `sources` in their given order.
///
/// Per source: an exact candidate returns immediately with distance 0;
/// otherwise the closest candidate within `threshold` wins, ties broken by
/// the candidate's position in the source's natural order. A source that
/// errors is treated as "no candidates" and the cascade continues; only
/// when every source is exhausted does the result come back unmatched.
pub async fn resolve(
    query: &CanonicalName,
    sources: &[&ReferenceSource],
    threshold: f64,
    client: &reqwest::Client,
) -> MatchResult {
    if query.value.is_empty() {
        return MatchResult::unmatched(query.clone());
    }

    for source in sources {
        let candidates = match source.lookup(query, client).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    "source {} failed for '{}', treating as no match: {}",
                    source.id(),
                    query.value,
                    e
                );
                continue;
            }
        };

        let mut best: Option<(usize, ReferenceRecord)> = None;
        for candidate in candidates {
            let d = levenshtein(&query.value, &candidate.name);
            if d == 0 {
                return MatchResult {
                    query: query.clone(),
                    record: Some(candidate),
                    distance: Some(0.0),
                    source: Some(source.id()),
                };
            }
            // Strict < keeps the first occurrence on ties.
            if best.as_ref().is_none_or(|(bd, _)| d < *bd) {
                best = Some((d, candidate));
            }
        }

        if let Some((d, record)) = best {
            if (d as f64) <= threshold {
                return MatchResult {
                    query: query.clone(),
                    record: Some(record),
                    distance: Some(d as f64),
                    source: Some(source.id()),
                };
            }
        }
    }

    MatchResult::unmatched(query.clone())
}

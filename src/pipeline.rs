//! Per-batch orchestration: canonicalize, cascade, reconstruct, filter and
//! reconcile, one output row per input name no matter what fails.
use crate::matcher::{self, MatchResult};
use crate::reconciler::{GenusClassification, GenusReconciler};
use crate::source::{ReferenceSource, SourceId};
use crate::taxon::canonicalizer::{self, Rank};
use crate::taxon::filter;
use crate::taxon::record::{self, TaxonomicRecord};
use log::warn;

/// Runtime switches for one batch. The output column set never changes;
/// disabled steps just leave their columns null.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub threshold: f64,
    pub apply_filter: bool,
    pub reconcile_taxonomy: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 2.0,
            apply_filter: true,
            reconcile_taxonomy: true,
        }
    }
}

/// All cascade sources for one batch, in priority order. Genus-rank and
/// species-rank queries share the static tables and WoRMS but go to the
/// matching AlgaeBase endpoint, selected once per query from the canonical
/// rank.
pub struct SourceSet {
    sources: Vec<ReferenceSource>,
}

impl SourceSet {
    pub fn new(sources: Vec<ReferenceSource>) -> Self {
        Self { sources }
    }

    fn cascade_for(&self, rank: Rank) -> Vec<&ReferenceSource> {
        self.sources
            .iter()
            .filter(|s| match s.id() {
                SourceId::AlgaeBaseSpecies => rank == Rank::Species,
                SourceId::AlgaeBaseGenus => rank == Rank::Genus,
                _ => true,
            })
            .collect()
    }
}

/// One output row. Always present, even when every stage failed for the
/// query; `issues` explains any degradation.
#[derive(Debug, Default)]
pub struct ResolvedRow {
    pub query: String,
    pub canonical_name: Option<String>,
    pub rank: Option<Rank>,
    pub matched_source: Option<SourceId>,
    pub match_distance: Option<f64>,
    pub corrected_name: Option<String>,
    pub record: Option<TaxonomicRecord>,
    pub classification: Option<GenusClassification>,
    pub issues: Vec<String>,
}

/// Resolves a single raw name. Never fails: malformed input, unavailable
/// sources and filtered-out reconstructions all degrade to a row with null
/// fields and an issue note.
pub async fn resolve_one(
    raw: &str,
    sources: &SourceSet,
    config: &PipelineConfig,
    client: &reqwest::Client,
) -> ResolvedRow {
    let mut row = ResolvedRow {
        query: raw.to_string(),
        ..ResolvedRow::default()
    };

    let canonical = match canonicalizer::canonicalize(raw) {
        Ok(canonical) => canonical,
        Err(e) => {
            warn!("skipping unresolvable input: {e}");
            row.issues.push(format!("malformed name: {raw:?}"));
            return row;
        }
    };
    row.canonical_name = Some(canonical.value.clone());
    row.rank = Some(canonical.rank);

    let cascade = sources.cascade_for(canonical.rank);
    let MatchResult {
        record: candidate,
        distance,
        source,
        ..
    } = matcher::resolve(&canonical, &cascade, config.threshold, client).await;

    let Some(candidate) = candidate else {
        row.issues.push("no match within threshold".to_string());
        return row;
    };

    let mut taxo = record::reconstruct(&candidate);
    // Sources without structural fields (plain checklists) still feed the
    // genus reconciler via the matched name's first token.
    if taxo.genus.is_none() {
        taxo.genus = candidate.name.split_whitespace().next().map(str::to_string);
    }

    // Noted before the filter so a dropped resolution still reports its
    // upstream data defect.
    if taxo.ambiguous_rank {
        row.issues
            .push("ambiguous infraspecific rank: more than one epithet slot populated".to_string());
    }

    if config.apply_filter && !filter::accept(&taxo, &canonical, config.threshold) {
        row.issues.push(format!(
            "filtered: reconstructed name {:?} too distant from query",
            taxo.scientific_name.as_deref().unwrap_or_default()
        ));
        return row;
    }

    row.matched_source = source;
    row.match_distance = distance;
    row.corrected_name = Some(candidate.name);
    row.record = Some(taxo);
    row
}

/// Left-joins genus classification onto the rows that carry a record.
/// Row count and order are preserved; a genus the reconciler cannot
/// classify is surfaced as an issue, not an error.
pub async fn reconcile_rows(
    rows: &mut [ResolvedRow],
    reconciler: &GenusReconciler,
    client: &reqwest::Client,
) {
    let mut pending: Vec<usize> = Vec::new();
    let mut records: Vec<TaxonomicRecord> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        if let Some(record) = &row.record {
            pending.push(i);
            records.push(record.clone());
        }
    }

    let joined = reconciler.reconcile(records, client).await;
    for (i, (_, classification)) in pending.into_iter().zip(joined) {
        let row = &mut rows[i];
        if classification.is_none() {
            if let Some(genus) = row.record.as_ref().and_then(|r| r.genus.as_deref()) {
                row.issues
                    .push(format!("no genus classification for '{genus}'"));
            }
        }
        row.classification = classification;
    }
}

/// Full batch: resolve every name, then reconcile if enabled. One row per
/// input name, in input order.
pub async fn resolve_batch(
    names: &[String],
    sources: &SourceSet,
    reconciler: Option<&GenusReconciler>,
    config: &PipelineConfig,
    client: &reqwest::Client,
) -> Vec<ResolvedRow> {
    let mut rows = Vec::with_capacity(names.len());
    for name in names {
        rows.push(resolve_one(name, sources, config, client).await);
    }
    if config.reconcile_taxonomy {
        if let Some(reconciler) = reconciler {
            reconcile_rows(&mut rows, reconciler, client).await;
        }
    }
    rows
}

//! Joins genus-level classification onto species-level records, fetching
//! each distinct genus exactly once per batch.
use crate::source::ReferenceSource;
use crate::taxon::canonicalizer::{CanonicalName, Rank};
use crate::taxon::record::TaxonomicRecord;
use log::warn;
use std::collections::HashMap;
use std::sync::Mutex;

/// Genus-level classification, one row per distinct genus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenusClassification {
    pub genus: String,
    pub kingdom: Option<String>,
    pub phylum: Option<String>,
    pub class: Option<String>,
    pub order: Option<String>,
    pub family: Option<String>,
}

/// Per-batch reconciler. The cache lives for one batch only and stores
/// negative results too, so a genus that fails to resolve is still looked
/// up just once.
pub struct GenusReconciler {
    source: ReferenceSource,
    cache: Mutex<HashMap<String, Option<GenusClassification>>>,
}

impl GenusReconciler {
    pub fn new(source: ReferenceSource) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of distinct genera resolved so far in this batch.
    pub fn cached_genus_count(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Left join: every species row is retained, rows whose genus has no
    /// classification get None. Output length always equals input length.
    pub async fn reconcile(
        &self,
        records: Vec<TaxonomicRecord>,
        client: &reqwest::Client,
    ) -> Vec<(TaxonomicRecord, Option<GenusClassification>)> {
        let mut joined = Vec::with_capacity(records.len());
        for record in records {
            let classification = match &record.genus {
                Some(genus) => self.classify(genus, client).await,
                None => None,
            };
            joined.push((record, classification));
        }
        joined
    }

    async fn classify(
        &self,
        genus: &str,
        client: &reqwest::Client,
    ) -> Option<GenusClassification> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(cached) = cache.get(genus) {
                return cached.clone();
            }
        }

        let fetched = self.fetch(genus, client).await;

        // Double-checked insertion: with concurrent callers the first
        // completed lookup for a genus wins and later ones are discarded.
        if let Ok(mut cache) = self.cache.lock() {
            return cache
                .entry(genus.to_string())
                .or_insert(fetched)
                .clone();
        }
        fetched
    }

    async fn fetch(&self, genus: &str, client: &reqwest::Client) -> Option<GenusClassification> {
        let query = CanonicalName {
            value: genus.to_string(),
            rank: Rank::Genus,
            word_count: 1,
        };
        let candidates = match self.source.lookup(&query, client).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("genus lookup failed for '{genus}': {e}");
                return None;
            }
        };

        let candidate = candidates.into_iter().find(|c| c.name == genus)?;
        Some(GenusClassification {
            genus: genus.to_string(),
            kingdom: candidate.attr_str("kingdom").map(str::to_string),
            phylum: candidate.attr_str("phylum").map(str::to_string),
            class: candidate.attr_str("class").map(str::to_string),
            order: candidate.attr_str("order").map(str::to_string),
            family: candidate.attr_str("family").map(str::to_string),
        })
    }
}

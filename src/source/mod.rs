//! Reference source adapters: static name tables and remote lookup services.
pub mod algaebase;
pub mod table;
pub mod worms;

use crate::error::Result;
use crate::taxon::canonicalizer::CanonicalName;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

pub use algaebase::AlgaeBaseSource;
pub use table::TableSource;
pub use worms::WormsSource;

/// Identity of a reference source, in cascade priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    Dyntaxa,
    Nordic,
    Worms,
    AlgaeBaseSpecies,
    AlgaeBaseGenus,
}

impl SourceId {
    /// Short label used in logs and output column names.
    pub fn label(&self) -> &'static str {
        match self {
            SourceId::Dyntaxa => "dyntaxa",
            SourceId::Nordic => "nordic",
            SourceId::Worms => "worms",
            SourceId::AlgaeBaseSpecies => "algaebase",
            SourceId::AlgaeBaseGenus => "algaebase_genus",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceId::Dyntaxa => "Dyntaxa",
            SourceId::Nordic => "Nordic Microalgae",
            SourceId::Worms => "WoRMS",
            SourceId::AlgaeBaseSpecies => "AlgaeBase species",
            SourceId::AlgaeBaseGenus => "AlgaeBase genus",
        };
        f.write_str(name)
    }
}

/// Immutable snapshot of one candidate row from a reference source.
///
/// `attributes` carries whatever classification or identifier fields the
/// source provides, keyed by normalized names ("genus", "specific_epithet",
/// "forma", "subspecies", "variety", "scientific_name_id",
/// "accepted_name_usage_id", "kingdom", "phylum", "class", "order",
/// "family", ...).
#[derive(Debug, Clone)]
pub struct ReferenceRecord {
    pub name: String,
    pub source: SourceId,
    pub attributes: HashMap<String, Value>,
}

impl ReferenceRecord {
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// A queryable reference source. The adapters are async (two of them sit on
/// REST endpoints), so dispatch is an enum rather than a trait object.
pub enum ReferenceSource {
    Table(TableSource),
    Worms(WormsSource),
    AlgaeBase(AlgaeBaseSource),
}

impl ReferenceSource {
    pub fn id(&self) -> SourceId {
        match self {
            ReferenceSource::Table(t) => t.id(),
            ReferenceSource::Worms(_) => SourceId::Worms,
            ReferenceSource::AlgaeBase(a) => a.id(),
        }
    }

    /// Returns the source's candidate records for one canonical name.
    ///
    /// Transport and payload failures surface as errors; the caller decides
    /// whether that degrades to "no candidates".
    pub async fn lookup(
        &self,
        name: &CanonicalName,
        client: &reqwest::Client,
    ) -> Result<Vec<ReferenceRecord>> {
        match self {
            ReferenceSource::Table(t) => Ok(t.lookup(name)),
            ReferenceSource::Worms(w) => w.lookup(name, client).await,
            ReferenceSource::AlgaeBase(a) => a.lookup(name, client).await,
        }
    }
}

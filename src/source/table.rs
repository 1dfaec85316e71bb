//! In-memory name table adapter (Dyntaxa, Nordic Microalgae checklists).
use crate::source::{ReferenceRecord, SourceId};
use crate::taxon::canonicalizer::CanonicalName;

/// A static reference table held in memory. Row order is the source's
/// natural order and is preserved, so ties in the matcher break on first
/// occurrence.
pub struct TableSource {
    id: SourceId,
    rows: Vec<ReferenceRecord>,
}

impl TableSource {
    pub fn new(id: SourceId, rows: Vec<ReferenceRecord>) -> Self {
        Self { id, rows }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row is a candidate; the matcher owns the distance computation.
    pub fn lookup(&self, _name: &CanonicalName) -> Vec<ReferenceRecord> {
        self.rows.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxon::canonicalizer::canonicalize;
    use std::collections::HashMap;

    fn row(name: &str) -> ReferenceRecord {
        ReferenceRecord {
            name: name.to_string(),
            source: SourceId::Dyntaxa,
            attributes: HashMap::new(),
        }
    }

    #[test]
    fn lookup_preserves_row_order() {
        let table = TableSource::new(
            SourceId::Dyntaxa,
            vec![row("Azadinium"), row("Apedinella"), row("Attheya")],
        );
        let query = canonicalize("Azadinium").unwrap();
        let candidates = table.lookup(&query);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].name, "Azadinium");
        assert_eq!(candidates[2].name, "Attheya");
        assert_eq!(table.len(), 3);
        assert!(!table.is_empty());
    }
}

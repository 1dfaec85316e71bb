//! Last-line defense against loose remote matches: compare the rebuilt name
//! back to the original query under the same edit-distance rule.
use crate::distance::levenshtein;
use crate::taxon::canonicalizer::CanonicalName;
use crate::taxon::record::TaxonomicRecord;

/// Keep `record` when its reconstructed name cannot be judged (unset) or
/// lies within `threshold` of the query.
pub fn accept(record: &TaxonomicRecord, query: &CanonicalName, threshold: f64) -> bool {
    match &record.scientific_name {
        None => true,
        Some(name) => (levenshtein(name, &query.value) as f64) <= threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxon::canonicalizer::canonicalize;

    fn record_named(name: Option<&str>) -> TaxonomicRecord {
        TaxonomicRecord {
            scientific_name: name.map(str::to_string),
            ..TaxonomicRecord::default()
        }
    }

    #[test]
    fn unset_name_is_kept() {
        let query = canonicalize("Azadinium spinosum").unwrap();
        assert!(accept(&record_named(None), &query, 0.0));
    }

    #[test]
    fn close_name_is_kept() {
        let query = canonicalize("Azadinium spinosum").unwrap();
        assert!(accept(&record_named(Some("Azadinium spinosum")), &query, 0.0));
        assert!(accept(&record_named(Some("Azadinium spinosa")), &query, 2.0));
    }

    #[test]
    fn distant_name_is_dropped() {
        let query = canonicalize("Azadinium spinosum").unwrap();
        assert!(!accept(
            &record_named(Some("Amphidoma languida")),
            &query,
            2.0
        ));
    }
}

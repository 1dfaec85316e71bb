//! Rebuilds displayable scientific names from structural fields.
use crate::source::ReferenceRecord;

/// Rank of the single allowed infraspecific epithet, in display precedence
/// order (forma over subspecies over variety).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfraspecificRank {
    #[default]
    None,
    Forma,
    Subspecies,
    Variety,
}

impl InfraspecificRank {
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            InfraspecificRank::None => None,
            InfraspecificRank::Forma => Some("f."),
            InfraspecificRank::Subspecies => Some("subsp."),
            InfraspecificRank::Variety => Some("var."),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InfraspecificRank::None => "",
            InfraspecificRank::Forma => "forma",
            InfraspecificRank::Subspecies => "subspecies",
            InfraspecificRank::Variety => "variety",
        }
    }
}

/// A species-level record rebuilt from one reference candidate.
#[derive(Debug, Clone, Default)]
pub struct TaxonomicRecord {
    pub genus: Option<String>,
    pub specific_epithet: Option<String>,
    pub infraspecific_rank: InfraspecificRank,
    pub infraspecific_epithet: Option<String>,
    pub scientific_name: Option<String>,
    pub scientific_name_id: Option<String>,
    pub accepted_name_usage_id: Option<String>,
    /// The accepted name differs from this record's name and would need one
    /// further lookup (not performed here).
    pub needs_taxo_update: bool,
    /// More than one infraspecific epithet slot was populated upstream.
    pub ambiguous_rank: bool,
}

/// Rebuilds the display name for one matched candidate.
///
/// Exactly one of the forma/subspecies/variety slots should be populated;
/// when several are, the highest-precedence one is used for display and the
/// record is flagged `ambiguous_rank` instead of the conflict being silently
/// resolved. A record without genus and epithet keeps its name unset rather
/// than defaulting to an empty string.
pub fn reconstruct(candidate: &ReferenceRecord) -> TaxonomicRecord {
    let genus = candidate.attr_str("genus").map(str::to_string);
    let specific_epithet = candidate.attr_str("specific_epithet").map(str::to_string);

    let slots = [
        (InfraspecificRank::Forma, candidate.attr_str("forma")),
        (InfraspecificRank::Subspecies, candidate.attr_str("subspecies")),
        (InfraspecificRank::Variety, candidate.attr_str("variety")),
    ];
    let populated = slots.iter().filter(|(_, v)| v.is_some()).count();
    let (infraspecific_rank, infraspecific_epithet) = slots
        .iter()
        .find_map(|(rank, v)| v.map(|e| (*rank, Some(e.to_string()))))
        .unwrap_or((InfraspecificRank::None, None));

    let scientific_name = match (&genus, &specific_epithet) {
        (Some(g), Some(e)) => {
            let mut name = format!("{g} {e}");
            if let (Some(marker), Some(infra)) =
                (infraspecific_rank.marker(), &infraspecific_epithet)
            {
                name.push(' ');
                name.push_str(marker);
                name.push(' ');
                name.push_str(infra);
            }
            Some(name)
        }
        _ => None,
    };

    let scientific_name_id = candidate.attr_str("scientific_name_id").map(str::to_string);
    let accepted_name_usage_id = candidate
        .attr_str("accepted_name_usage_id")
        .map(str::to_string);
    let needs_taxo_update = accepted_name_usage_id != scientific_name_id;

    TaxonomicRecord {
        genus,
        specific_epithet,
        infraspecific_rank,
        infraspecific_epithet,
        scientific_name,
        scientific_name_id,
        accepted_name_usage_id,
        needs_taxo_update,
        ambiguous_rank: populated > 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceId;
    use serde_json::json;
    use std::collections::HashMap;

    fn candidate(fields: &[(&str, &str)]) -> ReferenceRecord {
        let attributes: HashMap<String, serde_json::Value> = fields
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        ReferenceRecord {
            name: "test".to_string(),
            source: SourceId::AlgaeBaseSpecies,
            attributes,
        }
    }

    #[test]
    fn variety_marker_in_display_name() {
        let record = reconstruct(&candidate(&[
            ("genus", "Azadinium"),
            ("specific_epithet", "spinifera"),
            ("variety", "concinnum"),
        ]));
        assert_eq!(
            record.scientific_name.as_deref(),
            Some("Azadinium spinifera var. concinnum")
        );
        assert_eq!(record.infraspecific_rank, InfraspecificRank::Variety);
        assert!(!record.ambiguous_rank);
    }

    #[test]
    fn plain_binomial_without_infraspecific_epithet() {
        let record = reconstruct(&candidate(&[
            ("genus", "Azadinium"),
            ("specific_epithet", "spinifera"),
        ]));
        assert_eq!(
            record.scientific_name.as_deref(),
            Some("Azadinium spinifera")
        );
        assert_eq!(record.infraspecific_rank, InfraspecificRank::None);
    }

    #[test]
    fn forma_takes_precedence_and_flags_ambiguity() {
        let record = reconstruct(&candidate(&[
            ("genus", "Gymnodinium"),
            ("specific_epithet", "lohmannii"),
            ("variety", "gracilis"),
            ("forma", "tenuis"),
        ]));
        assert_eq!(
            record.scientific_name.as_deref(),
            Some("Gymnodinium lohmannii f. tenuis")
        );
        assert!(record.ambiguous_rank);
    }

    #[test]
    fn subspecies_over_variety() {
        let record = reconstruct(&candidate(&[
            ("genus", "Chaetoceros"),
            ("specific_epithet", "decipiens"),
            ("subspecies", "singularis"),
            ("variety", "minor"),
        ]));
        assert_eq!(
            record.scientific_name.as_deref(),
            Some("Chaetoceros decipiens subsp. singularis")
        );
        assert!(record.ambiguous_rank);
    }

    #[test]
    fn missing_structural_fields_leave_name_unset() {
        let record = reconstruct(&candidate(&[("genus", "Azadinium")]));
        assert!(record.scientific_name.is_none());
        let record = reconstruct(&candidate(&[]));
        assert!(record.scientific_name.is_none());
        assert!(record.genus.is_none());
    }

    #[test]
    fn needs_taxo_update_on_id_mismatch() {
        let record = reconstruct(&candidate(&[
            ("genus", "Azadinium"),
            ("specific_epithet", "spinosum"),
            ("scientific_name_id", "52921"),
            ("accepted_name_usage_id", "52921"),
        ]));
        assert!(!record.needs_taxo_update);

        let record = reconstruct(&candidate(&[
            ("scientific_name_id", "52921"),
            ("accepted_name_usage_id", "60110"),
        ]));
        assert!(record.needs_taxo_update);

        // One side missing counts as a mismatch; both missing does not.
        let record = reconstruct(&candidate(&[("scientific_name_id", "52921")]));
        assert!(record.needs_taxo_update);
        let record = reconstruct(&candidate(&[]));
        assert!(!record.needs_taxo_update);
    }
}

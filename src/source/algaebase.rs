//! AlgaeBase REST adapter (species and genus endpoints).
use crate::error::{CrateError, Result};
use crate::source::{ReferenceRecord, SourceId};
use crate::taxon::canonicalizer::CanonicalName;
use log::warn;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use urlencoding::encode;

const ALGAEBASE_API_URL: &str = "https://api.algaebase.org/v1.3";
const API_KEY_HEADER: &str = "abapikey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Species,
    Genus,
}

/// Remote adapter for AlgaeBase. The service requires an API key; without
/// one the adapter reports itself unavailable and the cascade moves on.
pub struct AlgaeBaseSource {
    endpoint: Endpoint,
    api_key: Option<String>,
}

#[derive(Deserialize, Debug)]
struct AlgaeBaseResponse {
    #[serde(default)]
    result: Vec<HashMap<String, Value>>,
}

impl AlgaeBaseSource {
    pub fn species(api_key: Option<String>) -> Self {
        Self {
            endpoint: Endpoint::Species,
            api_key,
        }
    }

    pub fn genus(api_key: Option<String>) -> Self {
        Self {
            endpoint: Endpoint::Genus,
            api_key,
        }
    }

    pub fn id(&self) -> SourceId {
        match self.endpoint {
            Endpoint::Species => SourceId::AlgaeBaseSpecies,
            Endpoint::Genus => SourceId::AlgaeBaseGenus,
        }
    }

    pub async fn lookup(
        &self,
        name: &CanonicalName,
        client: &reqwest::Client,
    ) -> Result<Vec<ReferenceRecord>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            CrateError::SourceUnavailable {
                source_name: self.id().to_string(),
                reason: "no API key configured".to_string(),
            }
        })?;

        let url = match self.endpoint {
            Endpoint::Species => format!(
                "{}/species?scientificname={}",
                ALGAEBASE_API_URL,
                encode(&name.value)
            ),
            Endpoint::Genus => {
                format!("{}/genus?genus={}", ALGAEBASE_API_URL, encode(&name.value))
            }
        };

        let response = client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(CrateError::ApiRequestError)?;

        // AlgaeBase answers 404 for names it has never heard of.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(CrateError::ApiStatusError {
                status: response.status(),
                query: name.value.clone(),
            });
        }

        let payload: AlgaeBaseResponse = response
            .json()
            .await
            .map_err(CrateError::ApiJsonDecodeError)?;

        let id = self.id();
        let records = payload
            .result
            .into_iter()
            .filter_map(|row| to_reference_record(row, id, &name.value))
            .collect();
        Ok(records)
    }
}

/// Normalizes one DwC-flavoured AlgaeBase result row. The candidate name is
/// rebuilt from the structural fields because `dwc:scientificName` carries
/// authorship.
fn to_reference_record(
    row: HashMap<String, Value>,
    id: SourceId,
    query: &str,
) -> Option<ReferenceRecord> {
    let mut attributes: HashMap<String, Value> = HashMap::new();
    let mut copy = |from: &str, to: &str| {
        if let Some(v) = string_field(&row, from) {
            attributes.insert(to.to_string(), json!(v));
        }
    };
    copy("dwc:genus", "genus");
    copy("dwc:specificEpithet", "specific_epithet");
    copy("infraspecificEpithet_forma", "forma");
    copy("infraspecificEpithet_subspecies", "subspecies");
    copy("infraspecificEpithet_variety", "variety");
    copy("dwc:kingdom", "kingdom");
    copy("dwc:phylum", "phylum");
    copy("dwc:class", "class");
    copy("dwc:order", "order");
    copy("dwc:family", "family");
    copy("dwc:taxonomicStatus", "status");
    copy("dwc:scientificNameID", "scientific_name_id");
    copy("dwc:acceptedNameUsageID", "accepted_name_usage_id");

    let genus = string_field(&row, "dwc:genus")?;
    let name = match id {
        SourceId::AlgaeBaseGenus => genus,
        _ => {
            let epithet = match string_field(&row, "dwc:specificEpithet") {
                Some(e) => e,
                None => {
                    warn!("AlgaeBase row for '{query}' lacks a specific epithet; skipped");
                    return None;
                }
            };
            format!("{genus} {epithet}")
        }
    };

    Some(ReferenceRecord {
        name,
        source: id,
        attributes,
    })
}

// IDs come back as numbers or strings depending on the endpoint version.
fn string_field(row: &HashMap<String, Value>, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

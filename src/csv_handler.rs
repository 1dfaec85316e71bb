use crate::error::{CrateError, Result};
use crate::source::{ReferenceRecord, SourceId};
use log::warn;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

const NAME_COLUMN: &str = "scientific_name";

/// Loads the batch of raw name strings to resolve.
///
/// Accepts either a CSV with a `scientific_name` column or a headerless
/// one-name-per-line list. Order is preserved; empty values in a CSV column
/// are rejected with their row number.
pub fn load_name_list(file_path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(file_path)?;

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for result in reader.records() {
        rows.push(result?);
    }
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let name_column = first
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(NAME_COLUMN));

    match name_column {
        Some(column) => {
            let mut names = Vec::with_capacity(rows.len().saturating_sub(1));
            for (i, row) in rows.iter().enumerate().skip(1) {
                let value = row.get(column).unwrap_or("").trim();
                if value.is_empty() {
                    return Err(CrateError::MissingValue {
                        column: NAME_COLUMN.to_string(),
                        row: i + 1,
                    });
                }
                names.push(value.to_string());
            }
            Ok(names)
        }
        None => {
            // Headerless plain list: one raw name per line.
            Ok(rows
                .iter()
                .filter_map(|row| row.get(0))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect())
        }
    }
}

/// Loads a tab-delimited reference checklist into source rows.
///
/// The name column is `ScientificName` or `scientific_name` (matched
/// case-insensitively); every other column is carried along as a record
/// attribute under its lowercased header.
pub fn load_reference_table(file_path: &Path, id: SourceId) -> Result<Vec<ReferenceRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(file_path)?;

    let headers = reader.headers()?.clone();
    let name_column = headers
        .iter()
        .position(|h| {
            let h = h.trim().to_lowercase();
            h == "scientificname" || h == NAME_COLUMN
        })
        .ok_or_else(|| CrateError::MissingNameColumn {
            path: file_path.display().to_string(),
        })?;

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let name = record.get(name_column).unwrap_or("").trim();
        if name.is_empty() {
            warn!(
                "skipping row {} of {}: empty scientific name",
                i + 2,
                file_path.display()
            );
            continue;
        }

        let mut attributes = HashMap::new();
        for (j, header) in headers.iter().enumerate() {
            if j == name_column {
                continue;
            }
            if let Some(value) = record.get(j).map(str::trim).filter(|v| !v.is_empty()) {
                attributes.insert(header.trim().to_lowercase(), json!(value));
            }
        }

        rows.push(ReferenceRecord {
            name: name.to_string(),
            source: id,
            attributes,
        });
    }

    Ok(rows)
}

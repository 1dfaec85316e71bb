pub mod cli;
pub mod csv_handler;
pub mod distance;
pub mod error;
pub mod matcher;
pub mod pipeline;
pub mod reconciler;
pub mod source;
pub mod taxon;

use chrono::Utc;
use clap::Parser;
use cli::Cli;
use csv::WriterBuilder;
use error::{CrateError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use pipeline::{PipelineConfig, ResolvedRow, SourceSet};
use reconciler::GenusReconciler;
use reqwest::Client;
use source::{AlgaeBaseSource, ReferenceSource, SourceId, TableSource, WormsSource};
use std::path::Path;
use std::time::Instant;

pub const USER_AGENT: &str =
    "taxmatch/0.1 (https://github.com/your_repo; your_email@example.com) reqwest/0.12";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .format_target(false)
        .format_timestamp_secs()
        .filter_level(log::LevelFilter::Info)
        .try_init()
        .expect("Failed to initialize logger");

    let cli = Cli::parse();
    info!("Starting taxonomic name resolution...");
    info!("Input file: {:?}", cli.input_file);
    info!("Output file: {:?}", cli.output_file);
    info!("Edit-distance threshold: {}", cli.threshold);

    let start_time = Instant::now();
    let started_at = Utc::now();

    let names = match csv_handler::load_name_list(&cli.input_file) {
        Ok(names) => {
            info!("Loaded {} names to resolve.", names.len());
            names
        }
        Err(e) => {
            log::error!("Failed to load input name list: {}", e);
            return Err(e);
        }
    };
    if names.is_empty() {
        info!("Input is empty. Exiting.");
        return Ok(());
    }

    let algaebase_key = cli
        .algaebase_key
        .clone()
        .or_else(|| std::env::var("ALGAEBASE_API_KEY").ok());
    if algaebase_key.is_none() {
        warn!("No AlgaeBase API key configured; AlgaeBase sources will be skipped.");
    }

    let sources = build_sources(&cli, algaebase_key.clone())?;
    let reconciler = (!cli.skip_taxonomy).then(|| {
        GenusReconciler::new(ReferenceSource::AlgaeBase(AlgaeBaseSource::genus(
            algaebase_key,
        )))
    });

    let config = PipelineConfig {
        threshold: cli.threshold,
        apply_filter: !cli.skip_filter,
        reconcile_taxonomy: !cli.skip_taxonomy,
    };

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(CrateError::ApiRequestError)?;

    // Resolve one query at a time; a failing row never aborts the batch.
    let pb = ProgressBar::new(names.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .expect("Failed to set progress bar style")
        .progress_chars("##-"));

    let mut rows: Vec<ResolvedRow> = Vec::with_capacity(names.len());
    for name in &names {
        pb.set_message(format!("Resolving: {}", name));
        rows.push(pipeline::resolve_one(name, &sources, &config, &client).await);
        pb.inc(1);
    }

    if let Some(reconciler) = &reconciler {
        pb.set_message("Reconciling genus classification");
        pipeline::reconcile_rows(&mut rows, reconciler, &client).await;
    }
    pb.finish_with_message("Resolution complete.");

    write_output(&rows, &cli.output_file)?;
    info!("Result table written to {:?}", cli.output_file);

    let resolved = rows.iter().filter(|r| r.record.is_some()).count();
    let exact = rows.iter().filter(|r| r.match_distance == Some(0.0)).count();
    let malformed = rows
        .iter()
        .filter(|r| r.issues.iter().any(|i| i.starts_with("malformed")))
        .count();
    let filtered = rows
        .iter()
        .filter(|r| r.issues.iter().any(|i| i.starts_with("filtered")))
        .count();
    let gaps = rows
        .iter()
        .filter(|r| {
            r.issues
                .iter()
                .any(|i| i.contains("no genus classification"))
        })
        .count();
    let unresolved = rows.len() - resolved;

    let duration = start_time.elapsed();
    println!("\n--- Summary Report ---");
    println!("Run started: {}", started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("Names queried: {}", rows.len());
    println!("Resolved: {} ({} exact)", resolved, exact);
    println!("Unresolved: {}", unresolved);
    if malformed > 0 {
        println!("Malformed input names: {}", malformed);
    }
    if filtered > 0 {
        println!("Dropped by the result filter: {}", filtered);
    }
    if let Some(reconciler) = &reconciler {
        println!(
            "Distinct genera looked up: {}",
            reconciler.cached_genus_count()
        );
        if gaps > 0 {
            println!("Species without genus classification: {}", gaps);
        }
    }
    let problematic = rows.iter().filter(|r| !r.issues.is_empty()).count();
    if problematic > 0 {
        println!(
            "Rows with issues: {} (see the issues column in {})",
            problematic,
            cli.output_file.display()
        );
    }
    println!("Total execution time: {:.2?}", duration);

    Ok(())
}

/// Assembles the cascade in its fixed priority order: static checklists
/// first, then the remote matchers.
fn build_sources(cli: &Cli, algaebase_key: Option<String>) -> Result<SourceSet> {
    let mut sources = Vec::new();

    if let Some(path) = &cli.dyntaxa_table {
        let rows = csv_handler::load_reference_table(path, SourceId::Dyntaxa)?;
        info!("Loaded Dyntaxa checklist: {} rows.", rows.len());
        sources.push(ReferenceSource::Table(TableSource::new(
            SourceId::Dyntaxa,
            rows,
        )));
    }
    if let Some(path) = &cli.nordic_table {
        let rows = csv_handler::load_reference_table(path, SourceId::Nordic)?;
        info!("Loaded Nordic Microalgae checklist: {} rows.", rows.len());
        sources.push(ReferenceSource::Table(TableSource::new(
            SourceId::Nordic,
            rows,
        )));
    }
    if !cli.skip_worms {
        sources.push(ReferenceSource::Worms(WormsSource::new(cli.marine_only)));
    }
    sources.push(ReferenceSource::AlgaeBase(AlgaeBaseSource::species(
        algaebase_key.clone(),
    )));
    sources.push(ReferenceSource::AlgaeBase(AlgaeBaseSource::genus(
        algaebase_key,
    )));

    Ok(SourceSet::new(sources))
}

const OUTPUT_HEADERS: [&str; 20] = [
    "query",
    "canonical_name",
    "rank",
    "matched_source",
    "match_distance",
    "corrected_dyntaxa",
    "corrected_nordic",
    "corrected_worms",
    "corrected_algaebase",
    "scientific_name",
    "scientific_name_id",
    "accepted_name_usage_id",
    "infraspecific_rank",
    "needs_taxo_update",
    "kingdom",
    "phylum",
    "class",
    "order",
    "family",
    "issues",
];

/// Writes one tab-delimited row per input name. The column set is fixed;
/// unmatched or disabled fields stay empty.
fn write_output(rows: &[ResolvedRow], path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_path(path)?;
    writer.write_record(OUTPUT_HEADERS)?;

    for row in rows {
        let corrected = |column: SourceId| -> &str {
            match (row.matched_source, &row.corrected_name) {
                (Some(source), Some(name)) if source_column(source) == column => name,
                _ => "",
            }
        };
        let record = row.record.as_ref();
        let classification = row.classification.as_ref();
        let rank = match row.rank {
            Some(taxon::canonicalizer::Rank::Genus) => "genus",
            Some(taxon::canonicalizer::Rank::Species) => "species",
            None => "",
        };
        let distance = row
            .match_distance
            .map(|d| format!("{d}"))
            .unwrap_or_default();
        let needs_update = record
            .map(|r| bool_to_label(r.needs_taxo_update))
            .unwrap_or("");
        let issues = row.issues.join("; ");

        writer.write_record([
            row.query.as_str(),
            row.canonical_name.as_deref().unwrap_or(""),
            rank,
            row.matched_source.map(|s| s.label()).unwrap_or(""),
            distance.as_str(),
            corrected(SourceId::Dyntaxa),
            corrected(SourceId::Nordic),
            corrected(SourceId::Worms),
            corrected(SourceId::AlgaeBaseSpecies),
            record.and_then(|r| r.scientific_name.as_deref()).unwrap_or(""),
            record
                .and_then(|r| r.scientific_name_id.as_deref())
                .unwrap_or(""),
            record
                .and_then(|r| r.accepted_name_usage_id.as_deref())
                .unwrap_or(""),
            record.map(|r| r.infraspecific_rank.as_str()).unwrap_or(""),
            needs_update,
            classification.and_then(|c| c.kingdom.as_deref()).unwrap_or(""),
            classification.and_then(|c| c.phylum.as_deref()).unwrap_or(""),
            classification.and_then(|c| c.class.as_deref()).unwrap_or(""),
            classification.and_then(|c| c.order.as_deref()).unwrap_or(""),
            classification.and_then(|c| c.family.as_deref()).unwrap_or(""),
            issues.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Both AlgaeBase endpoints report in the same output column.
fn source_column(source: SourceId) -> SourceId {
    match source {
        SourceId::AlgaeBaseGenus => SourceId::AlgaeBaseSpecies,
        other => other,
    }
}

fn bool_to_label(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxon::record::TaxonomicRecord;
    use std::fs;
    use tempfile::NamedTempFile;

    #[test]
    fn output_has_stable_columns_for_degraded_rows() {
        let rows = vec![
            ResolvedRow {
                query: "Azadinium spinosum".to_string(),
                canonical_name: Some("Azadinium spinosum".to_string()),
                rank: Some(taxon::canonicalizer::Rank::Species),
                matched_source: Some(SourceId::Nordic),
                match_distance: Some(0.0),
                corrected_name: Some("Azadinium spinosum".to_string()),
                record: Some(TaxonomicRecord {
                    genus: Some("Azadinium".to_string()),
                    scientific_name: Some("Azadinium spinosum".to_string()),
                    ..TaxonomicRecord::default()
                }),
                classification: None,
                issues: Vec::new(),
            },
            ResolvedRow {
                query: "(?)".to_string(),
                issues: vec!["malformed name: \"(?)\"".to_string()],
                ..ResolvedRow::default()
            },
        ];

        let file = NamedTempFile::new().unwrap();
        write_output(&rows, file.path()).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split('\t').count(), OUTPUT_HEADERS.len());
        for line in &lines[1..] {
            assert_eq!(line.split('\t').count(), OUTPUT_HEADERS.len());
        }
        assert!(lines[1].contains("Azadinium spinosum"));
        assert!(lines[2].starts_with("(?)\t"));
        assert!(lines[2].contains("malformed name"));
    }
}

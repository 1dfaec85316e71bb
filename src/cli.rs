use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the input name list (CSV with a scientific_name column, or
    /// one raw name per line).
    #[arg(short, long, value_name = "FILE")]
    pub input_file: PathBuf,

    /// Path for the tab-delimited result table.
    #[arg(short, long, value_name = "FILE")]
    pub output_file: PathBuf,

    /// Maximum Levenshtein distance for a fuzzy match.
    #[arg(short, long, default_value_t = 2.0)]
    pub threshold: f64,

    /// Tab-delimited Dyntaxa checklist (ScientificName column required).
    #[arg(long, value_name = "FILE")]
    pub dyntaxa_table: Option<PathBuf>,

    /// Tab-delimited Nordic Microalgae checklist.
    #[arg(long, value_name = "FILE")]
    pub nordic_table: Option<PathBuf>,

    /// Restrict WoRMS matching to marine taxa.
    #[arg(long)]
    pub marine_only: bool,

    /// Skip the WoRMS remote source entirely.
    #[arg(long)]
    pub skip_worms: bool,

    /// AlgaeBase API key (falls back to the ALGAEBASE_API_KEY environment
    /// variable; without one the AlgaeBase sources are skipped).
    #[arg(long, value_name = "KEY")]
    pub algaebase_key: Option<String>,

    /// Keep reconstructed records even when they are distant from the query.
    #[arg(long)]
    pub skip_filter: bool,

    /// Skip the genus classification join.
    #[arg(long)]
    pub skip_taxonomy: bool,
}

// Basic tests for CLI parsing
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = vec!["taxmatch", "-i", "names.csv", "-o", "resolved.tsv"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.input_file, PathBuf::from("names.csv"));
        assert_eq!(cli.output_file, PathBuf::from("resolved.tsv"));
        assert_eq!(cli.threshold, 2.0);
        assert!(!cli.skip_filter);
        assert!(!cli.skip_taxonomy);
        assert!(!cli.marine_only);
        assert!(cli.dyntaxa_table.is_none());
    }

    #[test]
    fn test_cli_full_configuration() {
        let args = vec![
            "taxmatch",
            "-i",
            "names.csv",
            "-o",
            "resolved.tsv",
            "-t",
            "1.5",
            "--dyntaxa-table",
            "dyntaxa.tsv",
            "--nordic-table",
            "nordic.tsv",
            "--algaebase-key",
            "secret",
            "--skip-filter",
            "--skip-taxonomy",
            "--marine-only",
        ];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.threshold, 1.5);
        assert_eq!(cli.dyntaxa_table, Some(PathBuf::from("dyntaxa.tsv")));
        assert_eq!(cli.nordic_table, Some(PathBuf::from("nordic.tsv")));
        assert_eq!(cli.algaebase_key.as_deref(), Some("secret"));
        assert!(cli.skip_filter);
        assert!(cli.skip_taxonomy);
        assert!(cli.marine_only);
    }

    #[test]
    fn test_cli_missing_output() {
        // clap exits the process on Cli::parse, so go through try_parse.
        let args = vec!["taxmatch", "-i", "names.csv"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}

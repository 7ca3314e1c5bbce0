pub mod analyse;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Audit OCR-scanned bank statement exports.",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a statement export, split it by month, reconcile subtotals and flag anomalies.
    AnalyseBankData {
        /// Path to the query file.
        #[arg(short = 'q', long = "query_file", value_parser = existing_file)]
        query_file: PathBuf,
        /// Directory for the generated CSV reports (default: current directory)
        #[arg(long = "output-dir")]
        output_dir: Option<PathBuf>,
        /// Standard deviations from an account's mean before a transaction is an anomaly
        #[arg(long)]
        threshold: Option<f64>,
        /// JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn existing_file(raw: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("Path '{raw}' does not exist."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_short_and_long_flags() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        std::fs::write(&input, "").unwrap();
        let input_str = input.to_str().unwrap();

        let cli = Cli::try_parse_from(["tally", "analyse-bank-data", "-q", input_str]).unwrap();
        let Commands::AnalyseBankData { query_file, threshold, .. } = cli.command;
        assert_eq!(query_file, input);
        assert_eq!(threshold, None);

        let cli = Cli::try_parse_from([
            "tally",
            "analyse-bank-data",
            "--query_file",
            input_str,
            "--threshold",
            "3",
        ])
        .unwrap();
        let Commands::AnalyseBankData { threshold, .. } = cli.command;
        assert_eq!(threshold, Some(3.0));
    }

    #[test]
    fn test_missing_file_is_usage_error() {
        let result = Cli::try_parse_from(["tally", "analyse-bank-data", "-q", "/no/such/file.csv"]);
        let err = result.err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_query_file_is_required() {
        let result = Cli::try_parse_from(["tally", "analyse-bank-data"]);
        assert_eq!(result.err().unwrap().kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}

mod anomaly;
mod cli;
mod error;
mod export;
mod importer;
mod logging;
mod models;
mod normalizer;
mod ocr;
mod partitioner;
mod pipeline;
mod reconciler;
mod settings;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::AnalyseBankData {
            query_file,
            output_dir,
            threshold,
            config,
        } => cli::analyse::run(&query_file, output_dir, threshold, config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

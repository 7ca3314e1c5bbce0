use std::path::Path;

use tracing::{info, info_span, Dispatch};

use crate::anomaly::identify_transaction_anomalies;
use crate::error::Result;
use crate::export::write_transactions;
use crate::importer::load_rows;
use crate::normalizer::clean_and_normalize;
use crate::partitioner::identify_individual_transactions;
use crate::reconciler::{analyse_aggregated_data, YearlyVerdict};
use crate::settings::Settings;

pub const CLEANED_DATA_FILE: &str = "cleaned_data_file.csv";

#[derive(Debug)]
pub struct RunSummary {
    pub rows: usize,
    pub months: Vec<u32>,
    pub discrepancies: usize,
    pub anomalies: usize,
    pub verdict: YearlyVerdict,
}

/// The five audit stages run in order over one loaded table. Logging is
/// supplied by the caller; each stage runs under that dispatch.
pub struct Pipeline {
    settings: Settings,
    dispatch: Dispatch,
}

impl Pipeline {
    pub fn new(settings: Settings, dispatch: Dispatch) -> Self {
        Self { settings, dispatch }
    }

    fn stage<T>(&self, name: &'static str, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, || {
            let _span = info_span!("stage", name).entered();
            f()
        })
    }

    pub fn run(&self, query_file: &Path) -> Result<RunSummary> {
        let out_dir = self.settings.output_dir.as_path();

        let raw = self.stage("load", || load_rows(query_file))?;
        let rows = raw.len();

        let cleaned = self.stage("normalize", || -> Result<_> {
            let cleaned = clean_and_normalize(raw)?;
            let path = out_dir.join(CLEANED_DATA_FILE);
            write_transactions(&path, &cleaned)?;
            info!("The cleaned data is saved in {}", path.display());
            Ok(cleaned)
        })?;

        let monthly = self.stage("partition", || identify_individual_transactions(&cleaned, out_dir))?;
        let report = self.stage("reconcile", || analyse_aggregated_data(&cleaned, &monthly, out_dir))?;
        let anomalies = self.stage("anomaly", || {
            identify_transaction_anomalies(&cleaned, self.settings.std_dev_multiplier, out_dir)
        })?;

        let summary = RunSummary {
            rows,
            months: monthly.keys().copied().collect(),
            discrepancies: report.discrepancies.len(),
            anomalies: anomalies.len(),
            verdict: report.verdict,
        };
        self.stage("summary", || {
            info!(
                rows = summary.rows,
                months = ?summary.months,
                discrepancies = summary.discrepancies,
                anomalies = summary.anomalies,
                verdict = ?summary.verdict,
                "Analysis complete"
            )
        });
        Ok(summary)
    }
}

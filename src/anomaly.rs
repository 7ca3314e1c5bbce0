use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::Result;
use crate::export::write_csv;
use crate::models::{AnomalyRecord, Transaction};

pub const ANOMALY_FILE: &str = "ANOMALIES.csv";
pub const DEFAULT_STD_DEV_MULTIPLIER: f64 = 2.0;
const ANOMALY_HEADERS: &[&str] = &[
    "Account Number",
    "Transaction Date",
    "Transaction Type",
    "Amount",
    "Anomaly",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl AccountStats {
    /// Mean and sample standard deviation (n - 1). Needs two values.
    pub fn from_amounts(amounts: &[i64]) -> Option<Self> {
        if amounts.len() < 2 {
            return None;
        }
        let n = amounts.len() as f64;
        let mean = amounts.iter().map(|&a| a as f64).sum::<f64>() / n;
        let variance = amounts
            .iter()
            .map(|&a| (a as f64 - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        Some(Self { mean, std_dev: variance.sqrt() })
    }

    pub fn is_outlier(&self, amount: i64, multiplier: f64) -> bool {
        let amount = amount as f64;
        let band = multiplier * self.std_dev;
        amount < self.mean - band || amount > self.mean + band
    }
}

/// Only real transactions with a recognised type take part in the statistics.
fn is_scored(txn: &Transaction) -> bool {
    !txn.is_sentinel() && txn.transaction_code.is_some()
}

/// One flag per row, in input order. Rows are grouped by account; a group
/// with fewer than two known amounts never flags, nor does a missing amount.
/// Subtotal and yearly-total rows and rows of unknown type are never flagged.
pub fn flag_anomalies(cleaned: &[Transaction], multiplier: f64) -> Vec<bool> {
    let mut by_account: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, txn) in cleaned.iter().enumerate().filter(|(_, t)| is_scored(t)) {
        by_account.entry(txn.account_number.as_str()).or_default().push(i);
    }

    let mut flags = vec![false; cleaned.len()];
    for indices in by_account.values() {
        let amounts: Vec<i64> = indices.iter().filter_map(|&i| cleaned[i].amount).collect();
        let Some(stats) = AccountStats::from_amounts(&amounts) else {
            continue;
        };
        for &i in indices {
            if let Some(amount) = cleaned[i].amount {
                flags[i] = stats.is_outlier(amount, multiplier);
            }
        }
    }
    flags
}

/// Flag outliers per account and write them, without their transaction code,
/// to the anomaly report. Returns the flagged rows.
pub fn identify_transaction_anomalies(
    cleaned: &[Transaction],
    multiplier: f64,
    out_dir: &Path,
) -> Result<Vec<Transaction>> {
    let flags = flag_anomalies(cleaned, multiplier);
    debug!("Flagging the anomalies");

    let flagged: Vec<Transaction> = cleaned
        .iter()
        .zip(&flags)
        .filter(|(_, flag)| **flag)
        .map(|(txn, _)| txn.clone())
        .collect();
    debug!(count = flagged.len(), multiplier, "Anomalies have been flagged");

    let path = out_dir.join(ANOMALY_FILE);
    write_csv(&path, ANOMALY_HEADERS, flagged.iter().map(AnomalyRecord::from))?;
    info!("The anomalies identified from data have been saved in {}", path.display());

    Ok(flagged)
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::export::write_csv;
use crate::models::Transaction;
use crate::partitioner::MonthlyGroups;

pub const DISCREPANCY_FILE: &str = "SUBTOTAL_DESCREPENCIES_BY_MONTH.csv";
const DISCREPANCY_HEADERS: &[&str] = &["Month", "Subtotal", "Calculated Total"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discrepancy {
    #[serde(rename = "Month")]
    pub month: u32,
    /// `None` when the subtotal row's own amount could not be read.
    #[serde(rename = "Subtotal")]
    pub subtotal: Option<i64>,
    #[serde(rename = "Calculated Total", serialize_with = "as_text")]
    pub calculated_total: i128,
}

fn as_text<S: Serializer>(total: &i128, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(total)
}

/// Outcome of comparing the yearly-total row with the sum of subtotals.
/// Agreement is not proof of correctness, so there is no "reliable" variant.
/// Sums are widened to `i128` so no run of valid amounts can overflow.
#[derive(Debug, Clone, PartialEq)]
pub enum YearlyVerdict {
    TotalsAgree { yearly_total: i64, subtotal_sum: i128 },
    Unreliable { yearly_total: i64, subtotal_sum: i128 },
    CannotVerify { subtotal_sum: i128 },
}

#[derive(Debug)]
pub struct ReconcileReport {
    pub discrepancies: Vec<Discrepancy>,
    pub verdict: YearlyVerdict,
    pub path: PathBuf,
}

/// Per-month sum over real transactions; sentinel rows and missing amounts
/// are left out.
pub fn monthly_totals(groups: &MonthlyGroups) -> BTreeMap<u32, i128> {
    groups
        .iter()
        .map(|(month, rows)| {
            let total = rows
                .iter()
                .filter(|t| !t.is_sentinel())
                .filter_map(|t| t.amount)
                .map(i128::from)
                .sum();
            (*month, total)
        })
        .collect()
}

pub fn find_discrepancies(cleaned: &[Transaction], totals: &BTreeMap<u32, i128>) -> Vec<Discrepancy> {
    cleaned
        .iter()
        .filter(|t| t.is_subtotal())
        .filter_map(|row| {
            let month = row.month();
            let calculated_total = *totals.get(&month)?;
            (row.amount.map(i128::from) != Some(calculated_total)).then_some(Discrepancy {
                month,
                subtotal: row.amount,
                calculated_total,
            })
        })
        .collect()
}

pub fn check_yearly_total(cleaned: &[Transaction]) -> YearlyVerdict {
    let subtotal_sum: i128 = cleaned
        .iter()
        .filter(|t| t.is_subtotal())
        .filter_map(|t| t.amount)
        .map(i128::from)
        .sum();

    let yearly_total = cleaned.iter().find(|t| t.is_yearly_total()).and_then(|t| t.amount);
    match yearly_total {
        None => YearlyVerdict::CannotVerify { subtotal_sum },
        Some(yearly_total) if i128::from(yearly_total) == subtotal_sum => {
            YearlyVerdict::TotalsAgree { yearly_total, subtotal_sum }
        }
        Some(yearly_total) => YearlyVerdict::Unreliable { yearly_total, subtotal_sum },
    }
}

fn log_verdict(verdict: &YearlyVerdict) {
    match verdict {
        YearlyVerdict::TotalsAgree { .. } => info!(
            "Since the yearly total is equal to sum of subtotals, there might be some missing data values. \
             The reliability of data should be checked"
        ),
        YearlyVerdict::Unreliable { yearly_total, subtotal_sum } => {
            info!(yearly_total, %subtotal_sum, "The data is unreliable")
        }
        YearlyVerdict::CannotVerify { subtotal_sum } => warn!(
            %subtotal_sum,
            "No usable yearly total row found; cannot verify the sum of subtotals"
        ),
    }
}

/// Cross-check every subtotal row against its month, write the discrepancy
/// report (header-only when clean), then check the yearly total.
pub fn analyse_aggregated_data(
    cleaned: &[Transaction],
    groups: &MonthlyGroups,
    out_dir: &Path,
) -> Result<ReconcileReport> {
    let totals = monthly_totals(groups);
    debug!("Calculation of subtotal is complete");

    let discrepancies = find_discrepancies(cleaned, &totals);
    let path = out_dir.join(DISCREPANCY_FILE);
    write_csv(&path, DISCREPANCY_HEADERS, &discrepancies)?;

    if discrepancies.is_empty() {
        info!("No discrepancies found");
    } else {
        for d in &discrepancies {
            debug!(month = d.month, subtotal = ?d.subtotal, calculated = %d.calculated_total, "subtotal mismatch");
        }
        info!("Discrepancies are found and are saved in {}", path.display());
    }
    debug!("Data discrepancies have been logged");

    let verdict = check_yearly_total(cleaned);
    log_verdict(&verdict);

    Ok(ReconcileReport { discrepancies, verdict, path })
}

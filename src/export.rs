use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::models::{Transaction, TransactionRecord};

pub const TRANSACTION_HEADERS: &[&str] = &[
    "Account Number",
    "Transaction Date",
    "Transaction Type",
    "Amount",
    "Transaction Code",
];

/// Write `rows` under an explicit header line, so an empty report is still a
/// valid header-only CSV. The file is flushed and closed before returning.
pub fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: impl IntoIterator<Item = T>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    wtr.write_record(headers)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_transactions<'a>(
    path: &Path,
    txns: impl IntoIterator<Item = &'a Transaction>,
) -> Result<()> {
    write_csv(path, TRANSACTION_HEADERS, txns.into_iter().map(TransactionRecord::from))
}

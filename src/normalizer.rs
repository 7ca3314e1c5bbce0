use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::error::{AuditError, Result};
use crate::models::{RawRow, RepairedRow, Transaction, TransactionCode, TransactionType};
use crate::ocr::clean_ocr_errors;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y", "%d %b %Y", "%b %d, %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Month-first when the day and month are ambiguous.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Withdrawals are negative, deposits positive; other codes pass through.
/// An amount with no positive counterpart (`i64::MIN`) becomes missing.
pub fn normalize_amount(code: Option<TransactionCode>, amount: Option<i64>) -> Option<i64> {
    match (code, amount) {
        (Some(TransactionCode::Debit), Some(a)) if a > 0 => Some(-a),
        (Some(TransactionCode::Deposit), Some(a)) if a < 0 => a.checked_neg(),
        _ => amount,
    }
}

fn normalize_row(index: usize, row: RepairedRow) -> Result<Transaction> {
    let transaction_code = match row.transaction_type.parse::<TransactionType>() {
        Ok(t) => Some(t.code()),
        Err(e) => {
            warn!(row = index + 1, "{e}; amount left as-is");
            None
        }
    };
    let transaction_date = parse_date(&row.transaction_date).ok_or_else(|| AuditError::InvalidDate {
        row: index + 1,
        value: row.transaction_date.clone(),
    })?;

    Ok(Transaction {
        account_number: row.account_number,
        transaction_date,
        transaction_type: row.transaction_type,
        amount: normalize_amount(transaction_code, row.amount),
        transaction_code,
    })
}

/// OCR repair, code lookup, sign normalization and the (date, account) sort.
/// The first unparseable date aborts the batch.
pub fn clean_and_normalize(rows: Vec<RawRow>) -> Result<Vec<Transaction>> {
    let repaired = clean_ocr_errors(rows);

    let mut cleaned = repaired
        .into_iter()
        .enumerate()
        .map(|(i, row)| normalize_row(i, row))
        .collect::<Result<Vec<_>>>()?;
    debug!("The data has been normalised based on Deposit and Withdrawal");

    cleaned.sort_by(|a, b| {
        a.transaction_date
            .cmp(&b.transaction_date)
            .then_with(|| a.account_number.cmp(&b.account_number))
    });
    debug!("The data is sorted date wise");

    let unresolved = cleaned.iter().filter(|t| t.transaction_code.is_none()).count();
    if unresolved > 0 {
        warn!("{unresolved} rows have an unrecognised transaction type");
    }
    info!("The OCR errors have been cleaned and the data has been normalised on the basis of Deposit and Withdrawal");
    Ok(cleaned)
}

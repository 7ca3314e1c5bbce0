use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::{RawRow, RepairedRow};

fn amount_re() -> &'static Regex {
    static AMOUNT_RE: OnceLock<Regex> = OnceLock::new();
    AMOUNT_RE.get_or_init(|| Regex::new(r"-?\d+").expect("valid amount pattern"))
}

/// Undo the usual OCR confusions in an account identifier: `l` read for `1`,
/// `O` read for `0`.
pub fn repair_account(raw: &str) -> String {
    raw.replace('l', "1").replace('O', "0")
}

/// First signed integer run in a noisy amount field. Text without digits,
/// or a run whose magnitude does not fit in `i64`, yields `None`.
pub fn extract_amount(raw: &str) -> Option<i64> {
    amount_re()
        .find(raw)?
        .as_str()
        .parse::<i64>()
        .ok()
        .filter(|&a| a != i64::MIN)
}

/// Row count and order are preserved.
pub fn clean_ocr_errors(rows: Vec<RawRow>) -> Vec<RepairedRow> {
    let repaired: Vec<RepairedRow> = rows
        .into_iter()
        .map(|row| RepairedRow {
            account_number: repair_account(&row.account_number),
            amount: extract_amount(&row.amount),
            transaction_date: row.transaction_date,
            transaction_type: row.transaction_type,
        })
        .collect();

    debug!("OCR errors present in account numbers have been cleaned");
    repaired
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(account: &str, amount: &str) -> RawRow {
        RawRow {
            account_number: account.to_string(),
            transaction_date: "2023-01-01".to_string(),
            transaction_type: "Deposit".to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_repair_account() {
        assert_eq!(repair_account("l0O4"), "1004");
        assert_eq!(repair_account("SUBTOTAL"), "SUBT0TAL");
        assert_eq!(repair_account("YEARLY TOTAL"), "YEARLY T0TAL");
        assert_eq!(repair_account("123456"), "123456");
        // only lowercase l and uppercase O are confusions
        assert_eq!(repair_account("Lo"), "Lo");
    }

    #[test]
    fn test_extract_amount() {
        assert_eq!(extract_amount("250"), Some(250));
        assert_eq!(extract_amount("-75"), Some(-75));
        assert_eq!(extract_amount("$120 approx"), Some(120));
        assert_eq!(extract_amount("USD -40.99"), Some(-40));
        assert_eq!(extract_amount("approx"), None);
        assert_eq!(extract_amount(""), None);
    }

    #[test]
    fn test_extract_amount_ignores_account_substitutions() {
        // 'l' in an amount is not rewritten to '1'
        assert_eq!(extract_amount("$1l2 approx"), Some(1));
    }

    #[test]
    fn test_extract_amount_overflow_is_missing() {
        assert_eq!(extract_amount("99999999999999999999999"), None);
        // no positive counterpart, so sign normalization could not flip it
        assert_eq!(extract_amount("-9223372036854775808"), None);
        assert_eq!(extract_amount("-9223372036854775807"), Some(-i64::MAX));
        assert_eq!(extract_amount("9223372036854775807"), Some(i64::MAX));
    }

    #[test]
    fn test_clean_ocr_errors_keeps_count_and_order() {
        let rows = vec![raw("l23", "10"), raw("O9", "junk"), raw("SUBTOTAL", "-5")];
        let cleaned = clean_ocr_errors(rows);
        let accounts: Vec<&str> = cleaned.iter().map(|r| r.account_number.as_str()).collect();
        assert_eq!(accounts, vec!["123", "09", "SUBT0TAL"]);
        let amounts: Vec<Option<i64>> = cleaned.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![Some(10), None, Some(-5)]);
    }
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::export::write_transactions;
use crate::models::Transaction;

/// Rows keyed by calendar month number (1-12). Years are not distinguished.
pub type MonthlyGroups = BTreeMap<u32, Vec<Transaction>>;

pub fn monthly_file_name(month: u32) -> String {
    format!("monthly_transactions_{month}.csv")
}

/// Group rows by month, keeping the input order within each month.
pub fn group_by_month<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> MonthlyGroups {
    let mut groups = MonthlyGroups::new();
    for txn in txns {
        groups.entry(txn.month()).or_default().push(txn.clone());
    }
    groups
}

/// Write one file per month holding only real transactions, and return the
/// unfiltered grouping (sentinel rows included) for reconciliation.
pub fn identify_individual_transactions(cleaned: &[Transaction], out_dir: &Path) -> Result<MonthlyGroups> {
    let monthly = group_by_month(cleaned);
    debug!("The data grouping is complete (based on month)");

    let individual = group_by_month(cleaned.iter().filter(|t| !t.is_sentinel()));
    info!("The identification of individual transactions is complete");

    for (month, rows) in &individual {
        let path: PathBuf = out_dir.join(monthly_file_name(*month));
        write_transactions(&path, rows)?;
        debug!(month, rows = rows.len(), path = %path.display(), "monthly file written");
    }

    Ok(monthly)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionCode;
    use chrono::NaiveDate;

    fn txn(account: &str, y: i32, m: u32, d: u32, amount: i64) -> Transaction {
        Transaction {
            account_number: account.to_string(),
            transaction_date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            transaction_type: "Online Transfer".to_string(),
            transaction_code: Some(TransactionCode::OnlineTransfer),
            amount: Some(amount),
        }
    }

    fn data_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .skip(1)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_group_by_month_collapses_years() {
        let txns = vec![txn("1", 2022, 3, 1, 5), txn("1", 2023, 3, 1, 6), txn("1", 2023, 4, 1, 7)];
        let groups = group_by_month(&txns);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&3].len(), 2);
        assert_eq!(groups[&4].len(), 1);
    }

    #[test]
    fn test_monthly_files_exclude_sentinels() {
        let dir = tempfile::tempdir().unwrap();
        let txns = vec![
            txn("100", 2023, 1, 2, 10),
            txn("200", 2023, 1, 3, 20),
            txn("SUBT0TAL", 2023, 1, 31, 30),
            txn("300", 2023, 2, 1, 40),
            txn("SUBT0TAL", 2023, 2, 28, 40),
            txn("YEARLY T0TAL", 2023, 12, 31, 70),
        ];
        let groups = identify_individual_transactions(&txns, dir.path()).unwrap();

        // returned grouping still holds the sentinel rows
        assert_eq!(groups[&1].len(), 3);
        assert_eq!(groups[&2].len(), 2);
        assert_eq!(groups[&12].len(), 1);

        assert_eq!(data_lines(&dir.path().join("monthly_transactions_1.csv")).len(), 2);
        assert_eq!(data_lines(&dir.path().join("monthly_transactions_2.csv")).len(), 1);
        // a month holding only sentinel rows gets no file
        assert!(!dir.path().join("monthly_transactions_12.csv").exists());
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let dir = tempfile::tempdir().unwrap();
        let txns = vec![
            txn("100", 2023, 1, 2, 10),
            txn("100", 2023, 2, 2, 11),
            txn("SUBT0TAL", 2023, 2, 28, 11),
            txn("200", 2023, 3, 2, 12),
            txn("300", 2023, 3, 9, 13),
        ];
        identify_individual_transactions(&txns, dir.path()).unwrap();

        let mut written: Vec<String> = (1..=12)
            .map(|m| dir.path().join(monthly_file_name(m)))
            .filter(|p| p.exists())
            .flat_map(|p| data_lines(&p))
            .collect();
        written.sort();
        let mut expected = vec![
            "100,2023-01-02,Online Transfer,10,1",
            "100,2023-02-02,Online Transfer,11,1",
            "200,2023-03-02,Online Transfer,12,1",
            "300,2023-03-09,Online Transfer,13,1",
        ];
        expected.sort();
        assert_eq!(written, expected);
    }
}

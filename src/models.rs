use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Sentinel account values as they look after OCR repair ('O' becomes '0').
pub const SUBTOTAL_SENTINEL: &str = "SUBT0TAL";
pub const YEARLY_TOTAL_SENTINEL: &str = "YEARLY T0TAL";
const YEARLY_MARKER: &str = "YEARLY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    OnlineTransfer,
    CardPayment,
    AtmWithdrawal,
    DirectDebit,
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransactionCode {
    OnlineTransfer = 1,
    CardPayment = 2,
    Debit = 3,
    Deposit = 4,
}

impl TransactionCode {
    pub fn value(self) -> u8 {
        self as u8
    }
}

const ALL_TYPES: &[TransactionType] = &[
    TransactionType::OnlineTransfer,
    TransactionType::CardPayment,
    TransactionType::AtmWithdrawal,
    TransactionType::DirectDebit,
    TransactionType::Deposit,
    TransactionType::Withdrawal,
];

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::OnlineTransfer => "Online Transfer",
            Self::CardPayment => "Card Payment",
            Self::AtmWithdrawal => "ATM Withdrawal",
            Self::DirectDebit => "Direct Debit",
            Self::Deposit => "Deposit",
            Self::Withdrawal => "Withdrawal",
        }
    }

    pub fn code(&self) -> TransactionCode {
        match self {
            Self::OnlineTransfer => TransactionCode::OnlineTransfer,
            Self::CardPayment => TransactionCode::CardPayment,
            Self::AtmWithdrawal | Self::DirectDebit | Self::Withdrawal => TransactionCode::Debit,
            Self::Deposit => TransactionCode::Deposit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTransactionType(pub String);

impl fmt::Display for UnknownTransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transaction type: {:?}", self.0)
    }
}

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_TYPES
            .iter()
            .find(|t| t.label() == s)
            .copied()
            .ok_or_else(|| UnknownTransactionType(s.to_string()))
    }
}

/// One input row exactly as it appears in the statement export.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Account Number")]
    pub account_number: String,
    #[serde(rename = "Transaction Date")]
    pub transaction_date: String,
    #[serde(rename = "Transaction Type")]
    pub transaction_type: String,
    #[serde(rename = "Amount")]
    pub amount: String,
}

/// Row after OCR repair: account fixed, amount reduced to a number.
#[derive(Debug, Clone, PartialEq)]
pub struct RepairedRow {
    pub account_number: String,
    pub transaction_date: String,
    pub transaction_type: String,
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub account_number: String,
    pub transaction_date: NaiveDate,
    pub transaction_type: String,
    pub transaction_code: Option<TransactionCode>,
    pub amount: Option<i64>,
}

impl Transaction {
    pub fn month(&self) -> u32 {
        self.transaction_date.month()
    }

    /// Aggregate marker rows: any subtotal or yearly-total row.
    pub fn is_sentinel(&self) -> bool {
        self.account_number.contains(SUBTOTAL_SENTINEL)
            || self.account_number.contains(YEARLY_MARKER)
    }

    pub fn is_subtotal(&self) -> bool {
        self.account_number == SUBTOTAL_SENTINEL
    }

    pub fn is_yearly_total(&self) -> bool {
        self.account_number == YEARLY_TOTAL_SENTINEL
    }
}

/// Output row for the cleaned table and the monthly files.
#[derive(Debug, Serialize)]
pub struct TransactionRecord<'a> {
    #[serde(rename = "Account Number")]
    pub account_number: &'a str,
    #[serde(rename = "Transaction Date")]
    pub transaction_date: String,
    #[serde(rename = "Transaction Type")]
    pub transaction_type: &'a str,
    #[serde(rename = "Amount")]
    pub amount: Option<i64>,
    #[serde(rename = "Transaction Code")]
    pub transaction_code: Option<u8>,
}

impl<'a> From<&'a Transaction> for TransactionRecord<'a> {
    fn from(txn: &'a Transaction) -> Self {
        Self {
            account_number: &txn.account_number,
            transaction_date: txn.transaction_date.format("%Y-%m-%d").to_string(),
            transaction_type: &txn.transaction_type,
            amount: txn.amount,
            transaction_code: txn.transaction_code.map(TransactionCode::value),
        }
    }
}

/// Output row for the anomaly report; carries no transaction code.
#[derive(Debug, Serialize)]
pub struct AnomalyRecord<'a> {
    #[serde(rename = "Account Number")]
    pub account_number: &'a str,
    #[serde(rename = "Transaction Date")]
    pub transaction_date: String,
    #[serde(rename = "Transaction Type")]
    pub transaction_type: &'a str,
    #[serde(rename = "Amount")]
    pub amount: Option<i64>,
    #[serde(rename = "Anomaly")]
    pub anomaly: bool,
}

impl<'a> From<&'a Transaction> for AnomalyRecord<'a> {
    fn from(txn: &'a Transaction) -> Self {
        Self {
            account_number: &txn.account_number,
            transaction_date: txn.transaction_date.format("%Y-%m-%d").to_string(),
            transaction_type: &txn.transaction_type,
            amount: txn.amount,
            anomaly: true,
        }
    }
}

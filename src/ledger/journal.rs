use super::accounts::ChartOfAccounts;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Description used when none is given.
pub const DEFAULT_DESCRIPTION: &str = "取引";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum JournalError {
    #[error("amount must be greater than zero: {0}")]
    NonPositiveAmount(Decimal),
    #[error("debit and credit accounts must differ: {0}")]
    SameAccount(String),
    #[error("unknown account: {0}")]
    UnknownAccount(String),
    #[error("journal entry not found: {0}")]
    EntryNotFound(String),
}

/// One double-entry transaction (仕訳).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    #[schemars(with = "String")]
    pub date: NaiveDate,
    pub description: String,
    pub debit_account: String,
    pub credit_account: String,
    #[schemars(with = "String")]
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// Input for a new entry, before validation.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub date: NaiveDate,
    pub description: String,
    pub debit_account: String,
    pub credit_account: String,
    pub amount: Decimal,
    pub memo: String,
}

/// Entries newest first. Entries are never edited in place: only added or
/// deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Journal(Vec<JournalEntry>);

impl Journal {
    pub fn new(entries: Vec<JournalEntry>) -> Self {
        Journal(entries)
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Validate and prepend an entry, returning its id.
    pub fn add(&mut self, entry: NewEntry, chart: &ChartOfAccounts) -> Result<String, JournalError> {
        if entry.amount <= Decimal::ZERO {
            return Err(JournalError::NonPositiveAmount(entry.amount));
        }
        for account in [&entry.debit_account, &entry.credit_account] {
            if !chart.contains(account) {
                return Err(JournalError::UnknownAccount(account.clone()));
            }
        }
        if entry.debit_account == entry.credit_account {
            return Err(JournalError::SameAccount(entry.debit_account));
        }

        let id = self.next_id();
        let description = entry.description.trim();
        let memo = entry.memo.trim();
        let journal_entry = JournalEntry {
            id: id.clone(),
            date: entry.date,
            description: if description.is_empty() {
                DEFAULT_DESCRIPTION.to_string()
            } else {
                description.to_string()
            },
            debit_account: entry.debit_account,
            credit_account: entry.credit_account,
            amount: entry.amount,
            memo: (!memo.is_empty()).then(|| memo.to_string()),
        };
        log::debug!(
            "journal add {}: {} / {} {}",
            id,
            journal_entry.debit_account,
            journal_entry.credit_account,
            journal_entry.amount
        );
        self.0.insert(0, journal_entry);
        Ok(id)
    }

    pub fn delete(&mut self, id: &str) -> Result<JournalEntry, JournalError> {
        let index = self
            .0
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| JournalError::EntryNotFound(id.to_string()))?;
        Ok(self.0.remove(index))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    fn next_id(&self) -> String {
        let next = self
            .0
            .iter()
            .filter_map(|e| e.id.strip_prefix("je-")?.parse::<u64>().ok())
            .max()
            .map_or(1, |n| n + 1);
        format!("je-{next:04}")
    }
}

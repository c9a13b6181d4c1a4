//! Blue-return bookkeeping: chart of accounts, journal and statements.

pub mod accounts;
pub mod journal;
pub mod statements;

pub use accounts::{Account, AccountType, ChartOfAccounts};
pub use journal::{Journal, JournalEntry, JournalError, NewEntry};
pub use statements::{
    compute_balances, compute_statements, compute_statements_with, BalanceSheet,
    FinancialStatements, LedgerSummary, ProfitAndLoss, StatementLine,
};

//! Profit & loss and balance sheet from the journal.
//!
//! Raw balances follow the T-account convention: a debit adds the amount to
//! the debit account, a credit subtracts it from the credit account. Credit
//! normal accounts (liabilities, equity, revenue) therefore hold negative raw
//! balances and are negated when totalled or displayed.

use super::accounts::{Account, AccountType, ChartOfAccounts, NameCollator};
use super::journal::JournalEntry;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signed raw balance per account id.
pub fn compute_balances(entries: &[JournalEntry]) -> BTreeMap<String, Decimal> {
    let mut balances: BTreeMap<String, Decimal> = BTreeMap::new();
    for entry in entries {
        *balances.entry(entry.debit_account.clone()).or_default() += entry.amount;
        *balances.entry(entry.credit_account.clone()).or_default() -= entry.amount;
    }
    balances
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementLine {
    pub account: Account,
    /// Raw signed ledger balance.
    pub balance: Decimal,
}

impl StatementLine {
    /// Balance with credit-normal accounts flipped positive.
    pub fn display_balance(&self) -> Decimal {
        if self.account.account_type.is_credit_normal() {
            -self.balance
        } else {
            self.balance
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitAndLoss {
    pub revenue: Vec<StatementLine>,
    pub expenses: Vec<StatementLine>,
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
}

impl ProfitAndLoss {
    pub fn summary(&self, updated_at: DateTime<Utc>) -> LedgerSummary {
        LedgerSummary {
            total_revenue: self.total_revenue,
            total_expenses: self.total_expenses,
            net_income: self.net_income,
            updated_at,
        }
    }
}

/// Headline figures kept in the profile after each statements run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    pub assets: Vec<StatementLine>,
    pub liabilities: Vec<StatementLine>,
    pub equity: Vec<StatementLine>,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    /// Equity accounts only; net income is added in `total_liabilities_and_equity`.
    pub total_equity: Decimal,
    pub total_liabilities_and_equity: Decimal,
}

impl BalanceSheet {
    /// Assets minus liabilities and equity. Zero for a balanced ledger; any
    /// other value is reported, never corrected.
    pub fn discrepancy(&self) -> Decimal {
        self.total_assets - self.total_liabilities_and_equity
    }

    pub fn is_balanced(&self) -> bool {
        self.discrepancy().is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialStatements {
    pub profit_and_loss: ProfitAndLoss,
    pub balance_sheet: BalanceSheet,
}

/// Statements over the standard chart of accounts.
pub fn compute_statements(entries: &[JournalEntry]) -> FinancialStatements {
    compute_statements_with(&ChartOfAccounts::standard(), entries)
}

/// Statements over `chart`. Accounts missing from the chart are left out of
/// every section.
pub fn compute_statements_with(
    chart: &ChartOfAccounts,
    entries: &[JournalEntry],
) -> FinancialStatements {
    let balances = compute_balances(entries);
    let collator = NameCollator::japanese();

    let pick = |account_type: AccountType| -> Vec<StatementLine> {
        let mut lines: Vec<StatementLine> = balances
            .iter()
            .filter_map(|(id, balance)| {
                let account = chart.get(id)?;
                (account.account_type == account_type && !balance.is_zero()).then(|| {
                    StatementLine {
                        account: account.clone(),
                        balance: *balance,
                    }
                })
            })
            .collect();
        lines.sort_by(|a, b| collator.compare(&a.account, &b.account));
        lines
    };

    let revenue = pick(AccountType::Revenue);
    let expenses = pick(AccountType::Expense);
    let assets = pick(AccountType::Asset);
    let liabilities = pick(AccountType::Liability);
    let equity = pick(AccountType::Equity);

    let total_revenue: Decimal = revenue.iter().map(|l| -l.balance).sum();
    let total_expenses: Decimal = expenses.iter().map(|l| l.balance).sum();
    let net_income = total_revenue - total_expenses;

    let total_assets: Decimal = assets.iter().map(|l| l.balance).sum();
    let total_liabilities: Decimal = liabilities.iter().map(|l| -l.balance).sum();
    let total_equity: Decimal = equity.iter().map(|l| -l.balance).sum();
    let total_liabilities_and_equity = total_liabilities + total_equity + net_income;

    log::debug!(
        "statements: revenue={}, expenses={}, assets={}, liabilities+equity={}",
        total_revenue,
        total_expenses,
        total_assets,
        total_liabilities_and_equity
    );

    FinancialStatements {
        profit_and_loss: ProfitAndLoss {
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            net_income,
        },
        balance_sheet: BalanceSheet {
            assets,
            liabilities,
            equity,
            total_assets,
            total_liabilities,
            total_equity,
            total_liabilities_and_equity,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(debit: &str, credit: &str, amount: Decimal) -> JournalEntry {
        JournalEntry {
            id: format!("{debit}-{credit}-{amount}"),
            date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            description: "取引".to_string(),
            debit_account: debit.to_string(),
            credit_account: credit.to_string(),
            amount,
            memo: None,
        }
    }

    fn sample_ledger() -> Vec<JournalEntry> {
        vec![
            entry("bank", "capital", dec!(1_000_000)),
            entry("bank", "long_term_loans", dec!(500_000)),
            entry("equipment", "bank", dec!(300_000)),
            entry("cash", "sales", dec!(800_000)),
            entry("accounts_receivable", "service_revenue", dec!(200_000)),
            entry("rent", "bank", dec!(120_000)),
            entry("utilities", "accounts_payable", dec!(30_000)),
            entry("misc_expense", "cash", dec!(5_500)),
        ]
    }

    #[test]
    fn balances_follow_t_account_signs() {
        let balances = compute_balances(&sample_ledger());
        assert_eq!(balances["bank"], dec!(1_080_000));
        assert_eq!(balances["capital"], dec!(-1_000_000));
        assert_eq!(balances["sales"], dec!(-800_000));
        assert_eq!(balances["cash"], dec!(794_500));
        // Every debit has a matching credit.
        assert_eq!(balances.values().copied().sum::<Decimal>(), Decimal::ZERO);
    }

    #[test]
    fn profit_and_loss_totals() {
        let statements = compute_statements(&sample_ledger());
        let pl = &statements.profit_and_loss;
        assert_eq!(pl.total_revenue, dec!(1_000_000));
        assert_eq!(pl.total_expenses, dec!(155_500));
        assert_eq!(pl.net_income, dec!(844_500));
        assert_eq!(pl.revenue.len(), 2);
        assert_eq!(pl.revenue[0].display_balance(), dec!(800_000));
    }

    #[test]
    fn balanced_ledger_has_no_discrepancy() {
        let statements = compute_statements(&sample_ledger());
        let bs = &statements.balance_sheet;
        assert_eq!(bs.total_assets, dec!(2_374_500));
        assert_eq!(bs.total_liabilities, dec!(530_000));
        assert_eq!(bs.total_equity, dec!(1_000_000));
        assert_eq!(bs.total_assets, bs.total_liabilities_and_equity);
        assert!(bs.is_balanced());
    }

    #[test]
    fn unknown_account_shows_as_discrepancy() {
        let mut entries = sample_ledger();
        entries.push(entry("cash", "suspense", dec!(10_000)));
        let bs = compute_statements(&entries).balance_sheet;
        assert_eq!(bs.discrepancy(), dec!(10_000));
        assert!(!bs.is_balanced());
    }

    #[test]
    fn zero_balances_are_excluded() {
        let entries = vec![
            entry("cash", "sales", dec!(1_000)),
            entry("bank", "cash", dec!(1_000)),
        ];
        let statements = compute_statements(&entries);
        let assets: Vec<&str> = statements
            .balance_sheet
            .assets
            .iter()
            .map(|l| l.account.id.as_str())
            .collect();
        assert_eq!(assets, ["bank"]);
    }

    #[test]
    fn rows_sorted_by_account_name() {
        let statements = compute_statements(&sample_ledger());
        let expenses: Vec<&str> = statements
            .profit_and_loss
            .expenses
            .iter()
            .map(|l| l.account.id.as_str())
            .collect();
        assert_eq!(expenses, ["misc_expense", "utilities", "rent"]);
    }

    #[test]
    fn asset_rows_in_japanese_order() {
        let entries = vec![
            entry("bank", "capital", dec!(500_000)),
            entry("cash", "capital", dec!(100_000)),
            entry("accounts_receivable", "sales", dec!(80_000)),
            entry("inventory", "capital", dec!(40_000)),
            entry("equipment", "capital", dec!(60_000)),
        ];
        let assets: Vec<String> = compute_statements(&entries)
            .balance_sheet
            .assets
            .into_iter()
            .map(|l| l.account.name)
            .collect();
        assert_eq!(assets, ["現金", "棚卸資産", "売掛金", "備品", "普通預金"]);
    }

    #[test]
    fn empty_journal() {
        let statements = compute_statements(&[]);
        assert_eq!(statements, FinancialStatements::default());
        assert!(statements.balance_sheet.is_balanced());
    }

    #[test]
    fn statements_are_idempotent() {
        let entries = sample_ledger();
        assert_eq!(compute_statements(&entries), compute_statements(&entries));
    }

    #[test]
    fn custom_chart() {
        let chart = ChartOfAccounts::new(vec![
            Account::new("wallet", "財布", AccountType::Asset),
            Account::new("gift", "贈与", AccountType::Revenue),
        ]);
        let entries = vec![entry("wallet", "gift", dec!(50_000))];
        let statements = compute_statements_with(&chart, &entries);
        assert_eq!(statements.balance_sheet.total_assets, dec!(50_000));
        assert_eq!(statements.profit_and_loss.net_income, dec!(50_000));
        assert!(statements.balance_sheet.is_balanced());
    }
}

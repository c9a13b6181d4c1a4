//! Ledger command - blue-return journal and financial statements

use crate::cmd::{print_json, GlobalOpts};
use crate::ledger::{
    compute_statements_with, ChartOfAccounts, FinancialStatements, Journal, JournalEntry, NewEntry,
    StatementLine,
};
use crate::money::{format_yen, parse_amount};
use crate::store::{keys, FileStore, KeyValueStore};
use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Record a journal entry (仕訳)
    Add(AddArgs),
    /// Delete a journal entry by id
    Delete {
        /// Entry id (e.g. je-0001)
        id: String,
    },
    /// List journal entries, newest first
    List {
        /// Output as JSON instead of formatted table
        #[arg(long)]
        json: bool,
    },
    /// Profit & loss and balance sheet
    Statements {
        /// Output as JSON instead of formatted tables
        #[arg(long)]
        json: bool,
    },
    /// Delete every journal entry
    Clear,
    /// List the chart of accounts
    Accounts,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Entry date (YYYY-MM-DD)
    #[arg(short, long)]
    date: NaiveDate,

    /// Debit account id (e.g. rent)
    #[arg(long)]
    debit: String,

    /// Credit account id (e.g. bank)
    #[arg(long)]
    credit: String,

    /// Amount in yen
    #[arg(short, long)]
    amount: String,

    /// Description (摘要)
    #[arg(long, default_value = "")]
    description: String,

    /// Free-form memo
    #[arg(long, default_value = "")]
    memo: String,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Debit")]
    debit: String,
    #[tabled(rename = "Credit")]
    credit: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

impl LedgerCommand {
    pub fn exec(&self, global: &GlobalOpts) -> anyhow::Result<()> {
        let chart = ChartOfAccounts::standard();
        let mut store = global.open_store();
        let mut journal: Journal = store.get(keys::JOURNAL).unwrap_or_default();

        match self {
            LedgerCommand::Add(args) => {
                let Some(amount) = parse_amount(&args.amount) else {
                    anyhow::bail!("amount is not a number: {}", args.amount);
                };
                let id = journal.add(
                    NewEntry {
                        date: args.date,
                        description: args.description.clone(),
                        debit_account: args.debit.clone(),
                        credit_account: args.credit.clone(),
                        amount,
                        memo: args.memo.clone(),
                    },
                    &chart,
                )?;
                store.set(keys::JOURNAL, &journal)?;
                log::info!("recorded {}", id);
                println!("{}", id);
            }
            LedgerCommand::Delete { id } => {
                let removed = journal.delete(id)?;
                store.set(keys::JOURNAL, &journal)?;
                log::info!("deleted {} ({})", removed.id, removed.description);
            }
            LedgerCommand::Clear => {
                let count = journal.len();
                journal.clear();
                store.set(keys::JOURNAL, &journal)?;
                log::info!("cleared {} entries", count);
            }
            LedgerCommand::List { json } => {
                if *json {
                    print_json(journal.entries())?;
                } else {
                    print_entries(journal.entries(), &chart);
                }
            }
            LedgerCommand::Statements { json } => {
                let statements = compute_statements_with(&chart, journal.entries());
                save_summary(&mut store, &statements)?;
                if *json {
                    print_json(&statements)?;
                } else {
                    print_statements(&statements);
                }
            }
            LedgerCommand::Accounts => {
                for account in chart.accounts() {
                    println!(
                        "{:<22} {:<10} {}",
                        account.id,
                        account.account_type.display(),
                        account.name
                    );
                }
            }
        }
        Ok(())
    }
}

fn save_summary(store: &mut FileStore, statements: &FinancialStatements) -> anyhow::Result<()> {
    let summary = statements.profit_and_loss.summary(Utc::now());
    store.set(keys::LEDGER_SUMMARY, &summary)?;
    Ok(())
}

fn account_name(chart: &ChartOfAccounts, id: &str) -> String {
    chart
        .get(id)
        .map_or_else(|| id.to_string(), |a| a.name.clone())
}

fn print_entries(entries: &[JournalEntry], chart: &ChartOfAccounts) {
    if entries.is_empty() {
        println!("No journal entries.");
        return;
    }
    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            id: e.id.clone(),
            date: e.date.format("%Y-%m-%d").to_string(),
            description: e.description.clone(),
            debit: account_name(chart, &e.debit_account),
            credit: account_name(chart, &e.credit_account),
            amount: format_yen(e.amount),
        })
        .collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

fn section(title: &str, lines: &[StatementLine], total_label: &str, total: Decimal) {
    let mut rows: Vec<BalanceRow> = lines
        .iter()
        .map(|l| BalanceRow {
            account: l.account.name.clone(),
            balance: format_yen(l.display_balance()),
        })
        .collect();
    rows.push(BalanceRow {
        account: total_label.to_string(),
        balance: format_yen(total),
    });
    println!("{}", title);
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

fn print_statements(statements: &FinancialStatements) {
    let pl = &statements.profit_and_loss;
    let bs = &statements.balance_sheet;

    println!();
    println!("PROFIT AND LOSS (損益計算書)");
    println!();
    section("Revenue", &pl.revenue, "Total revenue", pl.total_revenue);
    section("Expenses", &pl.expenses, "Total expenses", pl.total_expenses);
    println!("Net income (当期純利益): {}", format_yen(pl.net_income));

    println!();
    println!("BALANCE SHEET (貸借対照表)");
    println!();
    section("Assets", &bs.assets, "Total assets", bs.total_assets);
    section("Liabilities", &bs.liabilities, "Total liabilities", bs.total_liabilities);
    section(
        "Equity",
        &bs.equity,
        "Total equity incl. net income",
        bs.total_equity + pl.net_income,
    );
    println!(
        "Liabilities + equity: {}",
        format_yen(bs.total_liabilities_and_equity)
    );
    if bs.is_balanced() {
        println!("Balanced.");
    } else {
        println!("Discrepancy: {}", format_yen(bs.discrepancy()));
    }
    println!();
}

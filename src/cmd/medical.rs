//! Medical command - medical expense deduction from a receipts CSV

use crate::cmd::snapshot::stored_snapshot;
use crate::cmd::{exit_on_import_errors, open_input, print_json, GlobalOpts};
use crate::import::parse_medical_csv;
use crate::money::{format_yen, parse_amount};
use crate::tax::calculate_medical_deduction;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct MedicalCommand {
    /// CSV with columns provider, patient, amount, reimbursed ("-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Total income for the threshold (defaults to the stored return's incomes)
    #[arg(long)]
    total_income: Option<String>,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Patient")]
    patient: String,
    #[tabled(rename = "Paid")]
    amount: String,
    #[tabled(rename = "Reimbursed")]
    reimbursed: String,
}

impl MedicalCommand {
    pub fn exec(&self, global: &GlobalOpts) -> anyhow::Result<()> {
        let import = parse_medical_csv(open_input(&self.file)?);
        exit_on_import_errors(&import, self.json)?;

        let total_income = match &self.total_income {
            Some(raw) => match parse_amount(raw) {
                Some(value) => value,
                None => anyhow::bail!("total income is not a number: {}", raw),
            },
            None => stored_snapshot(&global.open_store())?
                .map(|s| s.incomes.iter().map(|i| i.amount).sum())
                .unwrap_or(Decimal::ZERO),
        };
        let deduction = calculate_medical_deduction(&import.rows, total_income);
        log::info!(
            "{} medical expenses, deduction {}",
            import.rows.len(),
            deduction.deduction
        );

        if self.json {
            return print_json(&deduction);
        }

        let rows: Vec<ExpenseRow> = import
            .rows
            .iter()
            .map(|e| ExpenseRow {
                provider: e.provider.clone(),
                patient: e.patient.clone(),
                amount: format_yen(e.amount),
                reimbursed: e.reimbursed.map(format_yen).unwrap_or_default(),
            })
            .collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();

        println!();
        println!("MEDICAL EXPENSE DEDUCTION (医療費控除)");
        println!();
        println!("{}", table);
        println!();
        println!("  {:<18} {:>14}", "Total paid", format_yen(deduction.total));
        println!("  {:<18} {:>14}", "Reimbursed", format_yen(deduction.reimbursements));
        println!("  {:<18} {:>14}", "Net", format_yen(deduction.net));
        println!("  {:<18} {:>14}", "Threshold", format_yen(deduction.threshold));
        println!("  {:<18} {:>14}", "Deduction", format_yen(deduction.deduction));
        println!();
        Ok(())
    }
}

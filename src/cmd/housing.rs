//! Housing command - housing loan credit from year-end balance statements

use crate::cmd::snapshot::stored_snapshot;
use crate::cmd::{exit_on_import_errors, open_input, print_json, GlobalOpts};
use crate::import::parse_housing_csv;
use crate::money::{format_yen, parse_amount};
use crate::tax::calculate_housing_loan_deduction;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct HousingCommand {
    /// CSV with columns year, outstandingPrincipal, deductionRate (%), maxDeduction
    #[arg(short, long)]
    file: PathBuf,

    /// Income tax the credit offsets (defaults to the stored return's income tax)
    #[arg(long)]
    income_tax: Option<String>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HousingOutput {
    records: usize,
    income_tax: Decimal,
    deduction: Decimal,
}

impl HousingCommand {
    pub fn exec(&self, global: &GlobalOpts) -> anyhow::Result<()> {
        let import = parse_housing_csv(open_input(&self.file)?);
        exit_on_import_errors(&import, self.json)?;

        let income_tax = match &self.income_tax {
            Some(raw) => match parse_amount(raw) {
                Some(value) => value,
                None => anyhow::bail!("income tax is not a number: {}", raw),
            },
            None => stored_snapshot(&global.open_store())?
                .map(|s| s.computation.income_tax)
                .unwrap_or(Decimal::ZERO),
        };
        let output = HousingOutput {
            records: import.rows.len(),
            income_tax,
            deduction: calculate_housing_loan_deduction(&import.rows, income_tax),
        };

        if self.json {
            return print_json(&output);
        }

        println!();
        println!("HOUSING LOAN CREDIT (住宅ローン控除)");
        println!();
        if let Some(latest) = import.rows.iter().map(|r| r.year).max() {
            println!("  {:<18} {:>14}", "Year", latest);
        }
        println!("  {:<18} {:>14}", "Income tax", format_yen(output.income_tax));
        println!("  {:<18} {:>14}", "Credit", format_yen(output.deduction));
        println!();
        Ok(())
    }
}

//! Tax command - income tax and surtax for a taxable income

use crate::cmd::{print_json, GlobalOpts};
use crate::money::{format_yen, parse_amount, round_yen};
use crate::tax::resolve_bracket;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct TaxCommand {
    /// Taxable income in yen (e.g. 4,520,000)
    #[arg(short, long)]
    taxable: String,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxOutput {
    taxable_income: Decimal,
    rate: Decimal,
    subtracted_amount: Decimal,
    income_tax: Decimal,
    surtax: Decimal,
    total: Decimal,
}

impl TaxCommand {
    pub fn exec(&self, global: &GlobalOpts) -> anyhow::Result<()> {
        let Some(taxable) = parse_amount(&self.taxable) else {
            anyhow::bail!("taxable income is not a number: {}", self.taxable);
        };
        let taxable = round_yen(taxable);
        let config = global.tax_config()?;
        let result = resolve_bracket(taxable, &config);
        let bracket = (taxable > Decimal::ZERO)
            .then(|| config.bracket_for(taxable))
            .flatten();

        let output = TaxOutput {
            taxable_income: taxable,
            rate: bracket.map_or(Decimal::ZERO, |b| b.rate),
            subtracted_amount: bracket.map_or(Decimal::ZERO, |b| b.subtracted_amount),
            income_tax: result.income_tax,
            surtax: result.surtax,
            total: result.total(),
        };

        if self.json {
            return print_json(&output);
        }

        let rate = format!("{}%", (output.rate * Decimal::ONE_HUNDRED).normalize());
        let surtax_label = format!(
            "Surtax ({}%)",
            (config.surtax_rate * Decimal::ONE_HUNDRED).normalize()
        );
        println!();
        println!("INCOME TAX (所得税)");
        println!();
        println!("  {:<20} {:>14}", "Taxable income", format_yen(output.taxable_income));
        println!("  {:<20} {:>14}", "Rate", rate);
        println!("  {:<20} {:>14}", "Subtracted amount", format_yen(output.subtracted_amount));
        println!("  {:<20} {:>14}", "Income tax", format_yen(output.income_tax));
        println!("  {:<20} {:>14}", surtax_label, format_yen(output.surtax));
        println!("  {:<20} {:>14}", "Total", format_yen(output.total));
        println!();
        Ok(())
    }
}

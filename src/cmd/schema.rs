//! Schema command - print expected input and output formats

use crate::import::CsvField;
use crate::snapshot::TaxReturnSnapshot;
use crate::tax::{CryptoTrade, HousingLoanRecord, MedicalExpenseEntry, TaxConfig};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// What to describe
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the tax return snapshot
    JsonSchema,
    /// JSON Schema for a custom tax bracket table (--config)
    Config,
    /// CSV columns for medical expenses
    Medical,
    /// CSV columns for crypto trades
    Crypto,
    /// CSV columns for housing loan statements
    Housing,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(TaxReturnSnapshot);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::Config => {
                let schema = schema_for!(TaxConfig);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::Medical => print_csv_fields("Medical expense CSV", MedicalExpenseEntry::csv_schema()),
            SchemaFormat::Crypto => print_csv_fields("Crypto trade CSV", CryptoTrade::csv_schema()),
            SchemaFormat::Housing => {
                print_csv_fields("Housing loan CSV", HousingLoanRecord::csv_schema());
                println!("deductionRate is a percentage: 0.7 means 0.7%");
            }
        }
        Ok(())
    }
}

fn print_csv_fields(title: &str, fields: &[CsvField]) {
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!();
    println!("{}", fields.iter().map(|f| f.name).collect::<Vec<_>>().join(","));
    println!();
    for field in fields {
        let req = if field.required { "required" } else { "optional" };
        println!("{:22} ({:8})  {}", field.name, req, field.description);
    }
    println!();
}

//! Crypto command - realized gains under the average-cost method

use crate::cmd::{exit_on_import_errors, open_input, print_json};
use crate::import::parse_crypto_csv;
use crate::money::{format_quantity, format_yen};
use crate::tax::{calculate_crypto_pnl, CryptoTrade};
use clap::Args;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct CryptoCommand {
    /// CSV with columns date, pair, side, quantity, price, fee ("-" for stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Only include trades for this pair (e.g. BTC/JPY)
    #[arg(short, long)]
    pair: Option<String>,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Tabled)]
struct DisposalRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Pair")]
    pair: String,
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Proceeds")]
    proceeds: String,
    #[tabled(rename = "Cost")]
    cost: String,
    #[tabled(rename = "Gain")]
    gain: String,
}

impl CryptoCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let import = parse_crypto_csv(open_input(&self.file)?);
        exit_on_import_errors(&import, self.json)?;

        let trades: Vec<CryptoTrade> = match &self.pair {
            Some(pair) => import
                .rows
                .into_iter()
                .filter(|t| t.pair.eq_ignore_ascii_case(pair))
                .collect(),
            None => import.rows,
        };
        let pnl = calculate_crypto_pnl(&trades)?;
        log::info!(
            "{} trades, {} disposals, realized {}",
            trades.len(),
            pnl.disposals.len(),
            pnl.realized
        );

        if self.json {
            return print_json(&pnl);
        }

        println!();
        println!("CRYPTO GAINS (暗号資産の損益, 総平均法)");
        println!();
        if pnl.disposals.is_empty() {
            println!("No disposals.");
        } else {
            let rows: Vec<DisposalRow> = pnl
                .disposals
                .iter()
                .map(|d| DisposalRow {
                    date: d.date.clone(),
                    pair: d.pair.clone(),
                    quantity: format_quantity(d.quantity),
                    proceeds: format_yen(d.proceeds),
                    cost: format_yen(d.cost_basis),
                    gain: format_yen(d.gain),
                })
                .collect();
            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
        }
        println!();
        println!("  {:<20} {:>14}", "Realized gain", format_yen(pnl.realized));
        println!(
            "  {:<20} {:>14}",
            "Remaining quantity",
            format_quantity(pnl.remaining_quantity)
        );
        println!("  {:<20} {:>14}", "Remaining cost", format_yen(pnl.remaining_cost));
        println!();
        Ok(())
    }
}

mod cmd;
mod import;
mod ledger;
mod money;
mod snapshot;
mod store;
mod tax;

use clap::{Parser, Subcommand};
use cmd::GlobalOpts;

#[derive(Parser, Debug)]
#[command(
    name = "kakutei",
    version,
    about = "Japanese personal income tax return calculator (確定申告)"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Income tax and reconstruction surtax for a taxable income
    Tax(cmd::tax::TaxCommand),
    /// Blue-return bookkeeping (青色申告)
    #[command(subcommand)]
    Ledger(cmd::ledger::LedgerCommand),
    /// Medical expense deduction from a CSV of receipts
    Medical(cmd::medical::MedicalCommand),
    /// Crypto gains from a CSV of trades
    Crypto(cmd::crypto::CryptoCommand),
    /// Housing loan credit from a CSV of balance statements
    Housing(cmd::housing::HousingCommand),
    /// Assemble the tax return snapshot from the profile
    Snapshot(cmd::snapshot::SnapshotCommand),
    /// Read and write raw profile values
    #[command(subcommand)]
    Store(cmd::store::StoreCommand),
    /// Print expected input and output formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let global = &cli.global;

    match &cli.command {
        Command::Tax(command) => command.exec(global),
        Command::Ledger(command) => command.exec(global),
        Command::Medical(command) => command.exec(global),
        Command::Crypto(command) => command.exec(),
        Command::Housing(command) => command.exec(global),
        Command::Snapshot(command) => command.exec(global),
        Command::Store(command) => command.exec(global),
        Command::Schema(command) => command.exec(),
    }
}

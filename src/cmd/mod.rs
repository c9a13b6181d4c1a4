pub mod crypto;
pub mod housing;
pub mod ledger;
pub mod medical;
pub mod schema;
pub mod snapshot;
pub mod store;
pub mod tax;

use crate::import::CsvImport;
use crate::store::FileStore;
use crate::tax::TaxConfig;
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

/// Options shared by every command.
#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Profile file holding the filing steps and the journal
    #[arg(long, global = true, default_value = "kakutei-profile.json")]
    pub profile: PathBuf,

    /// JSON file with a custom tax bracket table
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl GlobalOpts {
    pub fn open_store(&self) -> FileStore {
        FileStore::open(&self.profile)
    }

    pub fn tax_config(&self) -> anyhow::Result<TaxConfig> {
        match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("cannot open tax config {}", path.display()))?;
                TaxConfig::from_json(BufReader::new(file))
                    .with_context(|| format!("invalid tax config {}", path.display()))
            }
            None => Ok(TaxConfig::default()),
        }
    }
}

/// Open a CSV input file (or stdin with "-").
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        let mut buffer = Vec::new();
        io::stdin().lock().read_to_end(&mut buffer)?;
        if buffer.is_empty() {
            anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
        }
        Ok(Box::new(io::Cursor::new(buffer)))
    } else {
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Stop with exit code 1 when the import reported errors; the calculation
/// does not run on partially read input.
pub fn exit_on_import_errors<T: Serialize>(import: &CsvImport<T>, json: bool) -> anyhow::Result<()> {
    if import.is_clean() {
        return Ok(());
    }
    if json {
        print_json(import)?;
    } else {
        eprintln!("CSV import failed with {} error(s):", import.errors.len());
        for error in &import.errors {
            eprintln!("  {}", error);
        }
    }
    std::process::exit(1);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! Store command - read and write raw profile values

use crate::cmd::{open_input, print_json, GlobalOpts};
use crate::store::{keys, KeyValueStore};
use anyhow::Context;
use clap::Subcommand;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum StoreCommand {
    /// Print the JSON value stored under a key
    Get { key: String },
    /// Store a JSON value under a key
    Set {
        key: String,
        /// JSON file to store ("-" or omitted for stdin)
        #[arg(default_value = "-")]
        file: PathBuf,
    },
    /// Remove a key
    Remove { key: String },
    /// List the keys used by the filing steps
    Keys,
}

impl StoreCommand {
    pub fn exec(&self, global: &GlobalOpts) -> anyhow::Result<()> {
        let mut store = global.open_store();
        match self {
            StoreCommand::Get { key } => match store.get_value(key) {
                Some(value) => print_json(value)?,
                None => anyhow::bail!("no value stored for '{}'", key),
            },
            StoreCommand::Set { key, file } => {
                let value: Value = serde_json::from_reader(open_input(file)?)
                    .with_context(|| format!("{} is not valid JSON", file.display()))?;
                store.set_value(key, value)?;
                log::info!("stored '{}' in {}", key, store.path().display());
            }
            StoreCommand::Remove { key } => {
                store.remove(key)?;
                log::info!("removed '{}'", key);
            }
            StoreCommand::Keys => {
                for key in keys::ALL {
                    let marker = if store.get_value(key).is_some() { "*" } else { " " };
                    println!("{} {}", marker, key);
                }
            }
        }
        Ok(())
    }
}

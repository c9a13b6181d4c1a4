//! Snapshot command - assemble the tax return from the filing steps

use crate::cmd::GlobalOpts;
use crate::ledger::{compute_statements, Journal};
use crate::snapshot::{
    assemble_snapshot, parse_snapshot, should_replace_stored, snapshot_from_value, DeductionRow,
    DocumentItem, IncomeRow, SnapshotError, TaxOverrides, TaxReturnSnapshot, TaxpayerForm,
};
use crate::store::{keys, KeyValueStore};
use crate::tax::TaxConfig;
use anyhow::Context;
use chrono::{Datelike, Local};
use clap::Args;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct SnapshotCommand {
    /// Rebuild from the filing steps even if the stored snapshot was edited
    #[arg(long)]
    refresh: bool,

    /// Replace the stored snapshot with a hand-edited JSON document
    #[arg(long, value_name = "FILE", conflicts_with = "refresh")]
    import: Option<PathBuf>,

    /// Print only the SHA-256 fingerprint
    #[arg(long)]
    digest: bool,
}

impl SnapshotCommand {
    pub fn exec(&self, global: &GlobalOpts) -> anyhow::Result<()> {
        let mut store = global.open_store();
        if !store.is_hydrated() {
            anyhow::bail!("profile {} is not loaded", global.profile.display());
        }

        let current = match &self.import {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                let snapshot = parse_snapshot(&content)?;
                store.set(keys::SNAPSHOT, &snapshot)?;
                log::info!("stored hand-edited snapshot from {}", path.display());
                snapshot
            }
            None => sync_snapshot(&mut store, &global.tax_config()?, self.refresh)?,
        };

        if self.digest {
            println!("{}", current.fingerprint());
        } else {
            println!("{}", current.to_json_pretty()?);
        }
        Ok(())
    }
}

/// The snapshot kept in the profile. A stored document that no longer
/// parses is an error, not an absent snapshot.
pub fn stored_snapshot<S: KeyValueStore>(
    store: &S,
) -> Result<Option<TaxReturnSnapshot>, SnapshotError> {
    store
        .get_value(keys::SNAPSHOT)
        .map(snapshot_from_value)
        .transpose()
}

/// Bring the stored snapshot up to date with the filing steps and return the
/// snapshot to show.
///
/// Hand edits are kept until `refresh`. A stored snapshot that fails to parse
/// is left untouched and reported, unless `refresh` replaces it.
pub fn sync_snapshot<S: KeyValueStore>(
    store: &mut S,
    config: &TaxConfig,
    refresh: bool,
) -> anyhow::Result<TaxReturnSnapshot> {
    let assembled = assemble_from_store(&*store, config);
    let stored = match stored_snapshot(&*store) {
        Ok(stored) => stored,
        Err(err) if refresh => {
            log::warn!("replacing unreadable stored snapshot: {}", err);
            None
        }
        Err(err) => {
            return Err(err).context(
                "stored snapshot was edited into an invalid document; \
                 fix it with `snapshot --import` or rebuild with --refresh",
            )
        }
    };

    let last_auto: Option<String> = store.get(keys::SNAPSHOT_AUTO);
    let replace =
        refresh || should_replace_stored(stored.as_ref(), last_auto.as_deref(), &assembled);
    store.set(keys::SNAPSHOT_AUTO, &assembled.fingerprint())?;

    match stored {
        Some(stored) if !replace => {
            if stored != assembled {
                log::warn!(
                    "stored snapshot was edited by hand, keeping it (use --refresh to rebuild)"
                );
            }
            Ok(stored)
        }
        _ => {
            store.set(keys::SNAPSHOT, &assembled)?;
            log::info!("snapshot rebuilt from filing steps");
            Ok(assembled)
        }
    }
}

/// Assemble a snapshot from the filing steps and journal in `store`.
pub fn assemble_from_store<S: KeyValueStore>(store: &S, config: &TaxConfig) -> TaxReturnSnapshot {
    let taxpayer: TaxpayerForm = store.get(keys::BASIC_INFO).unwrap_or_default();
    let incomes: Vec<IncomeRow> = store.get(keys::INCOMES).unwrap_or_default();
    let deductions: Vec<DeductionRow> = store.get(keys::DEDUCTIONS).unwrap_or_default();
    let overrides: TaxOverrides = store.get(keys::TAX).unwrap_or_default();
    let documents: Vec<DocumentItem> = store.get(keys::DOCUMENTS).unwrap_or_default();
    let journal: Journal = store.get(keys::JOURNAL).unwrap_or_default();

    let snapshot = assemble_snapshot(
        taxpayer.normalize(Local::now().year()),
        &incomes,
        &deductions,
        &overrides,
        config,
    )
    .with_attachments(&documents);

    if journal.is_empty() {
        snapshot
    } else {
        snapshot.with_ledger(&compute_statements(journal.entries()))
    }
}

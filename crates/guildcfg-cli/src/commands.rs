//! Subcommand implementations
//!
//! Every command works on a JSON blob file as persisted by the bot. Output
//! is returned as lines so `main` decides where it goes.

use crate::roster::Roster;
use anyhow::{bail, Context, Result};
use guildcfg_core::{ConfigStore, SetOutcome, TenantId, CURRENT_VERSION};
use guildcfg_migrate::{MigrationEnv, MigrationPipeline, MigrationReport, OfflineEffects};
use std::path::Path;
use tracing::{debug, info};

fn read_blob(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_store(path: &Path, store: &ConfigStore) -> Result<()> {
    let blob = store.to_json()?;
    std::fs::write(path, blob).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "Wrote configuration");
    Ok(())
}

/// Open a current-schema blob
///
/// Older blobs are refused: they must go through `migrate` first.
pub fn open_store(path: &Path) -> Result<ConfigStore> {
    let store = ConfigStore::from_json(&read_blob(path)?)
        .with_context(|| format!("{} is not a configuration blob", path.display()))?;
    if store.version() < CURRENT_VERSION {
        bail!(
            "{} is at version {}, run migrate first (current is {CURRENT_VERSION})",
            path.display(),
            store.version()
        );
    }
    Ok(store)
}

/// Every category with its options and shape tags
pub fn summary() -> Vec<String> {
    ConfigStore::fresh()
        .summary()
        .iter()
        .map(guildcfg_core::CategorySummary::render)
        .collect()
}

/// Get a category listing, an option or one key of an option
pub fn get(blob: &Path, roster: &Roster, path: Option<&str>, key: Option<&str>) -> Result<Vec<String>> {
    let store = open_store(blob)?;
    Ok(store.get_lines(path, key, &roster.ctx()))
}

/// Set an option and write the blob back when the value was accepted
pub fn set(blob: &Path, roster: &Roster, path: &str, values: &[String]) -> Result<SetOutcome> {
    let mut store = open_store(blob)?;
    let (value, extra) = match values.split_first() {
        Some((first, rest)) => (first.as_str(), rest.iter().map(String::as_str).collect()),
        None => ("", Vec::new()),
    };
    let outcome = store.set(path, value, &extra, &roster.ctx());
    if outcome.success {
        write_store(blob, &store)?;
    }
    Ok(outcome)
}

/// Migrate a blob without live side effects
///
/// Steps that need the chat service or the secondary store are reported as
/// skipped. With `write` the migrated blob replaces the file.
pub async fn migrate(blob: &Path, roster: &Roster, tenant: &TenantId, write: bool) -> Result<MigrationReport> {
    let raw = read_blob(blob)?;
    let env = MigrationEnv::new(tenant, &roster.directory, &OfflineEffects, &OfflineEffects);
    let migrated = MigrationPipeline::standard()
        .migrate(&raw, &env)
        .await
        .with_context(|| format!("Failed to migrate {}", blob.display()))?;

    if write && migrated.needs_save {
        write_store(blob, &ConfigStore::new(migrated.config))?;
        info!(path = %blob.display(), "Saved migrated configuration");
    }
    Ok(migrated.report)
}

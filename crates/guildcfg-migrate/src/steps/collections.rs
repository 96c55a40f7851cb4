//! Generic collections
//!
//! Before version 20 a tenant kept named word collections. The built-in ones
//! (`bucket`, `status`, `emote`, `spoiler`) became options; every other
//! collection moved to the secondary store as a tag.

use super::decode_legacy;
use crate::env::MigrationEnv;
use crate::error::MigrationError;
use crate::pipeline::{MigrationStep, VersionGate};
use async_trait::async_trait;
use guildcfg_core::{nullable_entries, GuildConfig, Set};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

type NamedCollections = BTreeMap<String, Set<String>>;

/// Collections that became options
const BUILTIN: &[&str] = &["bucket", "status", "emote", "spoiler"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CollectionsV19 {
    basic: NestedCollections,
    #[serde(deserialize_with = "nullable_entries")]
    collections: NamedCollections,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NestedCollections {
    #[serde(deserialize_with = "nullable_entries")]
    collections: NamedCollections,
}

fn legacy_collections(step: &'static str, raw: &Value) -> Result<NamedCollections, MigrationError> {
    let legacy: CollectionsV19 = decode_legacy(step, raw)?;
    if legacy.basic.collections.is_empty() {
        Ok(legacy.collections)
    } else {
        Ok(legacy.basic.collections)
    }
}

/// Move the built-in collections into their options
#[derive(Debug, Clone, Copy, Default)]
pub struct Collections;

#[async_trait]
impl MigrationStep for Collections {
    fn name(&self) -> &'static str {
        "collections"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(20)
    }

    async fn apply(&self, raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        let mut collections = legacy_collections(self.name(), raw)?;
        if let Some(items) = collections.remove("bucket") {
            config.bucket.items = items;
        }
        if let Some(lines) = collections.remove("status") {
            config.status.lines = lines;
        }
        for filter in ["emote", "spoiler"] {
            if let Some(words) = collections.remove(filter) {
                config.filter.filters.insert(filter.to_string(), words);
            }
        }
        Ok(())
    }
}

/// Import the remaining collections into the secondary store
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportCollections;

#[async_trait]
impl MigrationStep for ImportCollections {
    fn name(&self) -> &'static str {
        "import-collections"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(20)
    }

    fn side_effects(&self) -> bool {
        true
    }

    async fn apply(&self, raw: &Value, _config: &mut GuildConfig, env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        let collections = legacy_collections(self.name(), raw)?;
        let mut first_error = None;

        for (tag, items) in collections {
            if BUILTIN.contains(&tag.as_str()) {
                continue;
            }
            if items.is_empty() {
                debug!(tenant = %env.tenant, tag = %tag, "Skipping empty collection");
                continue;
            }
            let items: Vec<String> = items.into_keys().collect();
            match env.store.import_collection(env.tenant, &tag, &items).await {
                Ok(()) => info!(tenant = %env.tenant, tag = %tag, items = items.len(), "Imported collection"),
                Err(err) => {
                    warn!(tenant = %env.tenant, tag = %tag, error = %err, "Could not import collection");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(MigrationError::side_effect(self.name(), err)),
            None => Ok(()),
        }
    }
}

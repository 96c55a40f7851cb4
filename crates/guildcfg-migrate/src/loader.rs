//! Tenant loading
//!
//! Load, migrate, save and install one tenant while holding its side-effect
//! lock, so two loads of the same tenant never create roles twice and a
//! reload never overwrites a live store.

use crate::env::{MigrationEnv, Persistence};
use crate::error::LoadError;
use crate::pipeline::{MigrationPipeline, MigrationReport};
use guildcfg_core::{ConfigStore, GuildConfig, TenantConfigs, TenantHandle};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of [`load_tenant`]
#[derive(Debug)]
pub struct Loaded {
    pub handle: Arc<TenantHandle>,
    /// `None` for a tenant that had no stored blob or was already loaded
    pub report: Option<MigrationReport>,
    /// Whether the (migrated or fresh) config was written back
    pub saved: bool,
    /// The tenant was already installed; nothing was read or migrated
    pub reused: bool,
}

async fn save(persistence: &dyn Persistence, env: &MigrationEnv<'_>, config: &GuildConfig) -> bool {
    match persistence.save(env.tenant, config).await {
        Ok(()) => true,
        Err(err) => {
            warn!(tenant = %env.tenant, error = %err, "Could not save configuration");
            false
        }
    }
}

/// Load a tenant into `configs`, migrating its stored blob
///
/// A tenant without a stored blob starts from [`GuildConfig::fresh`]. A
/// failed save is logged and reported through [`Loaded::saved`]; the loaded
/// config is installed regardless. A tenant that is already installed is
/// returned as is, so Sets made on the live store are never replaced by a
/// second migration of the stored blob.
///
/// # Errors
/// Returns [`LoadError`] when the blob cannot be read or decoded.
pub async fn load_tenant(
    configs: &TenantConfigs,
    persistence: &dyn Persistence,
    pipeline: &MigrationPipeline,
    env: &MigrationEnv<'_>,
) -> Result<Loaded, LoadError> {
    let lock = configs.side_effect_lock(env.tenant);
    let _guard = lock.lock().await;

    if let Some(handle) = configs.get(env.tenant) {
        debug!(tenant = %env.tenant, "Tenant already loaded");
        return Ok(Loaded {
            handle,
            report: None,
            saved: false,
            reused: true,
        });
    }

    let Some(raw) = persistence.load(env.tenant).await? else {
        let config = GuildConfig::fresh();
        let saved = save(persistence, env, &config).await;
        info!(tenant = %env.tenant, "Created fresh configuration");
        let handle = configs.install(env.tenant.clone(), ConfigStore::new(config));
        return Ok(Loaded {
            handle,
            report: None,
            saved,
            reused: false,
        });
    };

    let migrated = pipeline.migrate(&raw, env).await?;
    let saved = if migrated.needs_save {
        save(persistence, env, &migrated.config).await
    } else {
        false
    };
    if migrated.report.from_version != migrated.report.to_version {
        info!(
            tenant = %env.tenant,
            from = migrated.report.from_version,
            to = migrated.report.to_version,
            skipped = migrated.report.skipped.len(),
            "Migrated configuration"
        );
    }
    let handle = configs.install(env.tenant.clone(), ConfigStore::new(migrated.config));
    Ok(Loaded {
        handle,
        report: Some(migrated.report),
        saved,
        reused: false,
    })
}

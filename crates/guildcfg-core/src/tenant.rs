//! Per-tenant stores
//!
//! Each tenant gets its own [`TenantHandle`] so Set on one server never
//! contends with another. Readers take a shared lock and never observe a
//! half-applied Set or a partially migrated config.
//!
//! Migration side effects (role creation, secondary-store rewrites) are not
//! transactional with the save, so loaders hold the tenant's side-effect lock
//! for the whole migration. Once a tenant is installed its store only
//! changes through Set; loaders never migrate over a live store.

use crate::codec::CodecContext;
use crate::ids::TenantId;
use crate::store::{ConfigStore, SetOutcome};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One tenant's live configuration
#[derive(Debug)]
pub struct TenantHandle {
    tenant: TenantId,
    store: RwLock<ConfigStore>,
}

impl TenantHandle {
    fn new(tenant: TenantId, store: ConfigStore) -> Self {
        Self {
            tenant,
            store: RwLock::new(store),
        }
    }

    /// Tenant id
    #[inline]
    #[must_use]
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    /// Run `f` under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&ConfigStore) -> R) -> R {
        f(&self.store.read())
    }

    /// Run `f` under the write lock
    pub fn write<R>(&self, f: impl FnOnce(&mut ConfigStore) -> R) -> R {
        f(&mut self.store.write())
    }

    /// Boundary Get
    #[must_use]
    pub fn get_lines(
        &self,
        path: Option<&str>,
        key: Option<&str>,
        ctx: &CodecContext<'_>,
    ) -> Vec<String> {
        self.read(|store| store.get_lines(path, key, ctx))
    }

    /// Boundary Set
    pub fn set(&self, path: &str, value: &str, extra: &[&str], ctx: &CodecContext<'_>) -> SetOutcome {
        self.write(|store| store.set(path, value, extra, ctx))
    }

    /// Replace the whole store in one step
    pub fn replace(&self, store: ConfigStore) {
        *self.store.write() = store;
    }

    /// Copy of the current store
    #[must_use]
    pub fn snapshot(&self) -> ConfigStore {
        self.store.read().clone()
    }
}

/// All loaded tenants
#[derive(Debug, Default)]
pub struct TenantConfigs {
    tenants: DashMap<TenantId, Arc<TenantHandle>>,
    side_effects: DashMap<TenantId, Arc<Mutex<()>>>,
}

impl TenantConfigs {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded tenant, if any
    #[must_use]
    pub fn get(&self, tenant: &TenantId) -> Option<Arc<TenantHandle>> {
        self.tenants.get(tenant).map(|h| Arc::clone(h.value()))
    }

    /// Install a store, replacing any previous one atomically
    pub fn install(&self, tenant: TenantId, store: ConfigStore) -> Arc<TenantHandle> {
        if let Some(existing) = self.get(&tenant) {
            existing.replace(store);
            return existing;
        }
        let handle = self
            .tenants
            .entry(tenant.clone())
            .or_insert_with(|| Arc::new(TenantHandle::new(tenant, ConfigStore::fresh())))
            .value()
            .clone();
        handle.replace(store);
        handle
    }

    /// Drop a tenant
    ///
    /// The side-effect lock stays registered so a loader still holding it
    /// keeps excluding any later load of the same tenant.
    pub fn remove(&self, tenant: &TenantId) -> Option<Arc<TenantHandle>> {
        self.tenants.remove(tenant).map(|(_, h)| h)
    }

    /// Lock serializing side-effecting work for one tenant
    #[must_use]
    pub fn side_effect_lock(&self, tenant: &TenantId) -> Arc<Mutex<()>> {
        self.side_effects
            .entry(tenant.clone())
            .or_default()
            .value()
            .clone()
    }

    /// Number of loaded tenants
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    /// Check if no tenant is loaded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

//! Collaborators reached by side-effecting steps
//!
//! The pipeline never talks to the chat platform or the database directly.
//! Everything external goes through these traits so a loader can hand in the
//! real services and tooling can hand in [`OfflineEffects`].

use crate::error::{PersistenceError, SideEffectError};
use async_trait::async_trait;
use guildcfg_core::{Directory, GuildConfig, RoleId, TenantId, UserId};

/// Schedule row kind whose data addresses legacy groups
pub const GROUP_EVENT_KIND: u8 = 7;

/// Role to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub name: String,
    pub mentionable: bool,
}

impl NewRole {
    /// Create a role request
    pub fn new(name: impl Into<String>, mentionable: bool) -> Self {
        Self {
            name: name.into(),
            mentionable,
        }
    }
}

/// Role administration on the chat platform
#[async_trait]
pub trait RoleAdmin: Send + Sync {
    /// Create a role and return its id
    async fn create_role(&self, tenant: &TenantId, role: NewRole) -> Result<RoleId, SideEffectError>;

    /// Give a member a role
    async fn add_member_role(
        &self,
        tenant: &TenantId,
        user: &UserId,
        role: &RoleId,
    ) -> Result<(), SideEffectError>;
}

/// Row of the scheduled-event table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub id: u64,
    pub data: String,
}

/// Secondary store (schedule table, item collections)
#[async_trait]
pub trait SecondaryStore: Send + Sync {
    /// Scheduled events of one kind for a tenant
    async fn scheduled_events(
        &self,
        tenant: &TenantId,
        kind: u8,
    ) -> Result<Vec<ScheduledEvent>, SideEffectError>;

    /// Overwrite the data of one event
    async fn update_event_data(&self, id: u64, data: &str) -> Result<(), SideEffectError>;

    /// Store `items` under `tag`, creating the tag when needed
    async fn import_collection(
        &self,
        tenant: &TenantId,
        tag: &str,
        items: &[String],
    ) -> Result<(), SideEffectError>;
}

/// Blob storage for tenant configurations
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Stored blob, `None` for a tenant never saved
    async fn load(&self, tenant: &TenantId) -> Result<Option<String>, PersistenceError>;

    /// Store the configuration
    async fn save(&self, tenant: &TenantId, config: &GuildConfig) -> Result<(), PersistenceError>;
}

/// Everything a step may consult or act on
#[derive(Clone, Copy)]
pub struct MigrationEnv<'a> {
    pub tenant: &'a TenantId,
    pub directory: &'a dyn Directory,
    pub roles: &'a dyn RoleAdmin,
    pub store: &'a dyn SecondaryStore,
}

impl<'a> MigrationEnv<'a> {
    /// Bundle the collaborators for one tenant
    #[must_use]
    pub fn new(
        tenant: &'a TenantId,
        directory: &'a dyn Directory,
        roles: &'a dyn RoleAdmin,
        store: &'a dyn SecondaryStore,
    ) -> Self {
        Self {
            tenant,
            directory,
            roles,
            store,
        }
    }
}

impl std::fmt::Debug for MigrationEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationEnv")
            .field("tenant", self.tenant)
            .finish_non_exhaustive()
    }
}

/// Collaborator that refuses every side effect
///
/// Used where no platform or database is reachable. Steps that need one are
/// reported as skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineEffects;

#[async_trait]
impl RoleAdmin for OfflineEffects {
    async fn create_role(&self, _tenant: &TenantId, _role: NewRole) -> Result<RoleId, SideEffectError> {
        Err(SideEffectError::Unavailable)
    }

    async fn add_member_role(
        &self,
        _tenant: &TenantId,
        _user: &UserId,
        _role: &RoleId,
    ) -> Result<(), SideEffectError> {
        Err(SideEffectError::Unavailable)
    }
}

#[async_trait]
impl SecondaryStore for OfflineEffects {
    async fn scheduled_events(
        &self,
        _tenant: &TenantId,
        _kind: u8,
    ) -> Result<Vec<ScheduledEvent>, SideEffectError> {
        Err(SideEffectError::Unavailable)
    }

    async fn update_event_data(&self, _id: u64, _data: &str) -> Result<(), SideEffectError> {
        Err(SideEffectError::Unavailable)
    }

    async fn import_collection(
        &self,
        _tenant: &TenantId,
        _tag: &str,
        _items: &[String],
    ) -> Result<(), SideEffectError> {
        Err(SideEffectError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offline_refuses_everything() {
        let tenant = TenantId::new("1");
        let offline = OfflineEffects;
        assert_eq!(
            offline.create_role(&tenant, NewRole::new("Silence", false)).await,
            Err(SideEffectError::Unavailable)
        );
        assert_eq!(
            offline.scheduled_events(&tenant, GROUP_EVENT_KIND).await,
            Err(SideEffectError::Unavailable)
        );
        assert!(offline.import_collection(&tenant, "ponies", &[]).await.is_err());
    }
}

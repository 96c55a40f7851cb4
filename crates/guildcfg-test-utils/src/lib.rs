//! Testing utilities for the guildcfg workspace
//!
//! Shared fixtures, in-memory collaborators and stored blobs.

#![allow(missing_docs)]
#![recursion_limit = "256"]

use async_trait::async_trait;
use guildcfg_core::{CodecContext, GuildConfig, NameSet, RoleId, StaticDirectory, TenantId, UserId};
use guildcfg_migrate::{
    MigrationEnv, NewRole, Persistence, PersistenceError, RoleAdmin, ScheduledEvent, SecondaryStore,
    SideEffectError,
};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub const TENANT: &str = "1000";

pub fn tenant() -> TenantId {
    TenantId::new(TENANT)
}

/// Roster used across tests
///
/// Roles: `Mods` (100), `Ponies` (101), `Silence` (102).
/// Channels: `general` (200), `mods` (201), `log` (202).
/// Members: `twilight` (400, nick `Twi`), `rarity` (401).
pub fn directory() -> StaticDirectory {
    StaticDirectory::new()
        .with_role("100", "Mods")
        .with_role("101", "Ponies")
        .with_role("102", "Silence")
        .with_channel("200", "general")
        .with_channel("201", "mods")
        .with_channel("202", "log")
        .with_member("400", "twilight", Some("Twi"))
        .with_member("401", "rarity", None)
}

pub fn modules() -> NameSet {
    NameSet::new([
        "basic", "bored", "bucket", "filter", "information", "log", "markov", "quote", "scheduler",
        "spam", "status", "users", "witty",
    ])
}

pub fn commands() -> NameSet {
    NameSet::new([
        "addset", "ban", "drop", "fight", "getaudit", "pick", "quote", "roll", "silence", "wipe",
    ])
}

/// Directory plus name registries
#[derive(Debug, Clone)]
pub struct Fixture {
    pub directory: StaticDirectory,
    pub modules: NameSet,
    pub commands: NameSet,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            directory: directory(),
            modules: modules(),
            commands: commands(),
        }
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctx(&self) -> CodecContext<'_> {
        CodecContext::new(&self.directory, &self.modules, &self.commands)
    }
}

/// Role admin that records every call
///
/// Created roles get ids 900, 901, ... in creation order.
#[derive(Debug)]
pub struct RecordingRoles {
    next_id: AtomicU64,
    failing: HashSet<String>,
    pub created: Mutex<Vec<(NewRole, RoleId)>>,
    pub memberships: Mutex<Vec<(UserId, RoleId)>>,
}

impl Default for RecordingRoles {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(900),
            failing: HashSet::new(),
            created: Mutex::new(Vec::new()),
            memberships: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingRoles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to create roles with this name
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created.lock().iter().map(|(r, _)| r.name.clone()).collect()
    }

    pub fn role_named(&self, name: &str) -> Option<RoleId> {
        self.created
            .lock()
            .iter()
            .find(|(r, _)| r.name == name)
            .map(|(_, id)| id.clone())
    }

    pub fn members_of(&self, role: &RoleId) -> Vec<UserId> {
        self.memberships
            .lock()
            .iter()
            .filter(|(_, r)| r == role)
            .map(|(u, _)| u.clone())
            .collect()
    }
}

#[async_trait]
impl RoleAdmin for RecordingRoles {
    async fn create_role(&self, _tenant: &TenantId, role: NewRole) -> Result<RoleId, SideEffectError> {
        if self.failing.contains(&role.name) {
            return Err(SideEffectError::Role(format!("cannot create {}", role.name)));
        }
        let id = RoleId::new(self.next_id.fetch_add(1, Ordering::SeqCst).to_string());
        self.created.lock().push((role, id.clone()));
        Ok(id)
    }

    async fn add_member_role(&self, _tenant: &TenantId, user: &UserId, role: &RoleId) -> Result<(), SideEffectError> {
        self.memberships.lock().push((user.clone(), role.clone()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    pub tenant: TenantId,
    pub kind: u8,
    pub data: String,
}

/// In-memory schedule table and collection tags
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub events: Mutex<BTreeMap<u64, StoredEvent>>,
    pub imports: Mutex<BTreeMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(self, id: u64, kind: u8, data: &str) -> Self {
        self.events.lock().insert(
            id,
            StoredEvent {
                tenant: tenant(),
                kind,
                data: data.to_string(),
            },
        );
        self
    }

    pub fn event_data(&self, id: u64) -> Option<String> {
        self.events.lock().get(&id).map(|e| e.data.clone())
    }
}

#[async_trait]
impl SecondaryStore for MemoryStore {
    async fn scheduled_events(&self, tenant: &TenantId, kind: u8) -> Result<Vec<ScheduledEvent>, SideEffectError> {
        Ok(self
            .events
            .lock()
            .iter()
            .filter(|(_, e)| &e.tenant == tenant && e.kind == kind)
            .map(|(id, e)| ScheduledEvent {
                id: *id,
                data: e.data.clone(),
            })
            .collect())
    }

    async fn update_event_data(&self, id: u64, data: &str) -> Result<(), SideEffectError> {
        let mut events = self.events.lock();
        let event = events
            .get_mut(&id)
            .ok_or_else(|| SideEffectError::Store(format!("no event {id}")))?;
        event.data = data.to_string();
        Ok(())
    }

    async fn import_collection(&self, _tenant: &TenantId, tag: &str, items: &[String]) -> Result<(), SideEffectError> {
        self.imports
            .lock()
            .entry(tag.to_string())
            .or_default()
            .extend(items.iter().cloned());
        Ok(())
    }
}

/// In-memory blob storage
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    pub blobs: Mutex<HashMap<TenantId, String>>,
    pub saves: AtomicU64,
    pub fail_saves: AtomicBool,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(self, tenant: &TenantId, blob: impl Into<String>) -> Self {
        self.blobs.lock().insert(tenant.clone(), blob.into());
        self
    }

    pub fn stored(&self, tenant: &TenantId) -> Option<GuildConfig> {
        let blob = self.blobs.lock().get(tenant).cloned()?;
        serde_json::from_str(&blob).ok()
    }

    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn load(&self, tenant: &TenantId) -> Result<Option<String>, PersistenceError> {
        Ok(self.blobs.lock().get(tenant).cloned())
    }

    async fn save(&self, tenant: &TenantId, config: &GuildConfig) -> Result<(), PersistenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::Backend("disk full".into()));
        }
        let blob = serde_json::to_string(config)?;
        self.blobs.lock().insert(tenant.clone(), blob);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Collaborators for one migration
#[derive(Debug, Default)]
pub struct Effects {
    pub tenant: TenantId,
    pub directory: StaticDirectory,
    pub roles: RecordingRoles,
    pub store: MemoryStore,
}

impl Effects {
    pub fn new() -> Self {
        Self {
            tenant: tenant(),
            directory: directory(),
            roles: RecordingRoles::new(),
            store: MemoryStore::new(),
        }
    }

    pub fn with_roles(mut self, roles: RecordingRoles) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_store(mut self, store: MemoryStore) -> Self {
        self.store = store;
        self
    }

    pub fn env(&self) -> MigrationEnv<'_> {
        MigrationEnv::new(&self.tenant, &self.directory, &self.roles, &self.store)
    }
}

pub mod blobs {
    //! Stored blobs from historical schema versions

    use super::json;

    /// Flat layout with groups, collections and no silence role
    ///
    /// Group `ponies` collides with the existing `Ponies` role.
    pub fn flat_v9() -> String {
        json!({
            "version": 9,
            "maxerror": 4,
            "maxwit": 120,
            "maxbored": 600,
            "boredcommands": { "!drop": true },
            "maxpmlines": 5,
            "maxquotelines": 30,
            "maxsearchresults": 10,
            "defaultmarkovlines": 5,
            "commandperduration": 3,
            "commandmaxduration": 15,
            "statusdelaytime": 3600,
            "maxraidtime": 240,
            "raidsize": 4,
            "witty": { "hello": "hi there" },
            "aliases": { "cute": "pick cute" },
            "maxbucket": 10,
            "maxbucketlength": 100,
            "maxfighthp": 300,
            "maxfightdamage": 60,
            "MaxSpamRemoveLookback": 4,
            "usemembernames": true,
            "timezone": -5,
            "timezonelocation": "America/New_York",
            "autosilence": -2,
            "alertrole": 100,
            "silentrole": 0,
            "logchannel": 202,
            "modchannel": 201,
            "welcomechannel": 0,
            "spoilchannels": [200],
            "freechannels": { "200": true },
            "command_roles": { "ban": { "100": true } },
            "module_channels": { "schedule": { "200": true } },
            "module_disabled": { "anti-spam": true },
            "collections": {
                "bucket": { "a hat": true },
                "status": { "napping": true },
                "spoiler": { "finale": true },
                "cutemarks": { "apple": true, "star": true }
            },
            "groups": {
                "ponies": { "400": true, "401": true },
                "readers": { "400": true }
            },
            "quotes": { "401": ["How dreadful"] },
            "rules": { "1": "be nice" }
        })
        .to_string()
    }

    /// Category layout with groups and legacy spam limits
    pub fn nested_v12() -> String {
        json!({
            "version": 12,
            "basic": {
                "alertrole": "100",
                "modchannel": "201",
                "groups": { "artists": { "401": true } },
                "collections": { "bucket": { "a shoe": true } }
            },
            "spam": { "maximagespam": 4, "maxpingspam": 0, "autosilence": 1 },
            "modules": { "commandperduration": 3, "commandmaxduration": 15 }
        })
        .to_string()
    }

    /// Last layout before options moved categories
    pub fn v20() -> String {
        json!({
            "version": 20,
            "basic": { "alertrole": "100", "trackuserleft": true, "modchannel": "0" },
            "spam": { "silentrole": "102", "silencemessage": "shh", "autosilence": 0 },
            "search": { "maxsearchresults": 7 },
            "schedule": { "birthdayrole": "0" },
            "spoiler": { "spoilchannels": ["200"] },
            "collections": { "emote": { "rarity": true } }
        })
        .to_string()
    }

    /// Current layout
    pub fn current() -> String {
        let mut config = guildcfg_core::GuildConfig::fresh();
        config.basic.mod_role = guildcfg_core::RoleId::new("100");
        config.bucket.max_items = 3;
        serde_json::to_string(&config).unwrap_or_default()
    }
}

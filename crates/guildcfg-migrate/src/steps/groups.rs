//! Legacy groups become roles
//!
//! Versions before 14 kept ad-hoc member groups in the config. Each group is
//! turned into a mentionable role, its members receive the role and scheduled
//! group reminders are rewritten to mention the new roles.

use super::decode_legacy;
use crate::env::{MigrationEnv, NewRole, GROUP_EVENT_KIND};
use crate::error::MigrationError;
use crate::pipeline::{MigrationStep, VersionGate};
use async_trait::async_trait;
use guildcfg_core::mention::role_mention;
use guildcfg_core::{GuildConfig, RoleId, UserId};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

type Groups = BTreeMap<String, BTreeMap<String, bool>>;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GroupsV13 {
    basic: NestedGroups,
    groups: Option<Groups>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NestedGroups {
    groups: Option<Groups>,
}

impl GroupsV13 {
    fn into_groups(self) -> Groups {
        self.basic.groups.or(self.groups).unwrap_or_default()
    }
}

/// Rewrite `g1+g2|text` so known groups become role mentions
fn rewrite_event(data: &str, roles: &HashMap<String, RoleId>) -> Option<String> {
    let (targets, text) = data.split_once('|')?;
    let targets: Vec<String> = targets
        .split('+')
        .map(|group| match roles.get(&group.to_lowercase()) {
            Some(role) => role_mention(role),
            None => group.to_string(),
        })
        .collect();
    Some(format!("{}|{text}", targets.join(" ")))
}

/// Create one role per legacy group
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupsToRoles;

impl GroupsToRoles {
    async fn create_roles(
        &self,
        groups: Groups,
        config: &mut GuildConfig,
        env: &MigrationEnv<'_>,
    ) -> Result<HashMap<String, RoleId>, MigrationError> {
        let mut created = HashMap::with_capacity(groups.len());
        let mut last_error = None;

        for (group, members) in groups {
            let name = if env.directory.role_by_name(&group).is_some() {
                format!("sb-{group}")
            } else {
                group.clone()
            };
            let role = match env.roles.create_role(env.tenant, NewRole::new(name, true)).await {
                Ok(role) => role,
                Err(err) => {
                    warn!(tenant = %env.tenant, group = %group, error = %err, "Could not create role for group");
                    last_error = Some(err);
                    continue;
                }
            };
            debug!(tenant = %env.tenant, group = %group, role = %role, "Created role for group");
            config.users.roles.insert(role.clone(), true);

            for member in members.keys() {
                let user = UserId::new(member.as_str());
                if let Err(err) = env.roles.add_member_role(env.tenant, &user, &role).await {
                    warn!(tenant = %env.tenant, user = %user, role = %role, error = %err, "Could not add member to role");
                }
            }
            created.insert(group.to_lowercase(), role);
        }

        match last_error {
            Some(err) if created.is_empty() => Err(MigrationError::side_effect(self.name(), err)),
            _ => Ok(created),
        }
    }

    async fn rewrite_schedule(&self, roles: &HashMap<String, RoleId>, env: &MigrationEnv<'_>) {
        let events = match env.store.scheduled_events(env.tenant, GROUP_EVENT_KIND).await {
            Ok(events) => events,
            Err(err) => {
                warn!(tenant = %env.tenant, error = %err, "Could not read scheduled group events");
                return;
            }
        };
        for event in events {
            let Some(data) = rewrite_event(&event.data, roles) else {
                warn!(tenant = %env.tenant, event = event.id, "Scheduled group event has no message");
                continue;
            };
            if let Err(err) = env.store.update_event_data(event.id, &data).await {
                warn!(tenant = %env.tenant, event = event.id, error = %err, "Could not rewrite scheduled event");
            }
        }
    }
}

#[async_trait]
impl MigrationStep for GroupsToRoles {
    fn name(&self) -> &'static str {
        "groups-to-roles"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(14)
    }

    fn side_effects(&self) -> bool {
        true
    }

    async fn apply(&self, raw: &Value, config: &mut GuildConfig, env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        let groups = decode_legacy::<GroupsV13>(self.name(), raw)?.into_groups();
        if groups.is_empty() {
            return Ok(());
        }
        let roles = self.create_roles(groups, config, env).await?;
        self.rewrite_schedule(&roles, env).await;
        Ok(())
    }
}

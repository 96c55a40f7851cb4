//! Final clean-up for version 21

use crate::env::MigrationEnv;
use crate::error::MigrationError;
use crate::pipeline::{MigrationStep, VersionGate};
use async_trait::async_trait;
use guildcfg_core::{GuildConfig, ModuleId};
use serde_json::Value;
use std::collections::BTreeMap;

/// Autosilence mode that reported joins to the log channel
const AUTOSILENCE_LOG: i64 = -2;

const MODULE_RENAMES: &[(&str, &str)] = &[
    ("schedule", "scheduler"),
    ("anti-spam", "spam"),
    ("help/about", "information"),
];

fn rename_modules<V>(map: &mut BTreeMap<ModuleId, V>) {
    for (old, new) in MODULE_RENAMES {
        if let Some(value) = map.remove(&ModuleId::new(*old)) {
            map.insert(ModuleId::new(*new), value);
        }
    }
}

macro_rules! clear_zero {
    ($($field:expr),+ $(,)?) => {
        $(
            if $field.as_str() == "0" {
                $field = Default::default();
            }
        )+
    };
}

/// Notify channel, placeholder ids and renamed modules
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalize;

#[async_trait]
impl MigrationStep for Normalize {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(21)
    }

    async fn apply(&self, _raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        let mode = config.spam.auto_silence;
        if mode == AUTOSILENCE_LOG {
            config.users.notify_channel = config.log.channel.clone();
        } else if mode != 0 {
            config.users.notify_channel = config.basic.mod_channel.clone();
        }
        if mode < 0 {
            config.spam.auto_silence = 0;
        }

        clear_zero!(
            config.basic.mod_role,
            config.basic.mod_channel,
            config.basic.silence_role,
            config.spam.ignore_role,
            config.users.welcome_channel,
            config.users.notify_channel,
            config.log.channel,
            config.scheduler.birthday_role,
        );

        rename_modules(&mut config.modules.channels);
        rename_modules(&mut config.modules.disabled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testing::apply_offline;
    use guildcfg_core::{ChannelId, RoleId};
    use serde_json::json;

    #[tokio::test]
    async fn log_mode_notifies_log_channel() {
        let raw = json!({
            "version": 20,
            "spam": { "autosilence": -2 },
            "log": { "logchannel": "201" },
            "basic": { "modchannel": "200" }
        });
        let config = apply_offline(&Normalize, &raw).await.unwrap();
        assert_eq!(config.users.notify_channel, ChannelId::new("201"));
        assert_eq!(config.spam.auto_silence, 0);
    }

    #[tokio::test]
    async fn other_modes_notify_mod_channel() {
        let raw = json!({ "version": 20, "spam": { "autosilence": 1 }, "basic": { "modchannel": "200" } });
        let config = apply_offline(&Normalize, &raw).await.unwrap();
        assert_eq!(config.users.notify_channel, ChannelId::new("200"));
        assert_eq!(config.spam.auto_silence, 1);

        let raw = json!({ "version": 20, "spam": { "autosilence": 0 }, "basic": { "modchannel": "200" } });
        let config = apply_offline(&Normalize, &raw).await.unwrap();
        assert!(config.users.notify_channel.is_unset());
    }

    #[tokio::test]
    async fn zero_ids_become_unset() {
        let raw = json!({
            "version": 20,
            "basic": { "modrole": "0", "modchannel": "0", "silencerole": "7" },
            "scheduler": { "birthdayrole": "0" }
        });
        let config = apply_offline(&Normalize, &raw).await.unwrap();
        assert!(config.basic.mod_role.is_unset());
        assert!(config.basic.mod_channel.is_unset());
        assert!(config.scheduler.birthday_role.is_unset());
        assert_eq!(config.basic.silence_role, RoleId::new("7"));
    }

    #[tokio::test]
    async fn modules_are_renamed() {
        let raw = json!({
            "version": 20,
            "modules": {
                "modulechannels": { "schedule": { "5": true }, "markov": { "6": true } },
                "moduledisabled": { "anti-spam": true, "help/about": true }
            }
        });
        let config = apply_offline(&Normalize, &raw).await.unwrap();
        let channels: Vec<&str> = config.modules.channels.keys().map(ModuleId::as_str).collect();
        assert_eq!(channels, vec!["markov", "scheduler"]);
        let disabled: Vec<&str> = config.modules.disabled.keys().map(ModuleId::as_str).collect();
        assert_eq!(disabled, vec!["information", "spam"]);
    }
}

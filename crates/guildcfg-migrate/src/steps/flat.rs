//! Pre-category layout (versions 0 through 9)
//!
//! Before version 10 every setting lived at the top level of the blob and ids
//! were stored as numbers.

use super::decode_legacy;
use crate::env::{MigrationEnv, NewRole};
use crate::error::MigrationError;
use crate::pipeline::{MigrationStep, VersionGate};
use async_trait::async_trait;
use guildcfg_core::mention::{parse_channel, parse_role};
use guildcfg_core::{
    nullable, nullable_entries, ChannelId, CommandId, GuildConfig, ModuleId, RoleId, Set, UserId,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Commands introduced with the category layout
const RESTRICTED_SINCE_V10: &[&str] = &[
    "addevent",
    "addbirthday",
    "autosilence",
    "silence",
    "unsilence",
    "wipewelcome",
    "new",
    "addquote",
    "removequote",
    "removealias",
    "delete",
    "createpoll",
    "deletepoll",
    "addoption",
];

/// Numeric id as stored by old versions; `0` means none
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LegacyId(Option<String>);

impl<'de> Deserialize<'de> for LegacyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }
        let text = match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Number(n)) => n.to_string(),
            Some(Raw::Text(t)) => t,
            None => return Ok(Self(None)),
        };
        let text = text.trim();
        Ok(Self((!text.is_empty() && text != "0").then(|| text.to_string())))
    }
}

impl LegacyId {
    fn into_id<T: From<String> + Default>(self) -> T {
        self.0.map(T::from).unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlatConfig {
    version: i64,
    maxerror: i64,
    maxwit: i64,
    maxbored: i64,
    #[serde(deserialize_with = "nullable")]
    boredcommands: Set<String>,
    maxpmlines: i64,
    maxquotelines: i64,
    maxsearchresults: i64,
    defaultmarkovlines: i64,
    commandperduration: i64,
    commandmaxduration: i64,
    statusdelaytime: i64,
    maxraidtime: i64,
    raidsize: i64,
    #[serde(deserialize_with = "nullable")]
    witty: BTreeMap<String, String>,
    #[serde(deserialize_with = "nullable")]
    aliases: BTreeMap<String, String>,
    maxbucket: i64,
    maxbucketlength: i64,
    maxfighthp: i64,
    maxfightdamage: i64,
    #[serde(alias = "MaxSpamRemoveLookback")]
    maxspamremovelookback: i64,
    ignoreinvalidcommands: bool,
    usemembernames: bool,
    importable: bool,
    hidenegativerules: bool,
    timezone: i64,
    timezonelocation: String,
    autosilence: i64,
    alertrole: LegacyId,
    silentrole: LegacyId,
    logchannel: LegacyId,
    modchannel: LegacyId,
    welcomechannel: LegacyId,
    welcomemessage: String,
    silencemessage: String,
    birthdayrole: LegacyId,
    #[serde(deserialize_with = "nullable")]
    spoilchannels: Vec<LegacyId>,
    #[serde(deserialize_with = "nullable")]
    freechannels: BTreeMap<String, bool>,
    #[serde(alias = "Command_roles", deserialize_with = "nullable_entries")]
    command_roles: BTreeMap<String, BTreeMap<String, bool>>,
    #[serde(alias = "Command_channels", deserialize_with = "nullable_entries")]
    command_channels: BTreeMap<String, BTreeMap<String, bool>>,
    #[serde(alias = "Command_limits", deserialize_with = "nullable")]
    command_limits: BTreeMap<String, i64>,
    #[serde(alias = "Command_disabled", deserialize_with = "nullable")]
    command_disabled: BTreeMap<String, bool>,
    #[serde(alias = "Module_disabled", deserialize_with = "nullable")]
    module_disabled: BTreeMap<String, bool>,
    #[serde(alias = "Module_channels", deserialize_with = "nullable_entries")]
    module_channels: BTreeMap<String, BTreeMap<String, bool>>,
    #[serde(deserialize_with = "nullable_entries")]
    quotes: BTreeMap<String, Vec<String>>,
    #[serde(deserialize_with = "nullable")]
    rules: BTreeMap<i64, String>,
}

impl FlatConfig {
    /// Fix-ups older flat versions needed before being copied
    fn upgrade_in_place(&mut self) {
        if self.version <= 1 {
            self.aliases.insert("cute".to_string(), "pick cute".to_string());
        }
        if self.version <= 3 {
            self.boredcommands.clear();
        }
        if self.version <= 5 {
            self.timezonelocation = gmt_zone(self.timezone);
        }
    }
}

/// `Etc/GMT` zone for a UTC offset in hours (the zone name flips the sign)
fn gmt_zone(offset: i64) -> String {
    if offset < 0 {
        format!("Etc/GMT+{}", -offset)
    } else {
        format!("Etc/GMT{}", -offset)
    }
}

fn channel_set(raw: BTreeMap<String, bool>) -> Set<ChannelId> {
    raw.into_iter()
        .filter_map(|(k, v)| parse_channel(&k).map(|ch| (ch, v)))
        .collect()
}

fn role_set(raw: BTreeMap<String, bool>) -> Set<RoleId> {
    raw.into_iter()
        .filter_map(|(k, v)| parse_role(&k).map(|r| (r, v)))
        .collect()
}

/// Copy the flat layout into categories
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatLayout;

#[async_trait]
impl MigrationStep for FlatLayout {
    fn name(&self) -> &'static str {
        "flat-layout"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(10)
    }

    async fn apply(&self, raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        let mut flat: FlatConfig = decode_legacy(self.name(), raw)?;
        flat.upgrade_in_place();
        debug!(version = flat.version, "Copying flat layout");

        let basic = &mut config.basic;
        basic.mod_role = flat.alertrole.into_id();
        basic.aliases = flat.aliases;
        basic.free_channels = channel_set(flat.freechannels);
        basic.ignore_invalid_commands = flat.ignoreinvalidcommands;
        basic.importable = flat.importable;
        basic.mod_channel = flat.modchannel.into_id();
        basic.silence_role = flat.silentrole.into_id();

        let modules = &mut config.modules;
        modules.command_channels = flat
            .command_channels
            .into_iter()
            .map(|(k, v)| (CommandId::new(k), channel_set(v)))
            .collect();
        modules.command_disabled = flat
            .command_disabled
            .into_keys()
            .map(|k| (CommandId::new(k), true))
            .collect();
        modules.command_limits = flat
            .command_limits
            .into_iter()
            .map(|(k, v)| (CommandId::new(k), v))
            .collect();
        modules.command_roles = flat
            .command_roles
            .into_iter()
            .map(|(k, v)| (CommandId::new(k), role_set(v)))
            .collect();
        modules.command_max_duration = flat.commandmaxduration;
        modules.command_per_duration = flat.commandperduration;
        modules.channels = flat
            .module_channels
            .into_iter()
            .map(|(k, v)| (ModuleId::new(k), channel_set(v)))
            .collect();
        modules.disabled = flat
            .module_disabled
            .into_keys()
            .map(|k| (ModuleId::new(k), true))
            .collect();

        let spam = &mut config.spam;
        spam.auto_silence = flat.autosilence;
        spam.raid_time = flat.maxraidtime;
        spam.max_remove_lookback = flat.maxspamremovelookback;
        spam.raid_size = flat.raidsize;

        config.bucket.max_items = flat.maxbucket;
        config.bucket.max_item_length = flat.maxbucketlength;
        config.bucket.max_fight_damage = flat.maxfightdamage;
        config.bucket.max_fight_hp = flat.maxfighthp;

        config.markov.default_lines = flat.defaultmarkovlines;
        config.markov.max_pm_lines = flat.maxpmlines;
        config.markov.max_lines = flat.maxquotelines;
        config.markov.use_member_names = flat.usemembernames;

        let users = &mut config.users;
        users.timezone_location = flat.timezonelocation;
        users.welcome_channel = flat.welcomechannel.into_id();
        users.welcome_message = flat.welcomemessage;
        users.silence_message = flat.silencemessage;

        config.bored.commands = flat.boredcommands;
        config.bored.cooldown = flat.maxbored;
        config.information.hide_negative_rules = flat.hidenegativerules;
        config.information.rules = flat.rules;
        config.log.channel = flat.logchannel.into_id();
        config.log.cooldown = flat.maxerror;
        config.witty.cooldown = flat.maxwit;
        config.witty.responses = flat.witty;
        config.scheduler.birthday_role = flat.birthdayrole.into_id();
        config.miscellaneous.max_search_results = flat.maxsearchresults;

        let spoiler: Set<ChannelId> = flat
            .spoilchannels
            .into_iter()
            .filter_map(|id| id.0.map(|ch| (ChannelId::new(ch), true)))
            .collect();
        config.filter.channels = BTreeMap::from([("spoiler".to_string(), spoiler)]);

        config.status.cooldown = flat.statusdelaytime;
        config.quote.quotes = flat
            .quotes
            .into_iter()
            .map(|(k, v)| (UserId::new(k), v))
            .collect();

        for command in RESTRICTED_SINCE_V10 {
            config.restrict_command(command);
        }
        Ok(())
    }
}

/// Quarantine role for tenants upgraded from the flat layout
#[derive(Debug, Clone, Copy, Default)]
pub struct SilenceRole;

#[async_trait]
impl MigrationStep for SilenceRole {
    fn name(&self) -> &'static str {
        "silence-role"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(10)
    }

    fn side_effects(&self) -> bool {
        true
    }

    async fn apply(&self, _raw: &Value, config: &mut GuildConfig, env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        if !config.basic.silence_role.is_unset() {
            return Ok(());
        }
        let role = env
            .roles
            .create_role(env.tenant, NewRole::new("Silence", false))
            .await
            .map_err(|source| MigrationError::side_effect(self.name(), source))?;
        debug!(tenant = %env.tenant, role = %role, "Created silence role");
        config.basic.silence_role = role;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testing::apply_offline;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn flat_v9() -> Value {
        json!({
            "version": 9,
            "maxerror": 4,
            "maxwit": 120,
            "maxbored": 600,
            "boredcommands": { "!drop": true },
            "alertrole": 100,
            "silentrole": 0,
            "modchannel": 200,
            "logchannel": 201,
            "spoilchannels": [300, 0],
            "freechannels": { "<#202>": true, "202a": true },
            "command_roles": { "ban": { "100": true } },
            "command_channels": { "roll": { "<#203>": true } },
            "command_limits": { "roll": 30 },
            "command_disabled": { "fight": true },
            "module_disabled": { "bucket": true },
            "module_channels": { "markov": { "203": true } },
            "quotes": { "400": ["hi"] },
            "rules": { "1": "be nice", "-1": "secret" },
            "timezone": -5,
            "timezonelocation": "America/New_York",
            "witty": { "hello": "hi" },
            "maxbucket": 8
        })
    }

    #[tokio::test]
    async fn copies_into_categories() {
        let config = apply_offline(&FlatLayout, &flat_v9()).await.unwrap();
        assert_eq!(config.basic.mod_role, RoleId::new("100"));
        assert!(config.basic.silence_role.is_unset());
        assert_eq!(config.basic.mod_channel, ChannelId::new("200"));
        assert_eq!(config.log.channel, ChannelId::new("201"));
        assert_eq!(config.log.cooldown, 4);
        assert_eq!(config.witty.cooldown, 120);
        assert_eq!(config.bored.cooldown, 600);
        assert_eq!(config.bucket.max_items, 8);
        assert_eq!(config.users.timezone_location, "America/New_York");
        assert_eq!(config.information.rules.len(), 2);
        assert_eq!(config.quote.quotes[&UserId::new("400")], vec!["hi"]);
        assert_eq!(config.witty.responses["hello"], "hi");
    }

    #[tokio::test]
    async fn references_are_normalized() {
        let config = apply_offline(&FlatLayout, &flat_v9()).await.unwrap();
        assert_eq!(
            config.basic.free_channels.keys().collect::<Vec<_>>(),
            vec![&ChannelId::new("202")]
        );
        let roll = &config.modules.command_channels[&CommandId::new("roll")];
        assert!(roll.contains_key(&ChannelId::new("203")));
        assert!(config.modules.command_disabled.contains_key(&CommandId::new("fight")));
        assert!(config.modules.disabled.contains_key(&ModuleId::new("bucket")));
        let spoiler = &config.filter.channels["spoiler"];
        assert_eq!(spoiler.keys().collect::<Vec<_>>(), vec![&ChannelId::new("300")]);
    }

    #[tokio::test]
    async fn new_commands_are_restricted() {
        let config = apply_offline(&FlatLayout, &flat_v9()).await.unwrap();
        for command in RESTRICTED_SINCE_V10 {
            let roles = &config.modules.command_roles[&CommandId::new(*command)];
            assert!(roles.contains_key(&RoleId::new("100")), "{command}");
        }
        assert!(config.modules.command_roles.contains_key(&CommandId::new("ban")));
    }

    #[tokio::test]
    async fn old_versions_are_upgraded_first() {
        let raw = json!({
            "version": 1,
            "timezone": -5,
            "boredcommands": { "!drop": true },
            "aliases": null
        });
        let config = apply_offline(&FlatLayout, &raw).await.unwrap();
        assert_eq!(config.basic.aliases["cute"], "pick cute");
        assert!(config.bored.commands.is_empty());
        assert_eq!(config.users.timezone_location, "Etc/GMT+5");
        assert!(config.modules.command_roles.is_empty());
    }

    #[test]
    fn gmt_zone_flips_sign() {
        assert_eq!(gmt_zone(-5), "Etc/GMT+5");
        assert_eq!(gmt_zone(3), "Etc/GMT-3");
        assert_eq!(gmt_zone(0), "Etc/GMT0");
    }

    #[test]
    fn legacy_ids_accept_numbers_and_text() {
        let ids: Vec<LegacyId> = serde_json::from_value(json!([5, "6", 0, "0", null, ""])).unwrap();
        let ids: Vec<Option<String>> = ids.into_iter().map(|id| id.0).collect();
        assert_eq!(ids, vec![Some("5".into()), Some("6".into()), None, None, None, None]);
    }

    #[tokio::test]
    async fn silence_role_offline_is_skipped() {
        let err = apply_offline(&SilenceRole, &json!({ "version": 9 })).await.unwrap_err();
        assert!(matches!(err, MigrationError::SideEffect { step: "silence-role", .. }));
    }

    #[tokio::test]
    async fn existing_silence_role_needs_nothing() {
        let raw = json!({ "version": 9, "basic": { "silencerole": "55" } });
        let config = apply_offline(&SilenceRole, &raw).await.unwrap();
        assert_eq!(config.basic.silence_role, RoleId::new("55"));
    }
}

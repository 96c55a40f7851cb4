//! Persisted configuration tree
//!
//! [`GuildConfig`] is the current schema. Field names on the wire match the
//! blobs already stored for deployed tenants, so several keep historical
//! spellings (`modulechannels`, `Commandlimits`, `Wit`, ...).
//!
//! Decoding is tolerant: unknown fields are ignored, missing fields take the
//! zero value and a `null` collection decodes as empty.

use crate::ids::{ChannelId, CommandId, ModuleId, RoleId, UserId};
use crate::CURRENT_VERSION;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Membership set persisted as `element -> true`
pub type Set<T> = BTreeMap<T, bool>;

/// Deserialize a collection, treating `null` as empty
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a map of lists, treating `null` (outer or per entry) as empty
pub fn nullable_entries<'de, D, K, L>(deserializer: D) -> Result<BTreeMap<K, L>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
    L: Deserialize<'de> + Default,
{
    let raw: Option<BTreeMap<K, Option<L>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or_default()))
        .collect())
}

/// Complete per-tenant configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildConfig {
    pub version: i64,
    #[serde(rename = "lastversion")]
    pub last_version: i64,
    #[serde(rename = "setupdone")]
    pub setup_done: bool,
    pub basic: BasicConfig,
    pub modules: ModulesConfig,
    pub spam: SpamConfig,
    pub users: UsersConfig,
    pub bucket: BucketConfig,
    pub markov: MarkovConfig,
    pub filter: FilterConfig,
    #[serde(rename = "Bored", alias = "bored")]
    pub bored: BoredConfig,
    #[serde(rename = "help")]
    pub information: InformationConfig,
    pub log: LogConfig,
    #[serde(rename = "Wit", alias = "wit")]
    pub witty: WittyConfig,
    pub scheduler: SchedulerConfig,
    #[serde(rename = "misc")]
    pub miscellaneous: MiscellaneousConfig,
    pub status: StatusConfig,
    pub quote: QuoteConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    #[serde(rename = "ignoreinvalidcommands")]
    pub ignore_invalid_commands: bool,
    pub importable: bool,
    #[serde(rename = "modrole")]
    pub mod_role: RoleId,
    #[serde(rename = "modchannel")]
    pub mod_channel: ChannelId,
    #[serde(rename = "freechannels", deserialize_with = "nullable")]
    pub free_channels: Set<ChannelId>,
    #[serde(rename = "botchannel")]
    pub bot_channel: ChannelId,
    #[serde(deserialize_with = "nullable")]
    pub aliases: BTreeMap<String, String>,
    #[serde(rename = "listentobots")]
    pub listen_to_bots: bool,
    #[serde(rename = "commandprefix")]
    pub command_prefix: String,
    #[serde(rename = "silencerole")]
    pub silence_role: RoleId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    #[serde(rename = "modulechannels", deserialize_with = "nullable_entries")]
    pub channels: BTreeMap<ModuleId, Set<ChannelId>>,
    #[serde(rename = "moduledisabled", deserialize_with = "nullable")]
    pub disabled: Set<ModuleId>,
    #[serde(rename = "commandroles", deserialize_with = "nullable_entries")]
    pub command_roles: BTreeMap<CommandId, Set<RoleId>>,
    #[serde(rename = "commandchannels", deserialize_with = "nullable_entries")]
    pub command_channels: BTreeMap<CommandId, Set<ChannelId>>,
    #[serde(
        rename = "Commandlimits",
        alias = "commandlimits",
        deserialize_with = "nullable"
    )]
    pub command_limits: BTreeMap<CommandId, i64>,
    #[serde(rename = "commanddisabled", deserialize_with = "nullable")]
    pub command_disabled: Set<CommandId>,
    #[serde(rename = "commandperduration")]
    pub command_per_duration: i64,
    #[serde(rename = "commandmaxduration")]
    pub command_max_duration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamConfig {
    #[serde(rename = "imagepressure")]
    pub image_pressure: f64,
    #[serde(rename = "pingpressure")]
    pub ping_pressure: f64,
    #[serde(rename = "lengthpressure")]
    pub length_pressure: f64,
    #[serde(rename = "repeatpressure")]
    pub repeat_pressure: f64,
    #[serde(rename = "linepressure")]
    pub line_pressure: f64,
    #[serde(rename = "basepressure")]
    pub base_pressure: f64,
    #[serde(rename = "pressuredecay")]
    pub pressure_decay: f64,
    #[serde(rename = "maxpressure")]
    pub max_pressure: f64,
    #[serde(rename = "maxchannelpressure", deserialize_with = "nullable")]
    pub max_channel_pressure: BTreeMap<ChannelId, f64>,
    #[serde(rename = "MaxSpamRemoveLookback", alias = "maxspamremovelookback")]
    pub max_remove_lookback: i64,
    #[serde(rename = "ignorerole")]
    pub ignore_role: RoleId,
    #[serde(rename = "maxraidtime")]
    pub raid_time: i64,
    #[serde(rename = "raidsize")]
    pub raid_size: i64,
    #[serde(rename = "autosilence")]
    pub auto_silence: i64,
    #[serde(rename = "lockdownduration")]
    pub lockdown_duration: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersConfig {
    #[serde(rename = "timezonelocation")]
    pub timezone_location: String,
    #[serde(rename = "welcomechannel")]
    pub welcome_channel: ChannelId,
    #[serde(rename = "welcomemessage")]
    pub welcome_message: String,
    #[serde(rename = "silencemessage")]
    pub silence_message: String,
    #[serde(rename = "userroles", deserialize_with = "nullable")]
    pub roles: Set<RoleId>,
    #[serde(rename = "joinchannel")]
    pub notify_channel: ChannelId,
    #[serde(rename = "trackuserleft")]
    pub track_user_left: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    #[serde(rename = "maxbucket")]
    pub max_items: i64,
    #[serde(rename = "maxbucketlength")]
    pub max_item_length: i64,
    #[serde(rename = "maxfighthp")]
    pub max_fight_hp: i64,
    #[serde(rename = "maxfightdamage")]
    pub max_fight_damage: i64,
    #[serde(deserialize_with = "nullable")]
    pub items: Set<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkovConfig {
    #[serde(rename = "maxpmlines")]
    pub max_pm_lines: i64,
    #[serde(rename = "maxquotelines")]
    pub max_lines: i64,
    #[serde(rename = "defaultmarkovlines")]
    pub default_lines: i64,
    #[serde(rename = "usemembernames")]
    pub use_member_names: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    #[serde(deserialize_with = "nullable_entries")]
    pub filters: BTreeMap<String, Set<String>>,
    #[serde(deserialize_with = "nullable_entries")]
    pub channels: BTreeMap<String, Set<ChannelId>>,
    #[serde(deserialize_with = "nullable")]
    pub responses: BTreeMap<String, String>,
    #[serde(deserialize_with = "nullable")]
    pub templates: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoredConfig {
    #[serde(rename = "maxbored")]
    pub cooldown: i64,
    #[serde(rename = "boredcommands", deserialize_with = "nullable")]
    pub commands: Set<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InformationConfig {
    #[serde(deserialize_with = "nullable")]
    pub rules: BTreeMap<i64, String>,
    #[serde(rename = "hidenegativerules")]
    pub hide_negative_rules: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    #[serde(rename = "maxerror")]
    pub cooldown: i64,
    #[serde(rename = "logchannel")]
    pub channel: ChannelId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WittyConfig {
    #[serde(rename = "witty", deserialize_with = "nullable")]
    pub responses: BTreeMap<String, String>,
    #[serde(rename = "maxwit")]
    pub cooldown: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    #[serde(rename = "birthdayrole")]
    pub birthday_role: RoleId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiscellaneousConfig {
    #[serde(rename = "maxsearchresults")]
    pub max_search_results: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    #[serde(rename = "statusdelaytime")]
    pub cooldown: i64,
    #[serde(deserialize_with = "nullable")]
    pub lines: Set<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    #[serde(deserialize_with = "nullable_entries")]
    pub quotes: BTreeMap<UserId, Vec<String>>,
}

impl GuildConfig {
    /// Defaults for a tenant that has never been configured
    #[must_use]
    pub fn fresh() -> Self {
        let mut config = Self {
            version: CURRENT_VERSION,
            ..Self::default()
        };
        config.basic.command_prefix = "!".to_string();
        config.modules.command_per_duration = 3;
        config.modules.command_max_duration = 15;

        let spam = &mut config.spam;
        spam.max_pressure = 60.0;
        spam.base_pressure = 10.0;
        let headroom = spam.max_pressure - spam.base_pressure;
        spam.image_pressure = headroom / 6.0;
        spam.ping_pressure = headroom / 20.0;
        spam.length_pressure = headroom / 8000.0;
        spam.repeat_pressure = spam.base_pressure;
        spam.line_pressure = headroom / 70.0;
        spam.pressure_decay = 2.5;
        spam.max_remove_lookback = 4;
        spam.raid_time = 240;
        spam.raid_size = 4;
        // raid mode
        spam.auto_silence = 1;
        spam.lockdown_duration = 120;

        config.bucket.max_items = 10;
        config.bucket.max_item_length = 100;
        config.bucket.max_fight_hp = 300;
        config.bucket.max_fight_damage = 60;
        config.markov.max_pm_lines = 5;
        config.markov.max_lines = 30;
        config.markov.default_lines = 5;
        config.markov.use_member_names = true;
        config.bored.cooldown = 500;
        config.bored.commands = Set::from([("!quote".to_string(), true), ("!drop".to_string(), true)]);
        config.log.cooldown = 4;
        config.witty.cooldown = 180;
        config.miscellaneous.max_search_results = 10;
        config.status.cooldown = 3600;
        config
    }

    /// Check if a module is disabled
    #[must_use]
    pub fn is_module_disabled(&self, module: &str) -> bool {
        self.modules
            .disabled
            .contains_key(&ModuleId::new(module.to_lowercase()))
    }

    /// Check if a command is disabled
    #[must_use]
    pub fn is_command_disabled(&self, command: &str) -> bool {
        self.modules
            .command_disabled
            .contains_key(&CommandId::new(command.to_lowercase()))
    }

    /// Restrict a command to the moderator role
    ///
    /// No-op when the command already has a role restriction or no
    /// moderator role is configured. Returns whether a restriction was added.
    pub fn restrict_command(&mut self, command: &str) -> bool {
        let mod_role = &self.basic.mod_role;
        if mod_role.is_unset() {
            return false;
        }
        let id = CommandId::new(command);
        if self.modules.command_roles.contains_key(&id) {
            return false;
        }
        self.modules
            .command_roles
            .insert(id, Set::from([(mod_role.clone(), true)]));
        true
    }
}

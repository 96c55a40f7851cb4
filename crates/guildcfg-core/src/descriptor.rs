//! Descriptor registry
//!
//! Static shape of the configuration tree: every category, every option and
//! the typed accessor used to read and write it. Built once on first use.

use crate::codec::{self, Atom, CodecContext, ListValue};
use crate::config::{GuildConfig, Set};
use crate::error::ConfigError;
use crate::ids::{ChannelId, CommandId, ModuleId, RoleId, UserId};
use crate::kind::ValueKind;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Accessor pair for one field of [`GuildConfig`]
pub struct Field<T: 'static> {
    pub get: fn(&GuildConfig) -> &T,
    pub get_mut: fn(&mut GuildConfig) -> &mut T,
}

macro_rules! field {
    ($category:ident . $option:ident) => {
        Field {
            get: |c| &c.$category.$option,
            get_mut: |c| &mut c.$category.$option,
        }
    };
}

/// Typed read/write access to a single option
///
/// One implementation exists per value shape; the registry stores them as
/// trait objects so the store can dispatch on a resolved path.
pub trait OptionSlot: Send + Sync {
    /// Shape of the option
    fn kind(&self) -> ValueKind;

    /// Display lines for the whole option
    fn render(&self, config: &GuildConfig, ctx: &CodecContext<'_>) -> Vec<String>;

    /// Display lines for one key of a map option
    fn render_key(
        &self,
        _config: &GuildConfig,
        _key: &str,
        _ctx: &CodecContext<'_>,
    ) -> Result<Vec<String>, ConfigError> {
        Err(ConfigError::TypeMismatch {
            path: String::new(),
            reason: "is not a map.",
        })
    }

    /// Replace the option from `[value, extra...]`
    fn set(
        &self,
        config: &mut GuildConfig,
        values: &[&str],
        ctx: &CodecContext<'_>,
    ) -> Result<String, ConfigError>;

    /// Replace or delete a single key of a map option
    fn set_key(
        &self,
        _config: &mut GuildConfig,
        _key: &str,
        _values: &[&str],
        _ctx: &CodecContext<'_>,
    ) -> Result<String, ConfigError> {
        Err(ConfigError::TypeMismatch {
            path: String::new(),
            reason: "does not take a key.",
        })
    }
}

/// Scalar or reference option
pub struct ScalarSlot<A: Atom> {
    field: Field<A>,
}

impl<A: Atom> OptionSlot for ScalarSlot<A> {
    fn kind(&self) -> ValueKind {
        ValueKind::single(A::KIND)
    }

    fn render(&self, config: &GuildConfig, ctx: &CodecContext<'_>) -> Vec<String> {
        let value = (self.field.get)(config);
        if value.is_unset() {
            Vec::new()
        } else {
            vec![value.format(ctx)]
        }
    }

    fn set(
        &self,
        config: &mut GuildConfig,
        values: &[&str],
        ctx: &CodecContext<'_>,
    ) -> Result<String, ConfigError> {
        let value = A::parse(values.first().copied().unwrap_or_default(), ctx)?;
        let shown = value.format(ctx);
        *(self.field.get_mut)(config) = value;
        Ok(shown)
    }
}

/// Sequence or set option
pub struct ListSlot<L: ListValue> {
    field: Field<L>,
}

impl<L: ListValue> OptionSlot for ListSlot<L> {
    fn kind(&self) -> ValueKind {
        ValueKind::List(<L::Elem as Atom>::KIND, L::STYLE)
    }

    fn render(&self, config: &GuildConfig, ctx: &CodecContext<'_>) -> Vec<String> {
        codec::format_list((self.field.get)(config), ctx)
    }

    fn set(
        &self,
        config: &mut GuildConfig,
        values: &[&str],
        ctx: &CodecContext<'_>,
    ) -> Result<String, ConfigError> {
        let list: L = codec::parse_list(values, ctx)?;
        let shown = codec::render_list(&list, ctx);
        *(self.field.get_mut)(config) = list;
        Ok(shown)
    }
}

fn lookup_key<K: Atom + Ord>(key: &str, ctx: &CodecContext<'_>) -> Result<K, ConfigError> {
    K::parse_key(key, ctx).map_err(|_| ConfigError::KeyNotFound(key.to_string()))
}

fn require_key(key: &str) -> Result<(), ConfigError> {
    if key.is_empty() {
        Err(ConfigError::MissingArgument("No key specified"))
    } else {
        Ok(())
    }
}

/// Key/value option
pub struct MapSlot<K: Atom + Ord, V: Atom> {
    field: Field<BTreeMap<K, V>>,
}

impl<K: Atom + Ord, V: Atom> OptionSlot for MapSlot<K, V> {
    fn kind(&self) -> ValueKind {
        ValueKind::Map(K::KIND, V::KIND)
    }

    fn render(&self, config: &GuildConfig, ctx: &CodecContext<'_>) -> Vec<String> {
        (self.field.get)(config)
            .iter()
            .map(|(k, v)| format!("\"{}\": {}", k.format(ctx), v.format(ctx)))
            .collect()
    }

    fn render_key(
        &self,
        config: &GuildConfig,
        key: &str,
        ctx: &CodecContext<'_>,
    ) -> Result<Vec<String>, ConfigError> {
        let k: K = lookup_key(key, ctx)?;
        (self.field.get)(config)
            .get(&k)
            .map(|v| vec![v.format(ctx)])
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))
    }

    fn set(
        &self,
        config: &mut GuildConfig,
        values: &[&str],
        ctx: &CodecContext<'_>,
    ) -> Result<String, ConfigError> {
        match values.split_first() {
            Some((key, rest)) => self.set_key(config, key, rest, ctx),
            None => Err(ConfigError::MissingArgument("No key specified")),
        }
    }

    fn set_key(
        &self,
        config: &mut GuildConfig,
        key: &str,
        values: &[&str],
        ctx: &CodecContext<'_>,
    ) -> Result<String, ConfigError> {
        require_key(key)?;
        let Some(value) = values.first() else {
            return Err(ConfigError::MissingArgument("No value parameter given"));
        };
        if value.is_empty() {
            let k: K = lookup_key(key, ctx)?;
            return (self.field.get_mut)(config)
                .remove(&k)
                .map(|_| format!("Deleted {key}"))
                .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()));
        }
        let k = K::parse_key(key, ctx).map_err(ConfigError::in_key)?;
        let v = V::parse(value, ctx).map_err(ConfigError::in_value)?;
        let shown = format!("{}: {}", k.format(ctx), v.format(ctx));
        (self.field.get_mut)(config).insert(k, v);
        Ok(shown)
    }
}

/// Key to list option
pub struct MapListSlot<K: Atom + Ord, L: ListValue> {
    field: Field<BTreeMap<K, L>>,
}

impl<K: Atom + Ord, L: ListValue> OptionSlot for MapListSlot<K, L> {
    fn kind(&self) -> ValueKind {
        ValueKind::MapList(K::KIND, <L::Elem as Atom>::KIND, L::STYLE)
    }

    fn render(&self, config: &GuildConfig, ctx: &CodecContext<'_>) -> Vec<String> {
        (self.field.get)(config)
            .iter()
            .map(|(k, list)| {
                let key = k.format(ctx);
                if list.count() == 1 {
                    format!("\"{key}\": {}", codec::format_list(list, ctx).join(", "))
                } else {
                    format!("\"{key}\": [{} items]", list.count())
                }
            })
            .collect()
    }

    fn render_key(
        &self,
        config: &GuildConfig,
        key: &str,
        ctx: &CodecContext<'_>,
    ) -> Result<Vec<String>, ConfigError> {
        let k: K = lookup_key(key, ctx)?;
        (self.field.get)(config)
            .get(&k)
            .map(|list| codec::format_list(list, ctx))
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))
    }

    fn set(
        &self,
        config: &mut GuildConfig,
        values: &[&str],
        ctx: &CodecContext<'_>,
    ) -> Result<String, ConfigError> {
        match values.split_first() {
            Some((key, rest)) => self.set_key(config, key, rest, ctx),
            None => Err(ConfigError::MissingArgument("No key specified")),
        }
    }

    fn set_key(
        &self,
        config: &mut GuildConfig,
        key: &str,
        values: &[&str],
        ctx: &CodecContext<'_>,
    ) -> Result<String, ConfigError> {
        require_key(key)?;
        if values.is_empty() {
            let k: K = lookup_key(key, ctx)?;
            return (self.field.get_mut)(config)
                .remove(&k)
                .map(|_| format!("Deleted {key}"))
                .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()));
        }
        let k = K::parse_key(key, ctx).map_err(ConfigError::in_key)?;
        let list: L = codec::parse_list(values, ctx)?;
        let shown = format!("{}: {}", k.format(ctx), codec::render_list(&list, ctx));
        (self.field.get_mut)(config).insert(k, list);
        Ok(shown)
    }
}

/// One registered option
pub struct OptionDescriptor {
    name: &'static str,
    slot: Box<dyn OptionSlot>,
}

impl OptionDescriptor {
    /// Canonical option name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Shape of the option
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.slot.kind()
    }

    /// Accessor
    #[inline]
    #[must_use]
    pub fn slot(&self) -> &dyn OptionSlot {
        self.slot.as_ref()
    }
}

impl std::fmt::Debug for OptionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

/// One category of options
#[derive(Debug)]
pub struct CategoryDescriptor {
    name: &'static str,
    options: Vec<OptionDescriptor>,
}

impl CategoryDescriptor {
    fn new(name: &'static str, options: Vec<OptionDescriptor>) -> Self {
        Self { name, options }
    }

    /// Canonical category name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Options in registry order
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[OptionDescriptor] {
        &self.options
    }

    /// Case-insensitive option lookup
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&OptionDescriptor> {
        self.options.iter().find(|o| o.name.eq_ignore_ascii_case(name))
    }
}

/// The whole configuration tree shape
#[derive(Debug)]
pub struct ConfigDescriptor {
    categories: Vec<CategoryDescriptor>,
}

static REGISTRY: Lazy<ConfigDescriptor> = Lazy::new(ConfigDescriptor::build);

/// Process-wide descriptor registry
#[inline]
#[must_use]
pub fn registry() -> &'static ConfigDescriptor {
    &REGISTRY
}

fn scalar<A: Atom>(name: &'static str, field: Field<A>) -> OptionDescriptor {
    OptionDescriptor {
        name,
        slot: Box::new(ScalarSlot { field }),
    }
}

fn list<L: ListValue>(name: &'static str, field: Field<L>) -> OptionDescriptor {
    OptionDescriptor {
        name,
        slot: Box::new(ListSlot { field }),
    }
}

fn map<K: Atom + Ord, V: Atom>(name: &'static str, field: Field<BTreeMap<K, V>>) -> OptionDescriptor {
    OptionDescriptor {
        name,
        slot: Box::new(MapSlot { field }),
    }
}

fn map_list<K: Atom + Ord, L: ListValue>(
    name: &'static str,
    field: Field<BTreeMap<K, L>>,
) -> OptionDescriptor {
    OptionDescriptor {
        name,
        slot: Box::new(MapListSlot { field }),
    }
}

impl ConfigDescriptor {
    fn build() -> Self {
        let categories = vec![
            CategoryDescriptor::new(
                "Basic",
                vec![
                    scalar::<bool>("IgnoreInvalidCommands", field!(basic.ignore_invalid_commands)),
                    scalar::<bool>("Importable", field!(basic.importable)),
                    scalar::<RoleId>("ModRole", field!(basic.mod_role)),
                    scalar::<ChannelId>("ModChannel", field!(basic.mod_channel)),
                    list::<Set<ChannelId>>("FreeChannels", field!(basic.free_channels)),
                    scalar::<ChannelId>("BotChannel", field!(basic.bot_channel)),
                    map::<String, String>("Aliases", field!(basic.aliases)),
                    scalar::<bool>("ListenToBots", field!(basic.listen_to_bots)),
                    scalar::<String>("CommandPrefix", field!(basic.command_prefix)),
                    scalar::<RoleId>("SilenceRole", field!(basic.silence_role)),
                ],
            ),
            CategoryDescriptor::new(
                "Modules",
                vec![
                    map_list::<ModuleId, Set<ChannelId>>("Channels", field!(modules.channels)),
                    list::<Set<ModuleId>>("Disabled", field!(modules.disabled)),
                    map_list::<CommandId, Set<RoleId>>("CommandRoles", field!(modules.command_roles)),
                    map_list::<CommandId, Set<ChannelId>>(
                        "CommandChannels",
                        field!(modules.command_channels),
                    ),
                    map::<CommandId, i64>("CommandLimits", field!(modules.command_limits)),
                    list::<Set<CommandId>>("CommandDisabled", field!(modules.command_disabled)),
                    scalar::<i64>("CommandPerDuration", field!(modules.command_per_duration)),
                    scalar::<i64>("CommandMaxDuration", field!(modules.command_max_duration)),
                ],
            ),
            CategoryDescriptor::new(
                "Spam",
                vec![
                    scalar::<f64>("ImagePressure", field!(spam.image_pressure)),
                    scalar::<f64>("PingPressure", field!(spam.ping_pressure)),
                    scalar::<f64>("LengthPressure", field!(spam.length_pressure)),
                    scalar::<f64>("RepeatPressure", field!(spam.repeat_pressure)),
                    scalar::<f64>("LinePressure", field!(spam.line_pressure)),
                    scalar::<f64>("BasePressure", field!(spam.base_pressure)),
                    scalar::<f64>("PressureDecay", field!(spam.pressure_decay)),
                    scalar::<f64>("MaxPressure", field!(spam.max_pressure)),
                    map::<ChannelId, f64>("MaxChannelPressure", field!(spam.max_channel_pressure)),
                    scalar::<i64>("MaxRemoveLookback", field!(spam.max_remove_lookback)),
                    scalar::<RoleId>("IgnoreRole", field!(spam.ignore_role)),
                    scalar::<i64>("RaidTime", field!(spam.raid_time)),
                    scalar::<i64>("RaidSize", field!(spam.raid_size)),
                    scalar::<i64>("AutoSilence", field!(spam.auto_silence)),
                    scalar::<i64>("LockdownDuration", field!(spam.lockdown_duration)),
                ],
            ),
            CategoryDescriptor::new(
                "Users",
                vec![
                    scalar::<String>("TimezoneLocation", field!(users.timezone_location)),
                    scalar::<ChannelId>("WelcomeChannel", field!(users.welcome_channel)),
                    scalar::<String>("WelcomeMessage", field!(users.welcome_message)),
                    scalar::<String>("SilenceMessage", field!(users.silence_message)),
                    list::<Set<RoleId>>("Roles", field!(users.roles)),
                    scalar::<ChannelId>("NotifyChannel", field!(users.notify_channel)),
                    scalar::<bool>("TrackUserLeft", field!(users.track_user_left)),
                ],
            ),
            CategoryDescriptor::new(
                "Bucket",
                vec![
                    scalar::<i64>("MaxItems", field!(bucket.max_items)),
                    scalar::<i64>("MaxItemLength", field!(bucket.max_item_length)),
                    scalar::<i64>("MaxFightHP", field!(bucket.max_fight_hp)),
                    scalar::<i64>("MaxFightDamage", field!(bucket.max_fight_damage)),
                    list::<Set<String>>("Items", field!(bucket.items)),
                ],
            ),
            CategoryDescriptor::new(
                "Markov",
                vec![
                    scalar::<i64>("MaxPMlines", field!(markov.max_pm_lines)),
                    scalar::<i64>("MaxLines", field!(markov.max_lines)),
                    scalar::<i64>("DefaultLines", field!(markov.default_lines)),
                    scalar::<bool>("UseMemberNames", field!(markov.use_member_names)),
                ],
            ),
            CategoryDescriptor::new(
                "Filter",
                vec![
                    map_list::<String, Set<String>>("Filters", field!(filter.filters)),
                    map_list::<String, Set<ChannelId>>("Channels", field!(filter.channels)),
                    map::<String, String>("Responses", field!(filter.responses)),
                    map::<String, String>("Templates", field!(filter.templates)),
                ],
            ),
            CategoryDescriptor::new(
                "Bored",
                vec![
                    scalar::<i64>("Cooldown", field!(bored.cooldown)),
                    list::<Set<String>>("Commands", field!(bored.commands)),
                ],
            ),
            CategoryDescriptor::new(
                "Information",
                vec![
                    map::<i64, String>("Rules", field!(information.rules)),
                    scalar::<bool>("HideNegativeRules", field!(information.hide_negative_rules)),
                ],
            ),
            CategoryDescriptor::new(
                "Log",
                vec![
                    scalar::<i64>("Cooldown", field!(log.cooldown)),
                    scalar::<ChannelId>("Channel", field!(log.channel)),
                ],
            ),
            CategoryDescriptor::new(
                "Witty",
                vec![
                    map::<String, String>("Responses", field!(witty.responses)),
                    scalar::<i64>("Cooldown", field!(witty.cooldown)),
                ],
            ),
            CategoryDescriptor::new(
                "Scheduler",
                vec![scalar::<RoleId>("BirthdayRole", field!(scheduler.birthday_role))],
            ),
            CategoryDescriptor::new(
                "Miscellaneous",
                vec![scalar::<i64>(
                    "MaxSearchResults",
                    field!(miscellaneous.max_search_results),
                )],
            ),
            CategoryDescriptor::new(
                "Status",
                vec![
                    scalar::<i64>("Cooldown", field!(status.cooldown)),
                    list::<Set<String>>("Lines", field!(status.lines)),
                ],
            ),
            CategoryDescriptor::new(
                "Quote",
                vec![map_list::<UserId, Vec<String>>("Quotes", field!(quote.quotes))],
            ),
        ];
        Self { categories }
    }

    /// Categories in registry order
    #[inline]
    #[must_use]
    pub fn categories(&self) -> &[CategoryDescriptor] {
        &self.categories
    }

    /// Case-insensitive category lookup
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&CategoryDescriptor> {
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Look up an option by canonical or user-typed names
    #[must_use]
    pub fn option(&self, category: &str, option: &str) -> Option<&OptionDescriptor> {
        self.category(category).and_then(|c| c.option(option))
    }

    /// Summary used for top-level discovery
    #[must_use]
    pub fn summary(&self) -> Vec<CategorySummary> {
        self.categories
            .iter()
            .map(|c| CategorySummary {
                name: c.name,
                options: c
                    .options
                    .iter()
                    .map(|o| OptionSummary {
                        name: o.name,
                        shape: o.kind().shape_tag(),
                    })
                    .collect(),
            })
            .collect()
    }
}

/// Option name plus shape tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSummary {
    pub name: &'static str,
    pub shape: Option<&'static str>,
}

/// One category in the discovery summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    pub name: &'static str,
    pub options: Vec<OptionSummary>,
}

impl CategorySummary {
    /// Render as a text block: category name, then one option per line
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::from(self.name);
        for option in &self.options {
            out.push('\n');
            out.push_str(option.name);
            if let Some(tag) = option.shape {
                out.push(' ');
                out.push_str(tag);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::{AtomKind, ListStyle, Primitive, ReferenceKind};

    #[test]
    fn every_category_is_registered() {
        let names: Vec<_> = registry().categories().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "Basic",
                "Modules",
                "Spam",
                "Users",
                "Bucket",
                "Markov",
                "Filter",
                "Bored",
                "Information",
                "Log",
                "Witty",
                "Scheduler",
                "Miscellaneous",
                "Status",
                "Quote"
            ]
        );
    }

    #[test]
    fn kinds_follow_storage_types() {
        let reg = registry();
        assert_eq!(
            reg.option("basic", "freechannels").unwrap().kind(),
            ValueKind::List(AtomKind::Reference(ReferenceKind::Channel), ListStyle::Set)
        );
        assert_eq!(
            reg.option("quote", "quotes").unwrap().kind(),
            ValueKind::MapList(
                AtomKind::Reference(ReferenceKind::User),
                AtomKind::Primitive(Primitive::String),
                ListStyle::Sequence
            )
        );
        assert_eq!(
            reg.option("spam", "maxpressure").unwrap().kind(),
            ValueKind::Scalar(Primitive::Float)
        );
    }

    #[test]
    fn summary_tags_shapes() {
        let summary = registry().summary();
        let basic = summary[0].render();
        assert!(basic.starts_with("Basic\n"));
        assert!(basic.contains("FreeChannels [list]"));
        assert!(basic.contains("Aliases [map]"));
        assert!(basic.contains("\nModRole\n"));
        assert!(summary[1].render().contains("CommandRoles [maplist]"));
    }

    #[test]
    fn field_accessors_hit_the_right_field() {
        let mut config = GuildConfig::fresh();
        let f: Field<i64> = field!(bucket.max_items);
        *(f.get_mut)(&mut config) = 42;
        assert_eq!(config.bucket.max_items, 42);
        assert_eq!(*(f.get)(&config), 42);
    }
}

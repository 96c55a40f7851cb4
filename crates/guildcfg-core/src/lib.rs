//! guildcfg core
//!
//! Per-tenant bot configuration addressed by dotted paths.
//!
//! # Core Concepts
//!
//! - [`GuildConfig`]: the persisted settings tree (current schema)
//! - [`ConfigDescriptor`]: static registry of categories, options and their [`ValueKind`]
//! - [`ConfigPath`]: a resolved `Category.Option[.Key]`
//! - [`Atom`] / [`ListValue`]: parse and format values, resolving references
//!   through a [`Directory`]
//! - [`ConfigStore`]: Get/Set over one tenant's configuration
//! - [`TenantConfigs`]: all loaded tenants, one lock per tenant
//!
//! # Example
//!
//! ```rust,ignore
//! use guildcfg_core::{CodecContext, ConfigStore, NameSet, StaticDirectory};
//!
//! let dir = StaticDirectory::new().with_role("100", "Mods");
//! let names = NameSet::default();
//! let ctx = CodecContext::new(&dir, &names, &names);
//!
//! let mut store = ConfigStore::fresh();
//! store.set("modrole", "100", &[], &ctx);
//! assert_eq!(store.get_lines(Some("Basic.ModRole"), None, &ctx), ["Basic.ModRole: @Mods"]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod codec;
mod config;
mod descriptor;
mod directory;
mod error;
mod help;
mod ids;
mod kind;
pub mod mention;
mod path;
mod store;
mod tenant;

pub use codec::{format_list, parse_list, render_list, Atom, CodecContext, ListValue};
pub use config::{
    BasicConfig, BoredConfig, BucketConfig, FilterConfig, GuildConfig, InformationConfig,
    LogConfig, MarkovConfig, MiscellaneousConfig, ModulesConfig, QuoteConfig, SchedulerConfig,
    Set, SpamConfig, StatusConfig, UsersConfig, WittyConfig, nullable, nullable_entries,
};
pub use descriptor::{
    registry, CategoryDescriptor, CategorySummary, ConfigDescriptor, Field, ListSlot, MapListSlot,
    MapSlot, OptionDescriptor, OptionSlot, OptionSummary, ScalarSlot,
};
pub use directory::{
    ChannelEntry, Directory, MemberEntry, NameRegistry, NameSet, RoleEntry, StaticDirectory,
};
pub use error::ConfigError;
pub use help::{HelpTable, HELP_PLACEHOLDER};
pub use ids::{ChannelId, CommandId, ModuleId, RoleId, TenantId, UserId};
pub use kind::{AtomKind, ListStyle, Primitive, ReferenceKind, ValueKind};
pub use path::ConfigPath;
pub use store::{ConfigStore, GetResponse, OptionPreview, SetOutcome};
pub use tenant::{TenantConfigs, TenantHandle};

/// Current schema version of [`GuildConfig`]
pub const CURRENT_VERSION: i64 = 21;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used items
pub mod prelude {
    pub use crate::{
        CodecContext, ConfigError, ConfigStore, Directory, GuildConfig, NameRegistry, TenantId,
        CURRENT_VERSION,
    };
}

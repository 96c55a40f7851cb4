//! guildcfg migrate
//!
//! Upgrades stored tenant configuration blobs to the current schema.
//!
//! # Core Concepts
//!
//! - [`MigrationPipeline`]: ordered, version-gated [`MigrationStep`]s
//! - [`MigrationEnv`]: collaborators for side effects ([`RoleAdmin`], [`SecondaryStore`])
//! - [`load_tenant`]: load, migrate, save and install one tenant
//!
//! # Example
//!
//! ```rust,ignore
//! use guildcfg_migrate::{MigrationEnv, MigrationPipeline, OfflineEffects};
//!
//! let env = MigrationEnv::new(&tenant, &directory, &OfflineEffects, &OfflineEffects);
//! let migrated = MigrationPipeline::standard().migrate(&blob, &env).await?;
//! for line in migrated.report.to_lines() {
//!     println!("{line}");
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod env;
mod error;
mod loader;
mod pipeline;
pub mod steps;

pub use env::{
    MigrationEnv, NewRole, OfflineEffects, Persistence, RoleAdmin, ScheduledEvent, SecondaryStore,
    GROUP_EVENT_KIND,
};
pub use error::{LoadError, MigrationError, PersistenceError, SideEffectError};
pub use loader::{load_tenant, Loaded};
pub use pipeline::{
    Migrated, MigrationPipeline, MigrationReport, MigrationStep, SkippedStep, VersionGate,
};

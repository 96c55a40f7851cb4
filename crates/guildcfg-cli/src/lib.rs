//! guildcfg CLI
//!
//! Offline inspection, editing and migration of stored tenant configuration.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod commands;
mod roster;

pub use roster::Roster;

//! Roster files
//!
//! A roster is a YAML snapshot of one tenant's roles, channels and members
//! plus the module and command names the bot registers. It stands in for the
//! live chat directory when working on stored blobs offline.
//!
//! ```yaml
//! roles:
//!   - { id: "100", name: Mods }
//! channels:
//!   - { id: "200", name: general }
//! members:
//!   - { id: "400", username: twilight, nick: Twi }
//! modules: [basic, spam]
//! commands: [ban, roll]
//! ```

use anyhow::{Context, Result};
use guildcfg_core::{CodecContext, NameSet, StaticDirectory};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(flatten)]
    pub directory: StaticDirectory,
    #[serde(default)]
    pub modules: NameSet,
    #[serde(default)]
    pub commands: NameSet,
}

impl Roster {
    /// Parse a roster document
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Invalid roster document")
    }

    /// Read a roster file, or an empty roster when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster {}", path.display()))?;
        Self::from_yaml(&raw)
    }

    pub fn ctx(&self) -> CodecContext<'_> {
        CodecContext::new(&self.directory, &self.modules, &self.commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guildcfg_core::{Directory, NameRegistry, RoleId, UserId};

    #[test]
    fn parses_full_roster() {
        let roster = Roster::from_yaml(
            r#"
roles:
  - { id: "100", name: Mods }
channels:
  - { id: "200", name: general }
members:
  - { id: "400", username: twilight, nick: Twi }
modules: [Basic, spam]
commands: [ban]
"#,
        )
        .unwrap();

        assert_eq!(roster.directory.resolve_role("Mods"), Some(RoleId::new("100")));
        assert_eq!(roster.directory.resolve_user("Twi"), Some(UserId::new("400")));
        assert!(roster.modules.contains("basic"));
        assert!(roster.commands.contains("BAN"));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let roster = Roster::from_yaml("roles: []\n").unwrap();
        assert!(roster.modules.is_empty());
        assert!(roster.directory.roles().is_empty());
    }

    #[test]
    fn no_path_gives_empty_roster() {
        assert_eq!(Roster::load(None).unwrap(), Roster::default());
    }
}

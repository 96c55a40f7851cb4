//! Directory of live tenant entities
//!
//! [`Directory`] is the lookup seam for roles, channels and members; the
//! chat transport provides the real implementation. [`StaticDirectory`] is a
//! fixed roster used by tools and tests.

use crate::ids::{ChannelId, RoleId, UserId};
use crate::mention;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Live lookup of a tenant's roles, channels and members
///
/// Resolution accepts mention syntax, raw ids and names. Every method
/// returns `None` when the entity doesn't exist.
pub trait Directory: Send + Sync {
    /// Resolve role mention, id or name
    fn resolve_role(&self, text: &str) -> Option<RoleId>;

    /// Resolve channel mention, id or name
    fn resolve_channel(&self, text: &str) -> Option<ChannelId>;

    /// Resolve user mention, id, username or nickname
    fn resolve_user(&self, text: &str) -> Option<UserId>;

    /// Current role name
    fn role_name(&self, id: &RoleId) -> Option<String>;

    /// Current channel name
    fn channel_name(&self, id: &ChannelId) -> Option<String>;

    /// Nickname if set, otherwise username
    fn member_name(&self, id: &UserId) -> Option<String>;

    /// Exact (case-insensitive) role name lookup, no mention parsing
    fn role_by_name(&self, name: &str) -> Option<RoleId>;
}

/// Registered module or command names
pub trait NameRegistry: Send + Sync {
    /// All names, lower-cased
    fn names(&self) -> Vec<String>;

    /// Case-insensitive membership
    fn contains(&self, name: &str) -> bool {
        self.names().iter().any(|n| n.eq_ignore_ascii_case(name))
    }
}

/// Fixed set of names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NameSet(BTreeSet<String>);

impl NameSet {
    /// Create from names (lower-cased)
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(names.into_iter().map(|s| s.as_ref().to_lowercase()).collect())
    }

    /// Number of names
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl NameRegistry for NameSet {
    fn names(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    fn contains(&self, name: &str) -> bool {
        self.0.contains(&name.to_lowercase())
    }
}

/// Role entry in a static roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEntry {
    pub id: RoleId,
    pub name: String,
}

/// Channel entry in a static roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub id: ChannelId,
    pub name: String,
}

/// Member entry in a static roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEntry {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub nick: Option<String>,
}

impl MemberEntry {
    fn display_name(&self) -> &str {
        match &self.nick {
            Some(nick) if !nick.is_empty() => nick,
            _ => &self.username,
        }
    }
}

/// In-memory roster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticDirectory {
    #[serde(default)]
    roles: Vec<RoleEntry>,
    #[serde(default)]
    channels: Vec<ChannelEntry>,
    #[serde(default)]
    members: Vec<MemberEntry>,
}

impl StaticDirectory {
    /// Create empty roster
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role
    #[must_use]
    pub fn with_role(mut self, id: &str, name: &str) -> Self {
        self.roles.push(RoleEntry {
            id: RoleId::new(id),
            name: name.to_string(),
        });
        self
    }

    /// Add a channel
    #[must_use]
    pub fn with_channel(mut self, id: &str, name: &str) -> Self {
        self.channels.push(ChannelEntry {
            id: ChannelId::new(id),
            name: name.to_string(),
        });
        self
    }

    /// Add a member
    #[must_use]
    pub fn with_member(mut self, id: &str, username: &str, nick: Option<&str>) -> Self {
        self.members.push(MemberEntry {
            id: UserId::new(id),
            username: username.to_string(),
            nick: nick.map(str::to_string),
        });
        self
    }

    /// Roles in the roster
    #[inline]
    #[must_use]
    pub fn roles(&self) -> &[RoleEntry] {
        &self.roles
    }
}

impl Directory for StaticDirectory {
    fn resolve_role(&self, text: &str) -> Option<RoleId> {
        if let Some(id) = mention::parse_role(text) {
            return self.roles.iter().find(|r| r.id == id).map(|r| r.id.clone());
        }
        let name = text.trim();
        self.role_by_name(name.strip_prefix('@').unwrap_or(name))
    }

    fn resolve_channel(&self, text: &str) -> Option<ChannelId> {
        if let Some(id) = mention::parse_channel(text) {
            return self.channels.iter().find(|c| c.id == id).map(|c| c.id.clone());
        }
        let name = text.trim();
        let name = name.strip_prefix('#').unwrap_or(name);
        self.channels
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.id.clone())
    }

    fn resolve_user(&self, text: &str) -> Option<UserId> {
        if let Some(id) = mention::parse_user(text) {
            return self.members.iter().find(|m| m.id == id).map(|m| m.id.clone());
        }
        let name = text.trim();
        let name = name.strip_prefix('@').unwrap_or(name);
        self.members
            .iter()
            .find(|m| {
                m.username.eq_ignore_ascii_case(name)
                    || m.nick.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .map(|m| m.id.clone())
    }

    fn role_name(&self, id: &RoleId) -> Option<String> {
        self.roles.iter().find(|r| &r.id == id).map(|r| r.name.clone())
    }

    fn channel_name(&self, id: &ChannelId) -> Option<String> {
        self.channels
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.clone())
    }

    fn member_name(&self, id: &UserId) -> Option<String> {
        self.members
            .iter()
            .find(|m| &m.id == id)
            .map(|m| m.display_name().to_string())
    }

    fn role_by_name(&self, name: &str) -> Option<RoleId> {
        self.roles
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .map(|r| r.id.clone())
    }
}

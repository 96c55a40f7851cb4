//! Mention syntax
//!
//! Parses `<@&role>`, `<#channel>`, `<@user>` / `<@!user>` and raw numeric ids
//! without consulting a directory.

use crate::ids::{ChannelId, RoleId, UserId};
use once_cell::sync::Lazy;
use regex::Regex;

static ROLE_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<@&(\d+)>$").expect("role mention pattern"));
static CHANNEL_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<#(\d+)>$").expect("channel mention pattern"));
static USER_MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<@!?(\d+)>$").expect("user mention pattern"));

/// Check if text is a bare snowflake
#[inline]
#[must_use]
pub fn is_snowflake(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn capture<'a>(pattern: &Regex, text: &'a str) -> Option<&'a str> {
    let text = text.trim();
    if is_snowflake(text) {
        return Some(text);
    }
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Parse a role mention or raw id
#[must_use]
pub fn parse_role(text: &str) -> Option<RoleId> {
    capture(&ROLE_MENTION, text).map(RoleId::from)
}

/// Parse a channel mention or raw id
#[must_use]
pub fn parse_channel(text: &str) -> Option<ChannelId> {
    capture(&CHANNEL_MENTION, text).map(ChannelId::from)
}

/// Parse a user mention (with or without `!`) or raw id
#[must_use]
pub fn parse_user(text: &str) -> Option<UserId> {
    capture(&USER_MENTION, text).map(UserId::from)
}

/// Render a role as mention syntax
#[inline]
#[must_use]
pub fn role_mention(id: &RoleId) -> String {
    format!("<@&{id}>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_forms() {
        assert_eq!(parse_role("<@&123>"), Some(RoleId::new("123")));
        assert_eq!(parse_role("123"), Some(RoleId::new("123")));
        assert_eq!(parse_role(" 123 "), Some(RoleId::new("123")));
        assert_eq!(parse_role("<#123>"), None);
        assert_eq!(parse_role("mods"), None);
    }

    #[test]
    fn channel_forms() {
        assert_eq!(parse_channel("<#55>"), Some(ChannelId::new("55")));
        assert_eq!(parse_channel("#general"), None);
    }

    #[test]
    fn user_forms() {
        assert_eq!(parse_user("<@9>"), Some(UserId::new("9")));
        assert_eq!(parse_user("<@!9>"), Some(UserId::new("9")));
        assert_eq!(parse_user("<@&9>"), None);
    }

    #[test]
    fn empty_is_not_snowflake() {
        assert!(!is_snowflake(""));
        assert!(parse_role("").is_none());
    }

    #[test]
    fn mention_roundtrip() {
        let id = RoleId::new("77");
        assert_eq!(parse_role(&role_mention(&id)), Some(id));
    }
}

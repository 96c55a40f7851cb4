//! Help text for options
//!
//! Keyed by lower-cased `(category, option)`. The host application can
//! replace or extend the built-in table.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

/// Placeholder shown when an option has no help entry
pub const HELP_PLACEHOLDER: &str = "\u{200b}";

/// Help text table
#[derive(Debug, Clone, Default)]
pub struct HelpTable {
    entries: HashMap<(String, String), String>,
}

static BUILTIN: Lazy<Arc<HelpTable>> = Lazy::new(|| Arc::new(HelpTable::from_entries(BUILTIN_ENTRIES)));

const BUILTIN_ENTRIES: &[(&str, &str, &str)] = &[
    ("basic", "ignoreinvalidcommands", "If true, unknown commands are ignored silently instead of producing an error."),
    ("basic", "importable", "If true, this server's collections can be imported by other servers."),
    ("basic", "modrole", "Moderator role shared by every admin and moderator, used for notifications and command restrictions."),
    ("basic", "modchannel", "Channel where moderators receive notifications."),
    ("basic", "freechannels", "Channels exempt from command rate limiting."),
    ("basic", "botchannel", "Channel users are pointed to when they run too many commands at once."),
    ("basic", "aliases", "Redirects one command name to another command line, keeping any extra arguments. Example: `basic.aliases kawaii \"pick cute\"`."),
    ("basic", "listentobots", "If true, messages from other bots are processed and may run commands."),
    ("basic", "commandprefix", "Single ASCII character that starts a bot command. Defaults to `!`."),
    ("basic", "silencerole", "Role without permissions used to quarantine suspected spammers."),
    ("modules", "channels", "Channels each module may operate on. No entry means every channel; including `!` turns the list into a blacklist."),
    ("modules", "disabled", "Disabled modules."),
    ("modules", "commandroles", "Roles allowed to run each command. No entry means everyone may run it."),
    ("modules", "commandchannels", "Channels each command may run on. No entry means every channel; including `!` turns the list into a blacklist."),
    ("modules", "commandlimits", "Per-command cooldown in seconds."),
    ("modules", "commanddisabled", "Disabled commands."),
    ("modules", "commandperduration", "Maximum number of commands allowed within `commandmaxduration` seconds. Default: 3"),
    ("modules", "commandmaxduration", "Window in seconds for `commandperduration`. Default: 15"),
    ("spam", "imagepressure", "Pressure added per image, link or attachment. Defaults to (MaxPressure - BasePressure) / 6."),
    ("spam", "pingpressure", "Pressure added per unique ping. Defaults to (MaxPressure - BasePressure) / 20."),
    ("spam", "lengthpressure", "Pressure added per character. Defaults to (MaxPressure - BasePressure) / 8000."),
    ("spam", "repeatpressure", "Pressure added when a message repeats the previous one. Defaults to BasePressure."),
    ("spam", "linepressure", "Pressure added per newline. Defaults to (MaxPressure - BasePressure) / 70."),
    ("spam", "basepressure", "Pressure generated by any message. Defaults to 10."),
    ("spam", "maxpressure", "Pressure at which a user is silenced. Defaults to 60."),
    ("spam", "maxchannelpressure", "Per-channel override of `maxpressure`."),
    ("spam", "pressuredecay", "Seconds needed to shed BasePressure worth of pressure. Defaults to 2.5."),
    ("spam", "maxremovelookback", "Seconds of a silenced user's messages to delete. 0 deletes only the triggering message; negative deletes nothing."),
    ("spam", "ignorerole", "Members with this role are excluded from spam detection."),
    ("spam", "raidtime", "Window in seconds within which `raidsize` joins count as a raid."),
    ("spam", "raidsize", "Number of joins within `raidtime` that count as a raid."),
    ("spam", "autosilence", "Current autosilence state. Change it with the autosilence command."),
    ("spam", "lockdownduration", "Seconds the verification level stays raised after a raid. 0 disables lockdown."),
    ("users", "timezonelocation", "Server timezone used when a member has none."),
    ("users", "welcomechannel", "Quarantine channel for silenced members; new members land here when autosilence is on."),
    ("users", "welcomemessage", "Message sent to new members when autosilence is on."),
    ("users", "silencemessage", "Message sent to members silenced by a moderator."),
    ("users", "roles", "User-assignable roles."),
    ("users", "notifychannel", "Channel notified whenever a member joins."),
    ("users", "trackuserleft", "If true, departures are also reported to `notifychannel`."),
    ("bucket", "maxitems", "Maximum number of items in the bucket. 0 disables it."),
    ("bucket", "maxitemlength", "Maximum length of a bucket item."),
    ("bucket", "maxfighthp", "Maximum HP of a generated enemy."),
    ("bucket", "maxfightdamage", "Maximum damage of a generated weapon."),
    ("bucket", "items", "Items currently in the bucket."),
    ("markov", "maxpmlines", "Responses longer than this many lines are sent privately. Default: 5"),
    ("markov", "maxlines", "Maximum number of lines an episode quote may request."),
    ("markov", "defaultlines", "Lines generated when no count is given."),
    ("markov", "usemembernames", "Use member names instead of random names."),
    ("filter", "filters", "Word list of each filter, joined into a single `(a|b|...)` pattern."),
    ("filter", "channels", "Channels excluded from each filter."),
    ("filter", "responses", "Message sent when each filter triggers."),
    ("filter", "templates", "Regex template of each filter; `%%` is replaced by the word pattern."),
    ("bored", "cooldown", "Seconds of channel inactivity before a bored command runs."),
    ("bored", "commands", "Commands picked at random when a channel is idle."),
    ("information", "rules", "Numbered rules. Numbers need not be contiguous and may be negative."),
    ("information", "hidenegativerules", "If true, negative rules are only shown when asked for by number."),
    ("log", "channel", "Channel that receives log output."),
    ("log", "cooldown", "Minimum seconds between error messages. Default: 4"),
    ("witty", "responses", "Witty trigger/reply pairs."),
    ("witty", "cooldown", "Minimum seconds between witty replies."),
    ("scheduler", "birthdayrole", "Role given to members on their birthday."),
    ("miscellaneous", "maxsearchresults", "Maximum search results returned at once."),
    ("status", "cooldown", "Seconds between status changes."),
    ("status", "lines", "Possible status messages."),
    ("quote", "quotes", "Quotes per member."),
];

impl HelpTable {
    /// Create an empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn from_entries(entries: &[(&str, &str, &str)]) -> Self {
        let mut table = Self::new();
        for (category, option, text) in entries {
            table.insert(category, option, *text);
        }
        table
    }

    /// Shared built-in table
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Add or replace an entry
    pub fn insert(&mut self, category: &str, option: &str, text: impl Into<String>) {
        self.entries
            .insert((category.to_lowercase(), option.to_lowercase()), text.into());
    }

    /// Case-insensitive lookup
    #[must_use]
    pub fn lookup(&self, category: &str, option: &str) -> Option<&str> {
        self.entries
            .get(&(category.to_lowercase(), option.to_lowercase()))
            .map(String::as_str)
    }

    /// Lookup falling back to the placeholder
    #[must_use]
    pub fn text(&self, category: &str, option: &str) -> &str {
        self.lookup(category, option).unwrap_or(HELP_PLACEHOLDER)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::registry;

    #[test]
    fn builtin_covers_every_option() {
        let help = HelpTable::builtin();
        for category in registry().categories() {
            for option in category.options() {
                assert!(
                    help.lookup(category.name(), option.name()).is_some(),
                    "{}.{} has no help",
                    category.name(),
                    option.name()
                );
            }
        }
    }

    #[test]
    fn missing_entry_uses_placeholder() {
        let help = HelpTable::new();
        assert_eq!(help.text("Basic", "ModRole"), HELP_PLACEHOLDER);
    }

    #[test]
    fn overrides_replace_text() {
        let mut help = HelpTable::new();
        help.insert("Basic", "ModRole", "mods");
        assert_eq!(help.lookup("basic", "modrole"), Some("mods"));
    }
}

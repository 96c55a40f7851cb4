//! Options that changed category in version 21

use super::decode_legacy;
use crate::env::MigrationEnv;
use crate::error::MigrationError;
use crate::pipeline::{MigrationStep, VersionGate};
use async_trait::async_trait;
use guildcfg_core::{ChannelId, GuildConfig, RoleId, Set};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

const SPOILER_RESPONSE: &str = "[](/nospoilers) ```\nNO SPOILERS! Posting spoilers is a bannable offense. \
All discussion about new and future content MUST be in #mylittlespoilers.```";
const EMOTE_RESPONSE: &str = "```\nThat emote isn't allowed here! Try to avoid using large or disturbing emotes, \
as they can be problematic.```";
const EMOTE_TEMPLATE: &str = r#"\[\]\(\/r?%%[-) "]"#;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LayoutV20 {
    collections: Option<BTreeMap<String, Option<Set<String>>>>,
    spam: SpamV20,
    basic: BasicV20,
    search: SearchV20,
    spoiler: SpoilerV20,
    schedule: ScheduleV20,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpamV20 {
    silentrole: Option<RoleId>,
    silencemessage: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BasicV20 {
    alertrole: Option<RoleId>,
    trackuserleft: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchV20 {
    maxsearchresults: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpoilerV20 {
    spoilchannels: Option<Vec<ChannelId>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScheduleV20 {
    birthdayrole: Option<RoleId>,
}

/// Move options into their version 21 categories
///
/// Only fields present in the blob are moved; anything else keeps the value
/// earlier steps produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryMoves;

impl CategoryMoves {
    fn move_collections(collections: BTreeMap<String, Option<Set<String>>>, config: &mut GuildConfig) {
        for (name, items) in collections {
            let items = items.unwrap_or_default();
            match name.as_str() {
                "bucket" => config.bucket.items.extend(items),
                "status" => config.status.lines.extend(items),
                "spoiler" | "emote" if !items.is_empty() => {
                    config.filter.filters.entry(name.clone()).or_default().extend(items);
                }
                _ => {}
            }
        }
    }

    fn fill_filter_defaults(config: &mut GuildConfig) {
        let filter = &mut config.filter;
        let spoiler_words = filter.filters.get("spoiler").is_some_and(|w| !w.is_empty());
        let spoiler_channels = filter.channels.get("spoiler").is_some_and(|c| !c.is_empty());
        if spoiler_words || spoiler_channels {
            filter.filters.entry("spoiler".to_string()).or_default();
            filter.channels.entry("spoiler".to_string()).or_default();
            filter
                .responses
                .entry("spoiler".to_string())
                .or_insert_with(|| SPOILER_RESPONSE.to_string());
        }

        if filter.filters.get("emote").is_some_and(|w| !w.is_empty()) {
            filter.channels.entry("emote".to_string()).or_default();
            filter
                .responses
                .entry("emote".to_string())
                .or_insert_with(|| EMOTE_RESPONSE.to_string());
            filter
                .templates
                .entry("emote".to_string())
                .or_insert_with(|| EMOTE_TEMPLATE.to_string());
        }
    }
}

#[async_trait]
impl MigrationStep for CategoryMoves {
    fn name(&self) -> &'static str {
        "category-moves"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(21)
    }

    async fn apply(&self, raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        let legacy: LayoutV20 = decode_legacy(self.name(), raw)?;

        if let Some(role) = legacy.basic.alertrole {
            config.basic.mod_role = role;
        }
        if let Some(track) = legacy.basic.trackuserleft {
            config.users.track_user_left = track;
        }
        if let Some(results) = legacy.search.maxsearchresults {
            config.miscellaneous.max_search_results = results;
        }
        if let Some(role) = legacy.schedule.birthdayrole {
            config.scheduler.birthday_role = role;
        }
        if let Some(message) = legacy.spam.silencemessage {
            config.users.silence_message = message;
        }
        if let Some(role) = legacy.spam.silentrole {
            config.basic.silence_role = role;
        }
        if let Some(channels) = legacy.spoiler.spoilchannels {
            let spoiler = config.filter.channels.entry("spoiler".to_string()).or_default();
            spoiler.extend(channels.into_iter().map(|ch| (ch, true)));
        }
        if let Some(collections) = legacy.collections {
            Self::move_collections(collections, config);
        }
        Self::fill_filter_defaults(config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::testing::apply_offline;
    use serde_json::json;

    #[tokio::test]
    async fn fields_move_to_new_categories() {
        let raw = json!({
            "version": 20,
            "basic": { "alertrole": "100", "trackuserleft": true },
            "search": { "maxsearchresults": 7 },
            "schedule": { "birthdayrole": "101" },
            "spam": { "silentrole": "102", "silencemessage": "shh" },
            "spoiler": { "spoilchannels": ["300"] }
        });
        let config = apply_offline(&CategoryMoves, &raw).await.unwrap();
        assert_eq!(config.basic.mod_role, RoleId::new("100"));
        assert!(config.users.track_user_left);
        assert_eq!(config.miscellaneous.max_search_results, 7);
        assert_eq!(config.scheduler.birthday_role, RoleId::new("101"));
        assert_eq!(config.basic.silence_role, RoleId::new("102"));
        assert_eq!(config.users.silence_message, "shh");
        assert!(config.filter.channels["spoiler"].contains_key(&ChannelId::new("300")));
        assert_eq!(config.filter.responses["spoiler"], SPOILER_RESPONSE);
    }

    #[tokio::test]
    async fn absent_fields_are_kept() {
        let raw = json!({ "version": 20, "basic": { "modrole": "100" }, "misc": { "maxsearchresults": 3 } });
        let config = apply_offline(&CategoryMoves, &raw).await.unwrap();
        assert_eq!(config.basic.mod_role, RoleId::new("100"));
        assert_eq!(config.miscellaneous.max_search_results, 3);
        assert!(config.filter.responses.is_empty());
    }

    #[tokio::test]
    async fn top_level_collections_merge() {
        let raw = json!({
            "version": 20,
            "bucket": { "items": { "a hat": true } },
            "collections": {
                "bucket": { "a shoe": true },
                "status": { "napping": true },
                "emote": { "rarity": true },
                "spoiler": {},
                "ponies": { "applejack": true }
            }
        });
        let config = apply_offline(&CategoryMoves, &raw).await.unwrap();
        assert_eq!(config.bucket.items.len(), 2);
        assert!(config.status.lines.contains_key("napping"));
        assert!(config.filter.filters["emote"].contains_key("rarity"));
        assert_eq!(config.filter.templates["emote"], EMOTE_TEMPLATE);
        assert!(config.filter.channels["emote"].is_empty());
        assert!(!config.filter.filters.contains_key("spoiler"));
        assert!(!config.filter.filters.contains_key("ponies"));
    }

    #[tokio::test]
    async fn custom_responses_survive() {
        let raw = json!({
            "version": 20,
            "filter": { "filters": { "emote": { "x": true } }, "responses": { "emote": "no" } }
        });
        let config = apply_offline(&CategoryMoves, &raw).await.unwrap();
        assert_eq!(config.filter.responses["emote"], "no");
    }
}

//! MigrationPipeline Tests
//!
//! Whole-pipeline runs over blobs from several historical versions.

use guildcfg_core::{ChannelId, CommandId, ModuleId, RoleId, UserId, CURRENT_VERSION};
use guildcfg_migrate::{
    MigrationEnv, MigrationError, MigrationPipeline, OfflineEffects, GROUP_EVENT_KIND,
};
use guildcfg_test_utils::{blobs, directory, tenant, Effects, MemoryStore, RecordingRoles};
use pretty_assertions::assert_eq;

/// Commands restricted by steps for versions 10 through 20
const RESTRICTED: &[&str] = &[
    "addevent", "addbirthday", "autosilence", "silence", "unsilence", "wipewelcome", "new",
    "addquote", "removequote", "removealias", "delete", "createpoll", "deletepoll", "addoption",
    "getaudit", "addrole", "removerole", "deleterole", "bannewcomers", "banraid", "getraid", "wipe",
    "getpressure", "addset", "removeset", "searchset",
];

fn schedule() -> MemoryStore {
    MemoryStore::new()
        .with_event(1, GROUP_EVENT_KIND, "ponies+Readers|movie night")
        .with_event(2, GROUP_EVENT_KIND, "ponies")
        .with_event(3, 5, "ponies|not a group reminder")
}

#[tokio::test]
async fn test_flat_v9_full_migration() {
    let effects = Effects::new().with_store(schedule());
    let migrated = MigrationPipeline::standard()
        .migrate(&blobs::flat_v9(), &effects.env())
        .await
        .unwrap();
    let config = &migrated.config;

    assert_eq!(config.version, CURRENT_VERSION);
    assert!(migrated.needs_save);
    assert!(migrated.report.skipped.is_empty(), "{:?}", migrated.report.skipped);
    assert_eq!(migrated.report.applied.len(), 16);
    assert!(!migrated.report.applied.contains(&"command-throttle"));

    // one role per group, `ponies` collides with an existing role
    assert_eq!(effects.roles.created_names(), vec!["Silence", "sb-ponies", "readers"]);
    let silence = effects.roles.role_named("Silence").unwrap();
    let ponies = effects.roles.role_named("sb-ponies").unwrap();
    let readers = effects.roles.role_named("readers").unwrap();
    assert_eq!(config.basic.silence_role, silence);
    assert_eq!(config.users.roles.len(), 2);
    assert!(config.users.roles.contains_key(&ponies));
    assert!(config.users.roles.contains_key(&readers));
    assert_eq!(effects.roles.members_of(&ponies), vec![UserId::new("400"), UserId::new("401")]);
    assert_eq!(effects.roles.members_of(&readers), vec![UserId::new("400")]);

    assert_eq!(
        effects.store.event_data(1).unwrap(),
        format!("<@&{ponies}> <@&{readers}>|movie night")
    );
    assert_eq!(effects.store.event_data(2).unwrap(), "ponies");
    assert_eq!(effects.store.event_data(3).unwrap(), "ponies|not a group reminder");

    let mod_role = RoleId::new("100");
    assert_eq!(config.basic.mod_role, mod_role);
    for command in RESTRICTED {
        let roles = &config.modules.command_roles[&CommandId::new(*command)];
        assert!(roles.contains_key(&mod_role), "{command} is not restricted");
    }
}

#[tokio::test]
async fn test_flat_v9_settings_survive() {
    let effects = Effects::new();
    let migrated = MigrationPipeline::standard()
        .migrate(&blobs::flat_v9(), &effects.env())
        .await
        .unwrap();
    let config = &migrated.config;

    assert_eq!(config.basic.command_prefix, "!");
    assert!(config.setup_done);
    assert_eq!(config.spam.lockdown_duration, 120);
    assert_eq!(config.spam.max_pressure, 60.0);
    assert_eq!(config.spam.line_pressure, 50.0 / 70.0);
    assert_eq!(config.users.timezone_location, "America/New_York");
    assert_eq!(config.basic.aliases["cute"], "pick cute");
    assert_eq!(config.witty.responses["hello"], "hi there");
    assert_eq!(config.quote.quotes[&UserId::new("401")], vec!["How dreadful"]);
    assert!(config.users.welcome_channel.is_unset());

    // autosilence -2 reported joins to the log channel
    assert_eq!(config.users.notify_channel, ChannelId::new("202"));
    assert_eq!(config.spam.auto_silence, 0);

    assert!(config.modules.channels.contains_key(&ModuleId::new("scheduler")));
    assert!(config.modules.disabled.contains_key(&ModuleId::new("spam")));

    assert!(config.bucket.items.contains_key("a hat"));
    assert!(config.status.lines.contains_key("napping"));
    assert!(config.filter.filters["spoiler"].contains_key("finale"));
    assert!(config.filter.channels["spoiler"].contains_key(&ChannelId::new("200")));
    assert!(config.filter.responses.contains_key("spoiler"));
    assert_eq!(
        effects.store.imports.lock().get("cutemarks").cloned(),
        Some(vec!["apple".to_string(), "star".to_string()])
    );
}

#[tokio::test]
async fn test_offline_migration_reports_side_effects() {
    let tenant = tenant();
    let dir = directory();
    let env = MigrationEnv::new(&tenant, &dir, &OfflineEffects, &OfflineEffects);
    let migrated = MigrationPipeline::standard()
        .migrate(&blobs::flat_v9(), &env)
        .await
        .unwrap();

    let skipped: Vec<&str> = migrated.report.skipped.iter().map(|s| s.step).collect();
    assert_eq!(skipped, vec!["silence-role", "groups-to-roles", "import-collections"]);
    assert_eq!(migrated.config.version, CURRENT_VERSION);
    assert!(migrated.config.basic.silence_role.is_unset());
    assert!(migrated.config.users.roles.is_empty());
    assert!(migrated.config.bucket.items.contains_key("a hat"));
}

#[tokio::test]
async fn test_nested_v12_migration() {
    let effects = Effects::new();
    let migrated = MigrationPipeline::standard()
        .migrate(&blobs::nested_v12(), &effects.env())
        .await
        .unwrap();
    let config = &migrated.config;

    assert!(migrated.report.skipped.is_empty());
    assert_eq!(config.spam.image_pressure, 10.0);
    assert_eq!(config.spam.ping_pressure, 0.0);
    assert_eq!(effects.roles.created_names(), vec!["artists"]);
    assert_eq!(config.users.roles.len(), 1);
    assert!(config.bucket.items.contains_key("a shoe"));
    assert_eq!(config.basic.mod_role, RoleId::new("100"));
    assert_eq!(config.users.notify_channel, ChannelId::new("201"));
    assert_eq!(config.modules.command_per_duration, 3);
}

#[tokio::test]
async fn test_v20_category_moves() {
    let effects = Effects::new();
    let migrated = MigrationPipeline::standard()
        .migrate(&blobs::v20(), &effects.env())
        .await
        .unwrap();
    let config = &migrated.config;

    assert_eq!(migrated.report.applied, vec!["category-moves", "normalize"]);
    assert!(effects.roles.created_names().is_empty());
    assert_eq!(config.basic.mod_role, RoleId::new("100"));
    assert!(config.basic.mod_channel.is_unset());
    assert_eq!(config.basic.silence_role, RoleId::new("102"));
    assert_eq!(config.users.silence_message, "shh");
    assert!(config.users.track_user_left);
    assert_eq!(config.miscellaneous.max_search_results, 7);
    assert!(config.scheduler.birthday_role.is_unset());
    assert!(config.filter.channels["spoiler"].contains_key(&ChannelId::new("200")));
    assert!(config.filter.filters["emote"].contains_key("rarity"));
    assert!(config.filter.templates.contains_key("emote"));
}

#[tokio::test]
async fn test_current_blob_needs_nothing() {
    let effects = Effects::new();
    let migrated = MigrationPipeline::standard()
        .migrate(&blobs::current(), &effects.env())
        .await
        .unwrap();

    assert!(!migrated.needs_save);
    assert!(migrated.report.applied.is_empty());
    assert_eq!(migrated.config.bucket.max_items, 3);
}

#[tokio::test]
async fn test_malformed_legacy_shape_is_skipped() {
    let effects = Effects::new();
    let raw = r#"{"version": 19, "basic": {"modrole": "100", "collections": "oops"}}"#;
    let migrated = MigrationPipeline::standard()
        .migrate(raw, &effects.env())
        .await
        .unwrap();

    let skipped: Vec<&str> = migrated.report.skipped.iter().map(|s| s.step).collect();
    assert_eq!(skipped, vec!["collections", "import-collections"]);
    assert_eq!(migrated.config.version, CURRENT_VERSION);
    assert!(migrated.config.modules.command_roles.contains_key(&CommandId::new("addset")));
}

#[tokio::test]
async fn test_partial_group_failure_keeps_created_roles() {
    let effects = Effects::new().with_roles(RecordingRoles::new().failing_on("readers"));
    let migrated = MigrationPipeline::standard()
        .migrate(&blobs::flat_v9(), &effects.env())
        .await
        .unwrap();

    assert!(migrated.report.applied.contains(&"groups-to-roles"));
    assert_eq!(migrated.config.users.roles.len(), 1);
    assert_eq!(effects.roles.created_names(), vec!["Silence", "sb-ponies"]);
}

#[tokio::test]
async fn test_undecodable_blob_is_fatal() {
    let effects = Effects::new();
    let err = MigrationPipeline::standard()
        .migrate(r#""just text""#, &effects.env())
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, MigrationError::Decode(_)));
}

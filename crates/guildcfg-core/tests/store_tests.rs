//! ConfigStore Tests
//!
//! Get/Set through user-typed paths against the shared roster.

use guildcfg_core::prelude::*;
use guildcfg_core::{registry, GetResponse, ValueKind};
use guildcfg_test_utils::Fixture;
use pretty_assertions::assert_eq;

fn option_lines(store: &ConfigStore, path: &str, ctx: &CodecContext<'_>) -> Vec<String> {
    match store.get(path, None, ctx).unwrap() {
        GetResponse::Option { lines, .. } => lines,
        other => panic!("{path} is not an option: {other:?}"),
    }
}

fn populated(ctx: &CodecContext<'_>) -> ConfigStore {
    let mut store = ConfigStore::fresh();
    for (path, value, extra) in [
        ("Basic.FreeChannels", "200", &["<#201>"][..]),
        ("Users.Roles", "101", &[][..]),
        ("Bucket.Items", "a hat", &["a shoe"][..]),
        ("Status.Lines", "napping", &[][..]),
        ("Modules.Disabled", "Bucket", &[][..]),
        ("Modules.CommandDisabled", "fight", &[][..]),
        ("Users.WelcomeMessage", "hello", &[][..]),
        ("Users.TimezoneLocation", "Etc/GMT+5", &[][..]),
    ] {
        let outcome = store.set(path, value, extra, ctx);
        assert!(outcome.success, "{path}: {}", outcome.message);
    }
    store
}

#[test]
fn test_get_set_get_roundtrip() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut store = populated(&ctx);

    for category in registry().categories() {
        for option in category.options() {
            let path = format!("{}.{}", category.name(), option.name());
            let roundtrips = matches!(
                option.kind(),
                ValueKind::Scalar(_) | ValueKind::Reference(_) | ValueKind::List(..)
            );
            if !roundtrips {
                continue;
            }
            let before = option_lines(&store, &path, &ctx);
            let Some((first, rest)) = before.split_first() else {
                continue;
            };
            let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
            let outcome = store.set(&path, first, &rest, &ctx);
            assert!(outcome.success, "{path}: {}", outcome.message);
            assert_eq!(option_lines(&store, &path, &ctx), before, "{path}");
        }
    }
}

#[test]
fn test_reference_display_differs_from_input() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut store = ConfigStore::fresh();

    let outcome = store.set("Basic.ModRole", "100", &[], &ctx);
    assert_eq!(outcome.message, "@Mods");
    assert_eq!(store.get_lines(Some("Basic.ModRole"), None, &ctx), vec!["Basic.ModRole: @Mods"]);
    assert_eq!(store.config().basic.mod_role.as_str(), "100");

    store.set("Basic.ModRole", "@Mods", &[], &ctx);
    assert_eq!(store.config().basic.mod_role.as_str(), "100");
    store.set("Basic.ModRole", "<@&101>", &[], &ctx);
    assert_eq!(store.get_lines(Some("modrole"), None, &ctx), vec!["Basic.ModRole: @Ponies"]);
}

#[test]
fn test_unknown_reference_is_rejected() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut store = ConfigStore::fresh();

    let outcome = store.set("Basic.ModChannel", "nowhere", &[], &ctx);
    assert!(!outcome.success);
    assert!(store.config().basic.mod_channel.is_unset());

    let outcome = store.set("Modules.Disabled", "nonsense", &[], &ctx);
    assert_eq!(outcome.message, "nonsense is not a module name!");
}

#[test]
fn test_max_pressure_scenario() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut store = ConfigStore::fresh();

    assert!(store.set("Spam.MaxPressure", "75", &[], &ctx).success);
    assert_eq!(option_lines(&store, "Spam.MaxPressure", &ctx), vec!["75"]);

    let mut store = ConfigStore::fresh();
    let outcome = store.set("Spam.MaxPressure", "notanumber", &[], &ctx);
    assert!(!outcome.success);
    assert!(matches!(
        store.try_set("Spam.MaxPressure", "notanumber", &[], &ctx),
        Err(ConfigError::Parse { .. })
    ));
    assert_eq!(option_lines(&store, "Spam.MaxPressure", &ctx), vec!["60"]);
}

#[test]
fn test_alias_scenario() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut store = ConfigStore::fresh();

    assert!(store.set("Basic.Aliases", "kawaii", &["pick cute"], &ctx).success);
    assert_eq!(store.config().basic.aliases["kawaii"], "pick cute");
    match store.get("Basic.Aliases", Some("kawaii"), &ctx).unwrap() {
        GetResponse::Option { lines, .. } => assert_eq!(lines, vec!["pick cute"]),
        other => panic!("unexpected {other:?}"),
    }

    assert!(store.set("Basic.Aliases", "kawaii", &[""], &ctx).success);
    assert_eq!(
        store.get_lines(Some("Basic.Aliases"), Some("kawaii"), &ctx),
        vec!["can't find kawaii"]
    );
}

#[test]
fn test_map_set_without_value_keeps_key() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut store = ConfigStore::fresh();
    assert!(store.set("Basic.Aliases", "kawaii", &["pick cute"], &ctx).success);

    assert_eq!(
        store.try_set("Basic.Aliases", "kawaii", &[], &ctx),
        Err(ConfigError::MissingArgument("No value parameter given"))
    );
    let outcome = store.set("Basic.Aliases", "kawaii", &[], &ctx);
    assert!(!outcome.success);
    assert_eq!(outcome.message, "No value parameter given");
    assert_eq!(store.config().basic.aliases["kawaii"], "pick cute");
}

#[test]
fn test_map_errors_name_the_argument() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut store = ConfigStore::fresh();

    let outcome = store.set("Information.Rules", "first", &["be nice"], &ctx);
    assert!(!outcome.success);
    assert!(outcome.message.starts_with("Key error: "), "{}", outcome.message);

    let outcome = store.set("Modules.CommandRoles", "nosuch", &["@Mods"], &ctx);
    assert_eq!(outcome.message, "Key error: nosuch is not a command name!");
    assert!(store.config().information.rules.is_empty());
}

#[test]
fn test_clearing_a_list() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut store = populated(&ctx);

    assert!(store.set("Bucket.Items", "", &[], &ctx).success);
    assert!(store.config().bucket.items.is_empty());
    assert_eq!(store.get_lines(Some("Bucket.Items"), None, &ctx), vec!["Bucket.Items: [empty]"]);
}

#[test]
fn test_ambiguous_option() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let store = ConfigStore::fresh();

    assert_eq!(
        store.get_lines(Some("cooldown"), None, &ctx),
        vec!["Could be any of the following:\nBored.Cooldown\nLog.Cooldown\nWitty.Cooldown\nStatus.Cooldown"]
    );
}

#[test]
fn test_json_roundtrip_keeps_settings() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let store = populated(&ctx);

    let restored = ConfigStore::from_json(&store.to_json().unwrap()).unwrap();
    assert_eq!(restored.config(), store.config());
    assert_eq!(restored.version(), CURRENT_VERSION);
}

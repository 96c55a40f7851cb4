//! Small steps: command restrictions and single-field defaults

use super::decode_legacy;
use crate::env::MigrationEnv;
use crate::error::MigrationError;
use crate::pipeline::{MigrationStep, VersionGate};
use async_trait::async_trait;
use guildcfg_core::GuildConfig;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

fn restrict_all(config: &mut GuildConfig, commands: &[&str]) {
    for command in commands {
        if config.restrict_command(command) {
            debug!(command, "Restricted command to moderators");
        }
    }
}

/// Restrict newly introduced commands to the moderator role
#[derive(Debug, Clone, Copy)]
pub struct RestrictCommands {
    name: &'static str,
    below: i64,
    commands: &'static [&'static str],
}

impl RestrictCommands {
    /// Restrict `commands` for blobs older than `below`
    #[must_use]
    pub const fn new(name: &'static str, below: i64, commands: &'static [&'static str]) -> Self {
        Self {
            name,
            below,
            commands,
        }
    }
}

#[async_trait]
impl MigrationStep for RestrictCommands {
    fn name(&self) -> &'static str {
        self.name
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(self.below)
    }

    async fn apply(&self, _raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        restrict_all(config, self.commands);
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThrottleV10 {
    basic: ThrottleFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThrottleFields {
    commandperduration: i64,
    commandmaxduration: i64,
}

/// Version 10 kept the command throttle under `basic`
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandThrottle;

#[async_trait]
impl MigrationStep for CommandThrottle {
    fn name(&self) -> &'static str {
        "command-throttle"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::exactly(10)
    }

    async fn apply(&self, raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        let legacy: ThrottleV10 = decode_legacy(self.name(), raw)?;
        config.modules.command_per_duration = legacy.basic.commandperduration;
        config.modules.command_max_duration = legacy.basic.commandmaxduration;
        Ok(())
    }
}

/// Lockdown after raids
#[derive(Debug, Clone, Copy, Default)]
pub struct Lockdown;

#[async_trait]
impl MigrationStep for Lockdown {
    fn name(&self) -> &'static str {
        "lockdown"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(16)
    }

    async fn apply(&self, _raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        restrict_all(config, &["bannewcomers"]);
        config.spam.lockdown_duration = 120;
        Ok(())
    }
}

/// Configurable command prefix
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandPrefix;

#[async_trait]
impl MigrationStep for CommandPrefix {
    fn name(&self) -> &'static str {
        "command-prefix"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(17)
    }

    async fn apply(&self, _raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        config.basic.command_prefix = "!".to_string();
        Ok(())
    }
}

/// Existing tenants skip the setup flow
#[derive(Debug, Clone, Copy, Default)]
pub struct SetupDone;

#[async_trait]
impl MigrationStep for SetupDone {
    fn name(&self) -> &'static str {
        "setup-done"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(18)
    }

    async fn apply(&self, _raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        config.setup_done = true;
        Ok(())
    }
}

/// Raid commands and line pressure
#[derive(Debug, Clone, Copy, Default)]
pub struct RaidCommands;

#[async_trait]
impl MigrationStep for RaidCommands {
    fn name(&self) -> &'static str {
        "raid-commands"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(19)
    }

    async fn apply(&self, _raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        restrict_all(config, &["banraid", "getraid", "wipe", "bannewcomers", "getpressure"]);
        let spam = &mut config.spam;
        spam.line_pressure = (spam.max_pressure - spam.base_pressure) / 70.0;
        Ok(())
    }
}

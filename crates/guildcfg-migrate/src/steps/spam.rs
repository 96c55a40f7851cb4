//! Pressure-based spam model
//!
//! Version 13 replaced per-kind message limits with a single pressure budget.

use super::decode_legacy;
use crate::env::MigrationEnv;
use crate::error::MigrationError;
use crate::pipeline::{MigrationStep, VersionGate};
use async_trait::async_trait;
use guildcfg_core::{GuildConfig, SpamConfig};
use serde::Deserialize;
use serde_json::Value;

fn headroom(spam: &SpamConfig) -> f64 {
    spam.max_pressure - spam.base_pressure
}

/// Reset the pressure model to its defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct SpamPressure;

#[async_trait]
impl MigrationStep for SpamPressure {
    fn name(&self) -> &'static str {
        "spam-pressure"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(13)
    }

    async fn apply(&self, _raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        let spam = &mut config.spam;
        spam.base_pressure = 10.0;
        spam.max_pressure = 60.0;
        spam.image_pressure = headroom(spam) / 6.0;
        spam.ping_pressure = headroom(spam) / 24.0;
        spam.length_pressure = headroom(spam) / 8000.0;
        spam.repeat_pressure = spam.base_pressure;
        spam.pressure_decay = 2.5;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LimitsV12 {
    spam: LegacyLimits,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyLimits {
    maximagespam: Option<i64>,
    maxpingspam: Option<i64>,
}

/// Pressure for `limit` allowed occurrences, 0 when unlimited
fn pressure_for(headroom: f64, limit: i64) -> f64 {
    if limit > 0 {
        #[allow(clippy::cast_precision_loss)]
        let parts = (limit + 1) as f64;
        headroom / parts
    } else {
        0.0
    }
}

/// Derive image and ping pressure from the old per-message limits
#[derive(Debug, Clone, Copy, Default)]
pub struct SpamLegacyLimits;

#[async_trait]
impl MigrationStep for SpamLegacyLimits {
    fn name(&self) -> &'static str {
        "spam-legacy-limits"
    }

    fn gate(&self) -> VersionGate {
        VersionGate::below(13)
    }

    async fn apply(&self, raw: &Value, config: &mut GuildConfig, _env: &MigrationEnv<'_>) -> Result<(), MigrationError> {
        let legacy: LimitsV12 = decode_legacy(self.name(), raw)?;
        let spam = &mut config.spam;
        let room = headroom(spam);
        if let Some(images) = legacy.spam.maximagespam {
            spam.image_pressure = pressure_for(room, images);
        }
        if let Some(pings) = legacy.spam.maxpingspam {
            spam.ping_pressure = pressure_for(room, pings);
        }
        Ok(())
    }
}

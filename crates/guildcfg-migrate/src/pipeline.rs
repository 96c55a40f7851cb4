//! Version-gated migration pipeline
//!
//! A stored blob carries the schema version it was written with. Every step
//! declares the versions it applies to; the pipeline runs the admitted steps
//! in order and stamps the result with [`CURRENT_VERSION`].
//!
//! # Gating
//!
//! Gates are checked against the version *stored in the blob*, never against a
//! version bumped mid-pipeline, so each step runs at most once per load.
//!
//! # Failure policy
//!
//! A blob that does not decode at all is fatal. A step whose legacy layout
//! does not decode, or whose side effect fails, is logged, recorded as a
//! [`SkippedStep`] and its changes are discarded; the remaining steps still run.

use crate::env::MigrationEnv;
use crate::error::MigrationError;
use crate::steps;
use async_trait::async_trait;
use guildcfg_core::{GuildConfig, CURRENT_VERSION};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Range of stored versions a step applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionGate {
    /// Lowest admitted version (inclusive)
    pub from: i64,
    /// First version no longer admitted
    pub below: i64,
}

impl VersionGate {
    /// Every version lower than `below`
    #[inline]
    #[must_use]
    pub const fn below(below: i64) -> Self {
        Self {
            from: i64::MIN,
            below,
        }
    }

    /// Exactly one version
    #[inline]
    #[must_use]
    pub const fn exactly(version: i64) -> Self {
        Self {
            from: version,
            below: version + 1,
        }
    }

    /// Check if a stored version is admitted
    #[inline]
    #[must_use]
    pub fn admits(&self, version: i64) -> bool {
        self.from <= version && version < self.below
    }
}

/// One historical schema transformation
#[async_trait]
pub trait MigrationStep: Send + Sync {
    /// Stable step name, used in logs and reports
    fn name(&self) -> &'static str;

    /// Stored versions this step applies to
    fn gate(&self) -> VersionGate;

    /// Whether the step acts outside the config
    fn side_effects(&self) -> bool {
        false
    }

    /// Transform `config`, reading legacy structures from `raw`
    async fn apply(
        &self,
        raw: &Value,
        config: &mut GuildConfig,
        env: &MigrationEnv<'_>,
    ) -> Result<(), MigrationError>;
}

/// Step that did not apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStep {
    pub step: &'static str,
    pub reason: String,
}

/// What a migration did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: i64,
    pub to_version: i64,
    pub applied: Vec<&'static str>,
    pub skipped: Vec<SkippedStep>,
}

impl MigrationReport {
    /// Check if any step was skipped
    #[inline]
    #[must_use]
    pub fn has_skips(&self) -> bool {
        !self.skipped.is_empty()
    }

    /// One line per applied or skipped step
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("version {} -> {}", self.from_version, self.to_version)];
        lines.extend(self.applied.iter().map(|step| format!("applied {step}")));
        lines.extend(
            self.skipped
                .iter()
                .map(|s| format!("skipped {}: {}", s.step, s.reason)),
        );
        lines
    }
}

/// Migration result
#[derive(Debug, Clone)]
pub struct Migrated {
    pub config: GuildConfig,
    pub report: MigrationReport,
    /// The stored blob is outdated and should be saved
    pub needs_save: bool,
}

/// Ordered list of steps
pub struct MigrationPipeline {
    steps: Vec<Box<dyn MigrationStep>>,
}

impl MigrationPipeline {
    /// Create a pipeline from explicit steps
    #[must_use]
    pub fn new(steps: Vec<Box<dyn MigrationStep>>) -> Self {
        Self { steps }
    }

    /// Every historical step up to [`CURRENT_VERSION`]
    #[must_use]
    pub fn standard() -> Self {
        Self::new(steps::standard())
    }

    /// Steps in run order
    pub fn steps(&self) -> impl Iterator<Item = &dyn MigrationStep> {
        self.steps.iter().map(AsRef::as_ref)
    }

    /// Upgrade a stored blob to the current schema
    ///
    /// # Errors
    /// Returns [`MigrationError::Decode`] when `raw` is not a configuration.
    /// Step failures never surface here; they are listed in the report.
    pub async fn migrate(&self, raw: &str, env: &MigrationEnv<'_>) -> Result<Migrated, MigrationError> {
        let value: Value = serde_json::from_str(raw).map_err(MigrationError::Decode)?;
        let mut config = GuildConfig::deserialize(&value).map_err(MigrationError::Decode)?;
        let stored = config.version;

        let mut report = MigrationReport {
            from_version: stored,
            to_version: stored,
            ..MigrationReport::default()
        };

        for step in &self.steps {
            if !step.gate().admits(stored) {
                continue;
            }
            let mut draft = config.clone();
            match step.apply(&value, &mut draft, env).await {
                Ok(()) => {
                    info!(tenant = %env.tenant, step = step.name(), from = stored, "Applied migration step");
                    config = draft;
                    report.applied.push(step.name());
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(tenant = %env.tenant, step = step.name(), error = %err, "Skipped migration step");
                    report.skipped.push(SkippedStep {
                        step: step.name(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let needs_save = if stored < CURRENT_VERSION {
            config.version = CURRENT_VERSION;
            true
        } else {
            if stored > CURRENT_VERSION {
                warn!(tenant = %env.tenant, stored, current = CURRENT_VERSION, "Configuration is newer than this build");
            }
            false
        };
        report.to_version = config.version;
        debug!(tenant = %env.tenant, applied = report.applied.len(), skipped = report.skipped.len(), "Migration finished");

        Ok(Migrated {
            config,
            report,
            needs_save,
        })
    }
}

impl Default for MigrationPipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for MigrationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}

//! Live per-tenant configuration
//!
//! [`ConfigStore`] owns a [`GuildConfig`] and serves Get and Set requests
//! addressed by user-typed paths. `try_*` methods return typed errors; the
//! boundary forms ([`ConfigStore::get_lines`], [`ConfigStore::set`]) turn
//! every error into a user-facing message.

use crate::codec::CodecContext;
use crate::config::GuildConfig;
use crate::descriptor::{registry, CategorySummary, OptionDescriptor};
use crate::error::ConfigError;
use crate::help::HelpTable;
use crate::kind::{Primitive, ValueKind};
use crate::path::ConfigPath;
use std::sync::Arc;
use tracing::debug;

/// Preview of one option inside a category listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionPreview {
    pub name: &'static str,
    pub help: String,
    pub preview: String,
}

/// Result of a Get request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetResponse {
    /// No path: every category with its options
    Summary(Vec<CategorySummary>),
    /// Category only: help and a value preview per option
    Category {
        name: &'static str,
        options: Vec<OptionPreview>,
    },
    /// Single option (or one key of it)
    Option { path: String, lines: Vec<String> },
}

impl GetResponse {
    /// Plain-text rendering
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        match self {
            Self::Summary(categories) => categories.iter().map(CategorySummary::render).collect(),
            Self::Category { name, options } => {
                let mut out = vec![format!("--- {name} ---")];
                for option in options {
                    out.push(format!("{}: {}", option.name, option.preview));
                }
                out
            }
            Self::Option { path, lines } => match lines.as_slice() {
                [] => vec![format!("{path}: [empty]")],
                [single] => vec![format!("{path}: {single}")],
                many => {
                    let mut out = vec![format!("--- {path} ---")];
                    out.extend(many.iter().cloned());
                    out
                }
            },
        }
    }
}

/// Result of a Set request at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetOutcome {
    pub message: String,
    pub success: bool,
}

fn preview(lines: &[String]) -> String {
    match lines {
        [] => "[empty]".to_string(),
        [single] => single.clone(),
        many => format!("[{} items]", many.len()),
    }
}

/// One tenant's configuration plus the help table used to describe it
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: GuildConfig,
    help: Arc<HelpTable>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::fresh()
    }
}

impl ConfigStore {
    /// Wrap an already migrated configuration
    #[must_use]
    pub fn new(config: GuildConfig) -> Self {
        Self {
            config,
            help: HelpTable::builtin(),
        }
    }

    /// Store with new-tenant defaults
    #[must_use]
    pub fn fresh() -> Self {
        Self::new(GuildConfig::fresh())
    }

    /// Use a different help table
    #[must_use]
    pub fn with_help(mut self, help: Arc<HelpTable>) -> Self {
        self.help = help;
        self
    }

    /// Current configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GuildConfig {
        &self.config
    }

    /// Take the configuration out
    #[inline]
    #[must_use]
    pub fn into_config(self) -> GuildConfig {
        self.config
    }

    /// Schema version of the stored configuration
    #[inline]
    #[must_use]
    pub fn version(&self) -> i64 {
        self.config.version
    }

    /// Decode a current-schema blob (no migration)
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    /// Encode for persistence
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(&self.config)?)
    }

    /// Options and shape tags per category
    #[must_use]
    pub fn summary(&self) -> Vec<CategorySummary> {
        registry().summary()
    }

    /// Get a category listing or an option's display lines
    ///
    /// A key in the path takes precedence over `key`.
    pub fn get(
        &self,
        path: &str,
        key: Option<&str>,
        ctx: &CodecContext<'_>,
    ) -> Result<GetResponse, ConfigError> {
        if path.trim().is_empty() {
            return Ok(GetResponse::Summary(self.summary()));
        }
        let path = registry().resolve(path)?;
        let Some(option_name) = path.option else {
            return Ok(self.category_listing(path.category, ctx));
        };
        let option = lookup(&path, option_name)?;
        let key = path.key.as_deref().or(key).filter(|k| !k.is_empty());
        let lines = match key {
            Some(key) => {
                if !option.kind().is_keyed() {
                    return Err(ConfigError::TypeMismatch {
                        path: path.qualified(),
                        reason: "is not a map.",
                    });
                }
                option.slot().render_key(&self.config, key, ctx)?
            }
            None => option.slot().render(&self.config, ctx),
        };
        Ok(GetResponse::Option {
            path: path.qualified(),
            lines,
        })
    }

    fn category_listing(&self, name: &'static str, ctx: &CodecContext<'_>) -> GetResponse {
        let options = registry()
            .category(name)
            .map(|c| c.options())
            .unwrap_or_default()
            .iter()
            .map(|option| OptionPreview {
                name: option.name(),
                help: self.help.text(name, option.name()).to_string(),
                preview: preview(&option.slot().render(&self.config, ctx)),
            })
            .collect();
        GetResponse::Category { name, options }
    }

    /// Boundary form of [`ConfigStore::get`]
    #[must_use]
    pub fn get_lines(
        &self,
        path: Option<&str>,
        key: Option<&str>,
        ctx: &CodecContext<'_>,
    ) -> Vec<String> {
        match self.get(path.unwrap_or_default(), key, ctx) {
            Ok(response) => response.to_lines(),
            Err(err) => vec![err.to_string()],
        }
    }

    /// Set an option from `value` and any extra arguments
    ///
    /// Returns the formatted new value. The option is untouched on error.
    pub fn try_set(
        &mut self,
        path: &str,
        value: &str,
        extra: &[&str],
        ctx: &CodecContext<'_>,
    ) -> Result<String, ConfigError> {
        let path = registry().resolve(path)?;
        let Some(option_name) = path.option else {
            return Err(ConfigError::CategoryNotSettable(path.category.to_string()));
        };
        let option = lookup(&path, option_name)?;
        let kind = option.kind();
        let qualified = path.qualified();

        let mut values = Vec::with_capacity(extra.len() + 1);
        values.push(value);
        values.extend_from_slice(extra);

        let result = match (&path.key, kind.is_keyed()) {
            (Some(key), true) => option.slot().set_key(&mut self.config, key, &values, ctx),
            (Some(_), false) => Err(ConfigError::TypeMismatch {
                path: qualified.clone(),
                reason: "does not take a key.",
            }),
            (None, _) => option.slot().set(&mut self.config, &values, ctx),
        };

        let result = match result {
            Err(ConfigError::Parse { .. }) if kind == ValueKind::Scalar(Primitive::Boolean) => {
                Err(ConfigError::InvalidBoolean { option: qualified.clone() })
            }
            other => other,
        };

        if let Ok(shown) = &result {
            debug!(path = %qualified, value = %shown, "Config option set");
        }
        result
    }

    /// Boundary form of [`ConfigStore::try_set`]
    pub fn set(
        &mut self,
        path: &str,
        value: &str,
        extra: &[&str],
        ctx: &CodecContext<'_>,
    ) -> SetOutcome {
        match self.try_set(path, value, extra, ctx) {
            Ok(message) => SetOutcome {
                message,
                success: true,
            },
            Err(err) => SetOutcome {
                message: err.to_string(),
                success: false,
            },
        }
    }
}

fn lookup(path: &ConfigPath, option: &str) -> Result<&'static OptionDescriptor, ConfigError> {
    registry()
        .option(path.category, option)
        .ok_or_else(|| ConfigError::PathNotFound(path.qualified()))
}

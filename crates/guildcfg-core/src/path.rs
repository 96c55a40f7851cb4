//! Dotted option paths
//!
//! Users type `Category.Option[.Key]`, frequently leaving out the category.
//! [`ConfigDescriptor::resolve`] qualifies such input against the registry
//! and reports every candidate when a bare option name is ambiguous.

use crate::descriptor::{ConfigDescriptor, OptionDescriptor};
use crate::error::ConfigError;
use std::fmt::{self, Display, Formatter};

/// Fully qualified path with registry-cased names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath {
    pub category: &'static str,
    pub option: Option<&'static str>,
    pub key: Option<String>,
}

impl ConfigPath {
    /// Path naming a whole category
    #[inline]
    #[must_use]
    pub fn category(category: &'static str) -> Self {
        Self {
            category,
            option: None,
            key: None,
        }
    }

    /// Path naming a single option
    #[inline]
    #[must_use]
    pub fn option(category: &'static str, option: &'static str) -> Self {
        Self {
            category,
            option: Some(option),
            key: None,
        }
    }

    /// Attach a map key
    #[inline]
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.key = (!key.is_empty()).then_some(key);
        self
    }

    /// `Category.Option` without the key
    #[must_use]
    pub fn qualified(&self) -> String {
        match self.option {
            Some(option) => format!("{}.{}", self.category, option),
            None => self.category.to_string(),
        }
    }
}

impl Display for ConfigPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())?;
        if let Some(key) = &self.key {
            write!(f, ".{key}")?;
        }
        Ok(())
    }
}

impl ConfigDescriptor {
    /// Qualify a user-typed path
    ///
    /// The first segment is tried as a category; otherwise it is a bare
    /// option name searched across every category. Anything after the option
    /// segment is the key, case preserved.
    pub fn resolve(&self, raw: &str) -> Result<ConfigPath, ConfigError> {
        let raw = raw.trim();
        let not_found = || ConfigError::PathNotFound(raw.to_string());
        if raw.is_empty() {
            return Err(not_found());
        }

        let mut segments = raw.splitn(3, '.');
        let head = segments.next().unwrap_or_default();

        if let Some(category) = self.category(head) {
            let Some(option) = segments.next() else {
                return Ok(ConfigPath::category(category.name()));
            };
            let option = category.option(option).ok_or_else(not_found)?;
            let path = ConfigPath::option(category.name(), option.name());
            return Ok(match segments.next() {
                Some(key) => path.with_key(key),
                None => path,
            });
        }

        let matches: Vec<(&'static str, &OptionDescriptor)> = self
            .categories()
            .iter()
            .filter_map(|c| c.option(head).map(|o| (c.name(), o)))
            .collect();

        match matches.as_slice() {
            [] => Err(not_found()),
            [(category, option)] => {
                let path = ConfigPath::option(category, option.name());
                Ok(match raw.split_once('.') {
                    Some((_, key)) => path.with_key(key),
                    None => path,
                })
            }
            many => Err(ConfigError::PathAmbiguous {
                candidates: many
                    .iter()
                    .map(|(category, option)| format!("{category}.{}", option.name()))
                    .collect(),
            }),
        }
    }
}

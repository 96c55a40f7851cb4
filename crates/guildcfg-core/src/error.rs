//! Error types for configuration access
//!
//! Every variant here is recoverable: the store boundary turns them into a
//! user-facing message instead of failing the caller.

use crate::kind::ReferenceKind;

/// Errors raised while resolving, reading or writing configuration options
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// No category or option matches the requested path
    #[error("Could not find configuration parameter {0}!")]
    PathNotFound(String),

    /// A bare option name matches options in several categories
    #[error("Could be any of the following:\n{}", candidates.join("\n"))]
    PathAmbiguous {
        /// Every fully qualified `Category.Option` that matched
        candidates: Vec<String>,
    },

    /// Set was issued against a category instead of an option
    #[error("Can't set a configuration category! Use \"Category.Option\" to set a specific option.")]
    CategoryNotSettable(String),

    /// The request shape doesn't fit the option's value kind
    #[error("{path} {reason}")]
    TypeMismatch {
        path: String,
        reason: &'static str,
    },

    /// Text could not be parsed into the expected primitive
    #[error("{input:?} is not a valid {expected}")]
    Parse {
        input: String,
        expected: &'static str,
    },

    /// Boolean options only accept literal true/false
    #[error("{option} must be set to either 'true' or 'false'")]
    InvalidBoolean { option: String },

    /// The directory has no role/channel/user matching the text
    #[error("could not find a {kind} matching {input:?}")]
    ReferenceUnresolved { kind: ReferenceKind, input: String },

    /// Module or command name is not registered
    #[error("{input} is not a {kind} name!")]
    UnknownName { kind: ReferenceKind, input: String },

    /// A required key or value argument was not supplied
    #[error("{0}")]
    MissingArgument(&'static str),

    /// The key argument of a map or maplist Set failed to parse
    #[error("Key error: {0}")]
    InvalidKey(Box<ConfigError>),

    /// The value argument of a map Set failed to parse
    #[error("Value error: {0}")]
    InvalidValue(Box<ConfigError>),

    /// Map or maplist key lookup found nothing
    #[error("can't find {0}")]
    KeyNotFound(String),

    /// The config tree could not be (de)serialized
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ConfigError {
    /// Check if the error stems from user input rather than the stored data
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Serialization(_))
    }

    /// Mark a parse failure as coming from the key argument
    #[must_use]
    pub fn in_key(self) -> Self {
        Self::InvalidKey(Box::new(self))
    }

    /// Mark a parse failure as coming from the value argument
    #[must_use]
    pub fn in_value(self) -> Self {
        Self::InvalidValue(Box::new(self))
    }

    /// Create a parse error for the given input
    pub fn parse(input: impl Into<String>, expected: &'static str) -> Self {
        Self::Parse {
            input: input.into(),
            expected,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

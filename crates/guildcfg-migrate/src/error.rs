//! Error types for migration and loading
//!
//! - [`SideEffectError`]: a collaborator (role admin, secondary store) refused or failed
//! - [`MigrationError`]: one step, or the whole pipeline, failed
//! - [`PersistenceError`] / [`LoadError`]: blob storage and tenant loading

/// Failure reported by a side-effect collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SideEffectError {
    /// Collaborator is not available (offline tooling)
    #[error("side effects are unavailable")]
    Unavailable,

    /// Role creation or membership change failed
    #[error("role operation failed: {0}")]
    Role(String),

    /// Secondary store read or write failed
    #[error("secondary store failed: {0}")]
    Store(String),
}

/// Errors raised while migrating a blob
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Blob is not a decodable configuration; nothing was migrated
    #[error("cannot decode configuration: {0}")]
    Decode(#[source] serde_json::Error),

    /// Legacy side structure read by a step did not decode
    #[error("step {step}: cannot decode legacy layout: {source}")]
    LegacyDecode {
        step: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// External side effect of a step failed
    #[error("step {step}: {source}")]
    SideEffect {
        step: &'static str,
        #[source]
        source: SideEffectError,
    },
}

impl MigrationError {
    /// Whether the pipeline must stop
    ///
    /// Only [`MigrationError::Decode`] is fatal; step failures are recorded and skipped.
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    pub(crate) fn legacy(step: &'static str, source: serde_json::Error) -> Self {
        Self::LegacyDecode { step, source }
    }

    pub(crate) fn side_effect(step: &'static str, source: SideEffectError) -> Self {
        Self::SideEffect { step, source }
    }
}

/// Blob storage failure
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Storage backend failed
    #[error("storage backend failed: {0}")]
    Backend(String),

    /// Configuration could not be encoded
    #[error("cannot encode configuration: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors raised while loading a tenant
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Blob could not be read
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Blob could not be migrated
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    #[test]
    fn only_decode_is_fatal() {
        assert!(MigrationError::Decode(json_error()).is_fatal());
        assert!(!MigrationError::legacy("collections", json_error()).is_fatal());
        assert!(!MigrationError::side_effect("silence-role", SideEffectError::Unavailable).is_fatal());
    }

    #[test]
    fn messages_name_the_step() {
        let err = MigrationError::side_effect("groups-to-roles", SideEffectError::Role("denied".into()));
        assert_eq!(err.to_string(), "step groups-to-roles: role operation failed: denied");
    }
}

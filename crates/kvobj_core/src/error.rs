//! Error types for KvObj core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the object-store bridge.
///
/// Per-request outcomes (missing keys, type mismatches) are not errors; they
/// are reported through [`crate::ObjectStatus`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The context has no attached session: the server was started with
    /// the object store disabled. Retrying cannot help.
    #[error("object store is disabled")]
    ObjectStoreDisabled,

    /// Session configuration was rejected.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

impl CoreError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true for misconfiguration that no per-request retry can fix.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::ObjectStoreDisabled | Self::InvalidConfig { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_store_is_fatal() {
        let err = CoreError::ObjectStoreDisabled;
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "object store is disabled");
    }

    #[test]
    fn invalid_config_message() {
        let err = CoreError::invalid_config("footer capacity must be non-zero");
        assert_eq!(
            err.to_string(),
            "invalid configuration: footer capacity must be non-zero"
        );
    }
}

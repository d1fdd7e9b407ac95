// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Oasis inbox service.

use thiserror::Error;

/// The primary error type used across all Oasis adapter traits and core operations.
#[derive(Debug, Error)]
pub enum OasisError {
    /// Configuration errors (invalid TOML, missing secrets, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging platform errors (malformed payload, send API failure).
    #[error("platform error: {message}")]
    Platform {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Caller-supplied input was rejected.
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OasisError {
    /// Shorthand for a platform error without an underlying source.
    pub fn platform(message: impl Into<String>) -> Self {
        OasisError::Platform {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        OasisError::Storage {
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = OasisError::NotFound {
            entity: "conversation",
            id: "c-9".into(),
        };
        assert_eq!(err.to_string(), "conversation not found: c-9");
    }

    #[test]
    fn platform_shorthand_has_no_source() {
        match OasisError::platform("boom") {
            OasisError::Platform { message, source } => {
                assert_eq!(message, "boom");
                assert!(source.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}

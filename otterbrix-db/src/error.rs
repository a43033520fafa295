//! Configuration errors

use thiserror::Error;

/// Errors raised while loading cleaner configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable holds a value we cannot interpret
    #[error("Invalid {key} value: {value:?} (expected {expected})")]
    Invalid {
        /// Variable name
        key: String,
        /// Raw value found
        value: String,
        /// Accepted values
        expected: String,
    },

    /// A list variable resolved to no entries
    #[error("{key} must name at least one entry")]
    Empty {
        /// Variable name
        key: String,
    },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid(
        key: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            key: key.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create an empty list error
    pub fn empty(key: impl Into<String>) -> Self {
        Self::Empty { key: key.into() }
    }
}

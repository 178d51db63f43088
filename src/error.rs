//! Typed errors for the connector library.
//!
//! Library code returns these; the binary wraps them in `eyre` reports.
//! None of them is allowed to escape an extraction cycle: the cycle
//! controller converts every failure into a reported outcome.

use thiserror::Error;

/// Invalid or incomplete connector configuration.
///
/// Fatal to a cycle, never to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required property was not supplied
    #[error("required property '{field}' is missing")]
    Missing { field: &'static str },

    /// A required property was supplied but contains only whitespace
    #[error("required property '{field}' is blank")]
    Blank { field: &'static str },

    /// A property value is outside its allowed set or range
    #[error("property '{field}' has invalid value '{value}' (expected {expected})")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A username was supplied without a matching password
    #[error("property '{field}' is required when a username is set")]
    MissingCredential { field: &'static str },
}

impl ConfigError {
    /// The property this error refers to
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::Blank { field }
            | Self::InvalidValue { field, .. }
            | Self::MissingCredential { field } => field,
        }
    }

    /// Whether this is the missing-credential subtype
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Self::MissingCredential { .. })
    }
}

/// Failures talking to the durable state store.
///
/// Always recoverable: the state manager logs them and keeps counting.
#[derive(Debug, Error)]
pub enum StateError {
    /// State could not be read
    #[error("failed to read state: {0}")]
    Read(String),

    /// State could not be written
    #[error("failed to write state: {0}")]
    Write(String),

    /// State was read but its contents are not usable
    #[error("stored state is corrupt: {0}")]
    Corrupt(String),
}

/// Failure handing a flow file to the downstream sink.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to write flow file to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize flow file attributes: {0}")]
    Attributes(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for state store operations.
pub type StateResult<T> = std::result::Result<T, StateError>;

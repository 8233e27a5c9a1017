//! Error types for the Bill-a application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a [`BillaError`].
///
/// Callers use this to decide how to present a failure: validation problems are
/// fixed locally, transport and upstream-format problems can be retried, and
/// persistence problems are warnings that never undo a completed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    Transport,
    UpstreamFormat,
    Persistence,
    Other,
}

/// A shared error type for the entire Bill-a application.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BillaError {
    /// Local input was rejected before any network call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// The scan service answered but found no line items
    #[error("No items detected. Try a clearer photo.")]
    NoItemsDetected,

    /// Network failure talking to an external service
    #[error("Connection error ({operation}): {message}")]
    Transport {
        operation: String,
        message: String,
        status_code: Option<u16>,
    },

    /// An external call exceeded its deadline
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    /// An external service answered with something we could not interpret
    #[error("Upstream response format invalid: {0}")]
    UpstreamFormat(String),

    /// Hosted store read/write failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The requested transition is not valid in the current phase
    #[error("Invalid session phase: expected {expected}, found {actual}")]
    InvalidPhase { expected: String, actual: String },

    /// A newer attempt started while this one was in flight
    #[error("{0} was superseded by a newer attempt")]
    Superseded(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The operation needs a signed-in user
    #[error("Login required: {0}")]
    Unauthenticated(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BillaError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn transport(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// Creates a Transport error carrying the HTTP status returned by the service
    pub fn http_status(
        operation: impl Into<String>,
        status_code: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::Transport {
            operation: operation.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    pub fn timeout(operation: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            secs,
        }
    }

    pub fn upstream_format(message: impl Into<String>) -> Self {
        Self::UpstreamFormat(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn invalid_phase(expected: impl ToString, actual: impl ToString) -> Self {
        Self::InvalidPhase {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Classification
    // ============================================================================

    /// Maps this error onto the four-way taxonomy used by the session flow.
    ///
    /// Timeouts and transport failures share a category so the two cannot be
    /// told apart by callers.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) | Self::InvalidPhase { .. } => ErrorCategory::Validation,
            Self::Transport { .. } | Self::Timeout { .. } => ErrorCategory::Transport,
            Self::UpstreamFormat(_) | Self::NoItemsDetected => ErrorCategory::UpstreamFormat,
            Self::Persistence(_) => ErrorCategory::Persistence,
            _ => ErrorCategory::Other,
        }
    }

    /// True when the user can simply try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Transport | ErrorCategory::UpstreamFormat
        )
    }

    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    pub fn is_transport(&self) -> bool {
        self.category() == ErrorCategory::Transport
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for BillaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for BillaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for BillaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for BillaError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, BillaError>`.
pub type Result<T> = std::result::Result<T, BillaError>;

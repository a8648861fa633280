//! Error types for the LearnStack client.

use thiserror::Error;

/// A shared error type for the entire LearnStack client.
///
/// The first three variants mirror the failure classes of the backend:
/// authentication, non-streaming fetches, and message sends. The rest cover
/// local concerns (configuration, I/O, serialization).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LearnstackError {
    /// The backend rejected the username or the token request failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A list/get/delete request failed, including not-found.
    #[error("Fetch failed: {message}")]
    Fetch {
        /// HTTP status when the backend answered at all.
        status: Option<u16>,
        message: String,
    },

    /// Sending or streaming a message failed, including an empty response body.
    #[error("Send failed: {0}")]
    Send(String),

    /// A send was attempted while another one is still in flight.
    #[error("A message is already being sent")]
    Busy,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LearnstackError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a Fetch error carrying the HTTP status, if any.
    pub fn fetch(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Fetch {
            status,
            message: message.into(),
        }
    }

    /// Creates a Send error
    pub fn send(message: impl Into<String>) -> Self {
        Self::Send(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    pub fn is_send(&self) -> bool {
        matches!(self, Self::Send(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Check if the backend reported the requested chat as missing (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Fetch { status: Some(404), .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LearnstackError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for LearnstackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for LearnstackError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, LearnstackError>`.
pub type Result<T> = std::result::Result<T, LearnstackError>;

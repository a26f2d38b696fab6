//! # Client Error Types
//!
//! Error types for remote calls, the token store and configuration.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   No response   │  │  HTTP status    │  │     Local               │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Transport      │  │  Unauthorized   │  │  InvalidConfig          │ │
//! │  │                 │  │  NotFound       │  │  InvalidId              │ │
//! │  │                 │  │                 │  │  Storage                │ │
//! │  │                 │  │  Rejected       │  │                         │ │
//! │  │                 │  │  Parse (body)   │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Remote
    // =========================================================================
    /// The request never produced a response (DNS, refused, timeout, TLS).
    #[error("Network error: {0}")]
    Transport(String),

    /// 401: the token is missing, expired or revoked.
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("token rejected"))]
    Unauthorized { message: Option<String> },

    /// 404.
    #[error("Not found: {}", .message.as_deref().unwrap_or("resource missing"))]
    NotFound { message: Option<String> },

    /// Any other non-success status, 403 included.
    #[error("Request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    /// The body did not match the expected schema.
    #[error("Unexpected response from server: {0}")]
    Parse(String),

    // =========================================================================
    // Local
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An id that cannot name a single path segment.
    #[error("Invalid resource id: {0:?}")]
    InvalidId(String),

    #[error("Token storage error: {0}")]
    Storage(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidConfig(format!("invalid base URL: {}", err))
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::InvalidConfig(err.to_string())
    }
}


// =============================================================================
// Classification
// =============================================================================

impl ClientError {
    /// Maps a non-success status and its optional `{ "message" }` body.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message.filter(|m| !m.trim().is_empty());
        match status {
            401 => ClientError::Unauthorized { message },
            404 => ClientError::NotFound { message },
            _ => ClientError::Rejected { status, message },
        }
    }

    /// The message the server put in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized { message }
            | ClientError::NotFound { message }
            | ClientError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::NotFound { .. } => Some(404),
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// True for failures worth retrying by hand (no response, or a 5xx).
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

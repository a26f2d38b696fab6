//! # Console Error Types
//!
//! What a command hands back when an operation is rejected.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Bakery Console                     │
//! │                                                                         │
//! │  Command work                        dispatch                           │
//! │  ────────────                        ────────                           │
//! │                                                                         │
//! │  ValidationError ──┐                                                    │
//! │  CoreError ────────┼──► ConsoleError ──► user_message(op) ──┐           │
//! │  ClientError ──────┘                                         │          │
//! │                                                              ▼          │
//! │                                   OperationTable.reject(ticket, msg)    │
//! │                                                              │          │
//! │                                                              ▼          │
//! │                                   ApiError { code, message } to caller  │
//! │                                                                         │
//! │  The message stored in the store and the message returned to the       │
//! │  caller are always the same string.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Message Rules
//! - Server-provided message: shown verbatim
//! - 404 on delete: "Product not found"
//! - Body that did not match the schema: "Unexpected response from server"
//! - Anything else: the operation's fallback message

use bakery_client::ClientError;
use bakery_core::{CoreError, Operation, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Message shown when a response body does not match its schema.
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected response from server";

/// Message shown when a delete targets a product the backend does not know.
pub const PRODUCT_NOT_FOUND_MESSAGE: &str = "Product not found";

// =============================================================================
// Console Error
// =============================================================================

pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Failure of the unit of work behind one operation.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The backend or the token store failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A local rule rejected the request before it was sent.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Token validation was requested with nothing to validate.
    #[error("No token found")]
    NoToken,
}

impl From<ValidationError> for ConsoleError {
    fn from(err: ValidationError) -> Self {
        ConsoleError::Core(CoreError::Validation(err))
    }
}

impl ConsoleError {
    /// The human-readable message recorded for `op`.
    pub fn user_message(&self, op: Operation) -> String {
        match self {
            ConsoleError::Client(err) => {
                if op == Operation::DeleteProduct && err.is_not_found() {
                    return PRODUCT_NOT_FOUND_MESSAGE.to_string();
                }
                if let Some(message) = err.server_message() {
                    return message.to_string();
                }
                if matches!(err, ClientError::Parse(_)) {
                    return UNEXPECTED_RESPONSE_MESSAGE.to_string();
                }
                op.fallback_message().to_string()
            }
            ConsoleError::Core(err) => err.to_string(),
            ConsoleError::NoToken => self.to_string(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ConsoleError::Client(err) => ErrorCode::from(err),
            ConsoleError::Core(CoreError::ProductNotFound(_)) => ErrorCode::NotFound,
            ConsoleError::Core(CoreError::InsufficientStock { .. }) => {
                ErrorCode::InsufficientStock
            }
            ConsoleError::Core(CoreError::Validation(_)) => ErrorCode::ValidationError,
            ConsoleError::NoToken => ErrorCode::Unauthorized,
        }
    }
}

// =============================================================================
// API Error
// =============================================================================

/// Error returned from console commands.
///
/// ## Serialization
/// This is what the CLI prints when a command fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message, identical to the one stored for the operation
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404 or missing from the local cache)
    NotFound,

    /// Form input rejected before sending
    ValidationError,

    /// Token missing, expired or refused (401)
    Unauthorized,

    /// Backend answered with another 4xx/5xx, 403 included
    ServerRejected,

    /// No response from the backend
    NetworkError,

    /// Response body did not match its schema
    UnexpectedResponse,

    /// Stock removal larger than the cached stock
    InsufficientStock,

    /// Persisted token could not be read or written
    StorageError,

    /// Configuration is unusable
    ConfigError,

    /// The unit of work panicked
    Internal,
}

impl From<&ClientError> for ErrorCode {
    fn from(err: &ClientError) -> Self {
        match err {
            ClientError::Transport(_) => ErrorCode::NetworkError,
            ClientError::Unauthorized { .. } => ErrorCode::Unauthorized,
            ClientError::NotFound { .. } => ErrorCode::NotFound,
            ClientError::Rejected { .. } => ErrorCode::ServerRejected,
            ClientError::Parse(_) => ErrorCode::UnexpectedResponse,
            ClientError::InvalidId(_) => ErrorCode::ValidationError,
            ClientError::InvalidConfig(_) => ErrorCode::ConfigError,
            ClientError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Builds the error for a failed operation with an already-mapped message.
    pub fn from_failure(err: &ConsoleError, message: impl Into<String>) -> Self {
        ApiError::new(err.code(), message)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code == ErrorCode::Unauthorized
    }
}

/// Failures outside of a tracked operation (token file, configuration).
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let code = ErrorCode::from(&err);
        if code == ErrorCode::StorageError {
            tracing::error!("Token storage failed: {}", err);
        }
        ApiError::new(code, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

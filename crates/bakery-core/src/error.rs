//! # Error Types
//!
//! Domain-specific error types for bakery-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bakery-core errors (this file)                                        │
//! │  ├── CoreError        - Domain rule violations                         │
//! │  └── ValidationError  - Form input failures (pre-flight checks)        │
//! │                                                                         │
//! │  bakery-client errors (separate crate)                                 │
//! │  └── ClientError      - Transport / HTTP status / parse failures       │
//! │                                                                         │
//! │  console errors (in app)                                               │
//! │  └── ApiError         - What the view layer renders (code + message)   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │        ClientError ─────────────────┴──► operation error message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised before a request ever leaves the console.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The product is not in the local product cache.
    ///
    /// ## When This Occurs
    /// - Stock adjustment for a product that was deleted since the last fetch
    /// - Bill preview referencing a product id the list never contained
    #[error("Product not found")]
    ProductNotFound(String),

    /// Stock removal would push stock below zero.
    #[error("Cannot remove {requested} units of {name}: only {available} in stock")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Messages are rendered verbatim next to the form that produced them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Invalid format (e.g., malformed email, inverted date range).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

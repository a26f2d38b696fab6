//! # Validation Module
//!
//! Pre-flight checks run before a form is submitted to the API.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Console (THIS MODULE)                                        │
//! │  ├── Empty fields, obvious format errors                               │
//! │  └── Rejects the operation without a network round trip                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Bakery API (authoritative)                                   │
//! │  ├── Pricing, stock truth, uniqueness                                  │
//! │  └── Its 4xx message is shown verbatim                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bakery_core::validation::{validate_email, validate_income};
//! use bakery_core::Money;
//!
//! assert!(validate_email("baker@example.com").is_ok());
//! assert!(validate_income(Money::from_paise(-1)).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{BillRequest, DateRange, ProductDraft, StockAdjustment};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product name the forms accept.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Shortest password accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Maximum lines on a single bill.
pub const MAX_BILL_LINES: usize = 100;

/// Longest free-text reason on a stock adjustment.
pub const MAX_REASON_LEN: usize = 200;

/// Largest quantity on one bill line.
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Largest stock level a product can be given or adjusted to.
pub const MAX_STOCK_QUANTITY: i64 = 1_000_000;

// =============================================================================
// Authentication
// =============================================================================

/// Validates an email address (shape only, the backend owns the rest).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::required("email"));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain".to_string(),
        }),
    }
}

/// Validates a login password (presence only).
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::required("password"));
    }
    Ok(())
}

/// Validates a signup password.
pub fn validate_new_password(password: &str) -> ValidationResult<()> {
    validate_password(password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Products
// =============================================================================

/// Validates the product form.
///
/// ## Rules
/// - name: required, at most 200 characters
/// - category: required
/// - cost price and stock: not negative
/// - stock: at most [`MAX_STOCK_QUANTITY`]
pub fn validate_product_draft(draft: &ProductDraft) -> ValidationResult<()> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }
    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }
    if draft.category.trim().is_empty() {
        return Err(ValidationError::required("category"));
    }
    if draft.cost_price.is_negative() {
        return Err(ValidationError::Negative {
            field: "costPrice".to_string(),
        });
    }
    if draft.current_stock < 0 {
        return Err(ValidationError::Negative {
            field: "currentStock".to_string(),
        });
    }
    if draft.current_stock > MAX_STOCK_QUANTITY {
        return Err(stock_out_of_range());
    }
    Ok(())
}

/// Validates the stock dialog. Stock sufficiency is checked by
/// [`Product::adjusted_draft`] against the cached product.
pub fn validate_stock_adjustment(adjustment: &StockAdjustment) -> ValidationResult<()> {
    if adjustment.quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if adjustment.quantity > MAX_STOCK_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_STOCK_QUANTITY,
        });
    }
    if let Some(reason) = &adjustment.reason {
        if reason.chars().count() > MAX_REASON_LEN {
            return Err(ValidationError::TooLong {
                field: "reason".to_string(),
                max: MAX_REASON_LEN,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Bills & Income
// =============================================================================

/// Validates the bill generator form.
pub fn validate_bill_request(request: &BillRequest) -> ValidationResult<()> {
    if request.items.is_empty() {
        return Err(ValidationError::required("items"));
    }
    if request.items.len() > MAX_BILL_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_BILL_LINES as i64,
        });
    }
    for line in &request.items {
        if line.product_id.trim().is_empty() {
            return Err(ValidationError::required("productId"));
        }
        if line.quantity < 1 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_LINE_QUANTITY,
            });
        }
    }
    Ok(())
}

/// The error for a stock level above [`MAX_STOCK_QUANTITY`].
pub fn stock_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "currentStock".to_string(),
        min: 0,
        max: MAX_STOCK_QUANTITY,
    }
}

/// Validates the dashboard date range.
pub fn validate_date_range(range: &DateRange) -> ValidationResult<()> {
    if range.start > range.end {
        return Err(ValidationError::InvalidFormat {
            field: "dateRange".to_string(),
            reason: "start date is after end date".to_string(),
        });
    }
    Ok(())
}

/// Validates a manual income correction.
pub fn validate_income(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: "income".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

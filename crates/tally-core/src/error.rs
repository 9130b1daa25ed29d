//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Settlement input errors                        │
//! │  └── ValidationError  - Field-level validation failures                │
//! │                                                                         │
//! │  tally-store errors (separate crate)                                   │
//! │  └── StoreError       - Ledger/customer mutation failures              │
//! │                                                                         │
//! │  tally-print errors (separate crate)                                   │
//! │  └── PrinterError     - Connectivity and transmission failures         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SettleError → Frontend            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Recovery Policy
//! Every `CoreError` is recovered locally: re-prompt the user, mutate
//! nothing.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Settlement input errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested settlement is larger than what is owed.
    ///
    /// ## User Workflow
    /// ```text
    /// Customer owes 80.00
    ///      │
    ///      ▼
    /// Cashier types 100.00
    ///      │
    ///      ▼
    /// AmountExceedsCredit { requested: 100.00, available: 80.00 }
    ///      │
    ///      ▼
    /// UI shows: "Only 80.00 is outstanding"
    /// ```
    #[error("Settlement of {requested} exceeds outstanding credit of {available}")]
    AmountExceedsCredit { requested: Money, available: Money },

    /// Nothing can be allocated: zero/negative amount or empty ledger.
    #[error("Nothing to allocate: {reason}")]
    NothingToAllocate { reason: String },

    /// Split payment rows do not add up to the settlement amount.
    #[error("Payment rows total {tendered}, expected {target}")]
    SplitMismatch { tendered: Money, target: Money },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub(crate) fn nothing_to_allocate(reason: impl Into<String>) -> Self {
        CoreError::NothingToAllocate {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single field on a customer or order record failed its check.
///
/// `field` is the human name shown next to the input, e.g. `"phone"`.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Phone numbers with letters, too few digits and the like.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::AmountExceedsCredit {
            requested: Money::from_cents(10000),
            available: Money::from_cents(8000),
        };
        assert_eq!(
            err.to_string(),
            "Settlement of 100.00 exceeds outstanding credit of 80.00"
        );

        let err = CoreError::SplitMismatch {
            tendered: Money::from_cents(3950),
            target: Money::from_cents(4000),
        };
        assert_eq!(err.to_string(), "Payment rows total 39.50, expected 40.00");
    }

    #[test]
    fn test_phone_failure_reads_as_one_line() {
        let err: CoreError = ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must have between 7 and 15 digits".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Validation error: phone has invalid format: must have between 7 and 15 digits"
        );
    }
}

//! # Settlement Error Type
//!
//! Unified error for the settlement flows.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  prepare / confirm                                                      │
//! │         │                                                               │
//! │         ├── CoreError  (amount, split mismatch) ──┐                    │
//! │         │                                          ├──► SettleError     │
//! │         └── StoreError (not found, stale, ...) ───┘                    │
//! │                                                                         │
//! │  Printing after a commit is reported in the outcome instead.           │
//! │  PrinterError only appears here for print-only flows.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

use tally_core::CoreError;
use tally_print::PrinterError;
use tally_store::StoreError;

/// Result type alias for settlement flows.
pub type SettleResult<T> = Result<T, SettleError>;

#[derive(Debug, Error)]
pub enum SettleError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Statement, ticket and summary printing.
    #[error(transparent)]
    Printer(#[from] PrinterError),
}

/// Machine-readable code for the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown customer or order.
    NotFound,
    /// Bad input; the cashier can fix it and retry.
    ValidationError,
    /// The ledger changed underneath the plan; prepare again.
    Conflict,
    /// A business rule refused the request.
    BusinessLogic,
    /// Printer problem; see the printer remedy.
    PrinterError,
    Internal,
}

impl SettleError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SettleError::Core(CoreError::Validation(_))
            | SettleError::Core(CoreError::SplitMismatch { .. })
            | SettleError::Store(StoreError::Validation(_)) => ErrorCode::ValidationError,
            SettleError::Core(_) => ErrorCode::BusinessLogic,
            SettleError::Store(StoreError::NotFound { .. }) => ErrorCode::NotFound,
            SettleError::Store(StoreError::AlreadySettled { .. })
            | SettleError::Store(StoreError::OverAllocation { .. }) => ErrorCode::Conflict,
            SettleError::Store(StoreError::InvalidState(_)) => ErrorCode::BusinessLogic,
            SettleError::Store(StoreError::Snapshot(_)) => ErrorCode::Internal,
            SettleError::Printer(_) => ErrorCode::PrinterError,
        }
    }

    /// True when the plan is stale and should be prepared again.
    pub fn is_conflict(&self) -> bool {
        self.code() == ErrorCode::Conflict
    }
}

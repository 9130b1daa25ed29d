//! # Store Error Types
//!
//! Error types for ledger and customer mutations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Ledger check fails inside the commit critical section                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← nothing has been mutated yet               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SettleError (tally-settle) ← settlement reported as NOT committed     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Frontend shows the message, the cashier retries                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tally_core::{Money, ValidationError};
use thiserror::Error;

/// Store operation errors.
///
/// Every variant is raised before any state is touched, so a failed
/// call leaves the store exactly as it was.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The order's credit has already been fully collected.
    ///
    /// ## When This Occurs
    /// - A stale allocation is committed twice
    /// - Two devices settle the same order
    #[error("Order {order_id} is already settled")]
    AlreadySettled { order_id: String },

    /// An allocation line asks for more than the order (or customer) owes.
    #[error("Cannot apply {applied} to {target}: only {due} is due")]
    OverAllocation {
        target: String,
        applied: Money,
        due: Money,
    },

    /// The request conflicts with the entity's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Entity failed field validation on insert.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Snapshot could not be produced or loaded.
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        StoreError::InvalidState(message.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Snapshot(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

//! # tally-store: Credit Ledger Store for Tally POS
//!
//! This crate owns customers, orders and the credit ledger, and is the
//! only place their balances change.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Data Flow                              │
//! │                                                                         │
//! │  tally-settle (confirm settlement)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tally-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  CreditStore  │    │  MemoryStore  │    │  Snapshot    │  │   │
//! │  │   │  (store.rs)   │◄───│  (memory.rs)  │───►│  JSON        │  │   │
//! │  │   │  contract     │    │  RwLock maps  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Key-value persistence collaborator (external)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The [`CreditStore`] contract
//! - [`memory`] - In-memory implementation with atomic commits
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_store::{CreditStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.insert_customer(customer).await?;
//! store.insert_order(order).await?;
//! store.complete_order(&order_id, credit_portion).await?;
//!
//! let ledger = store.ledger_for_customer(&customer_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryStore, StoreSnapshot};
pub use store::CreditStore;

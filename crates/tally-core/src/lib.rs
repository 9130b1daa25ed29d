//! # tally-core: Pure Credit-Settlement Logic for Tally POS
//!
//! This crate holds the money rules of Tally POS as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tally POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile frontend                              │   │
//! │  │   Customer list ──► Settle dialog ──► Split rows ──► Receipt    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tally-settle (workflow)                      │   │
//! │  └──────────┬──────────────────┬───────────────────┬───────────────┘   │
//! │             │                  │                   │                    │
//! │  ┌──────────▼──────────┐ ┌─────▼──────────┐ ┌──────▼─────────────┐     │
//! │  │ ★ tally-core ★      │ │  tally-store   │ │  tally-print       │     │
//! │  │  allocation  split  │ │  CreditStore   │ │  PrinterSession    │     │
//! │  │  money  summary     │ │  MemoryStore   │ │  ESC/POS           │     │
//! │  │                     │ └────────────────┘ └────────────────────┘     │
//! │  │  NO I/O • PURE      │                                               │
//! │  └─────────────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Order, CreditLedgerEntry, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`allocation`] - Oldest-first settlement allocation
//! - [`split`] - Permissive amount parsing and split-payment checks
//! - [`summary`] - End-of-day totals
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output
//! 2. **No I/O**: storage and printing live in sibling crates
//! 3. **Integer Money**: all monetary values are cents (i64)
//! 4. **Explicit Errors**: typed errors, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use tally_core::split::{parse_amount, validate_split};
//! use tally_core::{Money, PaymentMethod, SplitPaymentRow};
//!
//! let rows = vec![
//!     SplitPaymentRow::new(PaymentMethod::Cash, parse_amount("20")),
//!     SplitPaymentRow::new(PaymentMethod::Fonepay, parse_amount("19.50")),
//! ];
//!
//! // 39.50 tendered against 40.00: confirm stays disabled
//! assert!(!validate_split(&rows, Money::from_cents(4000)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allocation;
pub mod error;
pub mod money;
pub mod split;
pub mod summary;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use summary::DailySummary;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest amount the POS accepts anywhere: 1,000,000,000.00.
///
/// Typed amounts above it parse as zero and prices above it fail
/// validation, so sums over an order or a split can never overflow.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Maximum line items on a single order.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity on one line item.
///
/// Catches slips like typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

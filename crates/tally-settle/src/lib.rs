//! # tally-settle: Credit Settlement Flow for Tally POS
//!
//! Ties allocation (tally-core), the ledger store (tally-store) and the
//! printer session (tally-print) into the flows a cashier runs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   UI layer (external)                                                   │
//! │       │  prepare / SplitForm edits / confirm / reprint                  │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  tally-settle (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   SettlementService ──► CreditStore ──► PrinterSession          │   │
//! │  │   SplitForm             (commit)        (after commit only)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_settle::SettlementService;
//!
//! let service = SettlementService::new(store);
//! let plan = service.prepare("c1", "80").await?;
//!
//! let mut form = plan.split_form();
//! let row = form.add_row(PaymentMethod::Cash);
//! form.set_amount(row, "80");
//!
//! if form.is_confirm_enabled() {
//!     let outcome = service.confirm(&plan, form.rows(), Some(&session)).await?;
//!     if !outcome.is_printed() {
//!         // Settlement succeeded; offer a reprint.
//!     }
//! }
//! ```

pub mod error;
pub mod form;
pub mod service;

pub use error::{ErrorCode, SettleError, SettleResult};
pub use form::{FormRow, SplitForm};
pub use service::{
    print_station_tickets, ReceiptStatus, SettlementOutcome, SettlementPlan, SettlementService,
};

use tracing_subscriber::EnvFilter;

/// Installs a `tracing` subscriber for a host that has none.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used, e.g.
/// `"info,tally=debug"`. Returns false when a global subscriber already
/// exists.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

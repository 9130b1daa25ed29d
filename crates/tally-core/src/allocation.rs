//! # Allocation Engine
//!
//! Splits a settlement amount across a customer's outstanding credit orders.
//!
//! ## Algorithm: Greedy, Oldest Debt First
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Ledger (sorted by timestamp, then order_id)                            │
//! │                                                                         │
//! │    A  due 50.00  t=1      B  due 30.00  t=2      C  due 20.00  t=3      │
//! │                                                                         │
//! │  Request 65.00                                                          │
//! │    remaining 65.00 ── take min(65.00, 50.00) = 50.00 from A             │
//! │    remaining 15.00 ── take min(15.00, 30.00) = 15.00 from B             │
//! │    remaining  0.00 ── stop (C untouched)                                │
//! │                                                                         │
//! │  Result: [{A, 50.00}, {B, 15.00}]                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are integer cents, so "remaining reached zero" is an exact
//! comparison and every line is already at two decimal places.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{AllocationLine, CreditLedgerEntry, Customer, SettlementAllocation};

/// Allocates `requested` across `ledger`, oldest entry first.
///
/// ## Errors
/// - [`CoreError::NothingToAllocate`] if `requested <= 0`, or the ledger
///   holds no positive dues.
/// - [`CoreError::AmountExceedsCredit`] if `requested` is larger than the
///   sum of dues. The request is never truncated.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use tally_core::allocation::allocate;
/// use tally_core::{CreditLedgerEntry, Money};
///
/// let ledger = vec![
///     CreditLedgerEntry::new("B", Money::from_cents(3000), Utc.timestamp_opt(2, 0).unwrap()),
///     CreditLedgerEntry::new("A", Money::from_cents(5000), Utc.timestamp_opt(1, 0).unwrap()),
/// ];
///
/// let allocation = allocate(&ledger, Money::from_cents(4000)).unwrap();
/// assert_eq!(allocation.len(), 1);
/// assert_eq!(allocation.applied_to("A"), Some(Money::from_cents(4000)));
/// ```
pub fn allocate(ledger: &[CreditLedgerEntry], requested: Money) -> CoreResult<SettlementAllocation> {
    if !requested.is_positive() {
        return Err(CoreError::nothing_to_allocate("settlement amount must be positive"));
    }

    let mut entries: Vec<&CreditLedgerEntry> = ledger
        .iter()
        .filter(|entry| entry.credit_due.is_positive())
        .collect();

    if entries.is_empty() {
        return Err(CoreError::nothing_to_allocate("no outstanding credit"));
    }

    let available: Money = entries.iter().map(|entry| entry.credit_due).sum();
    if requested > available {
        return Err(CoreError::AmountExceedsCredit {
            requested,
            available,
        });
    }

    entries.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.order_id.cmp(&b.order_id))
    });

    let mut remaining = requested;
    let mut lines = Vec::new();

    for entry in entries {
        if remaining.is_zero() {
            break;
        }
        let take = remaining.min(entry.credit_due);
        lines.push(AllocationLine {
            order_id: entry.order_id.clone(),
            amount_applied: take,
        });
        remaining -= take;
    }

    Ok(SettlementAllocation { lines })
}

/// Caller-side check of a requested settlement against the customer.
///
/// Run this before loading the ledger so a too-large request is rejected
/// with the customer's own aggregate in the message.
pub fn validate_settlement_amount(customer: &Customer, requested: Money) -> CoreResult<()> {
    if !requested.is_positive() {
        return Err(CoreError::nothing_to_allocate("settlement amount must be positive"));
    }
    if !customer.has_credit() {
        return Err(CoreError::nothing_to_allocate(format!(
            "customer {} has no outstanding credit",
            customer.id
        )));
    }
    if requested > customer.credit_amount {
        return Err(CoreError::AmountExceedsCredit {
            requested,
            available: customer.credit_amount,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

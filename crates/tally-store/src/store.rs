//! # CreditStore Contract
//!
//! The boundary between settlement logic and whatever holds the data.
//!
//! ## Who Mutates What
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  complete_order(order, credit)        commit_settlement(customer, ...)  │
//! │       │                                      │                          │
//! │       ▼                                      ▼                          │
//! │  order.status = Completed             each order.credit_due -= applied  │
//! │  order.credit_due = credit            fully paid → status = Settled     │
//! │  customer.credit_amount += credit     customer.credit_amount -= total   │
//! │  customer.visit_count += 1            payment record appended           │
//! │  customer.loyalty_points += earned                                      │
//! │                                                                         │
//! │  Nothing else changes credit. Both calls are all-or-nothing.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use tally_core::{CreditLedgerEntry, Customer, Money, Order, PaymentRecord, SettlementAllocation};

use crate::error::StoreResult;

/// Store collaborator used by the settlement flow.
///
/// Implementations must make [`commit_settlement`](CreditStore::commit_settlement)
/// and [`complete_order`](CreditStore::complete_order) atomic: either every
/// change lands or none does.
#[allow(async_fn_in_trait)]
pub trait CreditStore {
    /// Gets a customer by ID.
    async fn get_customer(&self, id: &str) -> StoreResult<Customer>;

    /// Every order placed by a customer, oldest first.
    async fn get_orders_for_customer(&self, customer_id: &str) -> StoreResult<Vec<Order>>;

    /// The customer's outstanding credit ledger (completed orders with
    /// credit still due).
    async fn ledger_for_customer(&self, customer_id: &str) -> StoreResult<Vec<CreditLedgerEntry>> {
        let orders = self.get_orders_for_customer(customer_id).await?;
        Ok(orders.iter().filter_map(Order::ledger_entry).collect())
    }

    /// Applies a settlement: reduces each order's due by its allocation
    /// line, marks fully paid orders settled, reduces the customer's
    /// aggregate and stores the payment record. Returns the updated customer.
    async fn commit_settlement(
        &self,
        customer_id: &str,
        allocation: &SettlementAllocation,
        record: PaymentRecord,
    ) -> StoreResult<Customer>;

    /// Completes an open order, putting `credit_portion` of its total on
    /// the customer's credit.
    async fn complete_order(&self, order_id: &str, credit_portion: Money) -> StoreResult<Order>;

    /// Completes an open order that was paid in full at the counter.
    async fn mark_order_completed(&self, order_id: &str) -> StoreResult<Order> {
        self.complete_order(order_id, Money::zero()).await
    }

    /// Adds a new customer with no outstanding credit.
    async fn insert_customer(&self, customer: Customer) -> StoreResult<()>;

    /// Adds a new open order.
    async fn insert_order(&self, order: Order) -> StoreResult<()>;

    /// Orders completed on `date` (UTC).
    async fn orders_on(&self, date: NaiveDate) -> StoreResult<Vec<Order>>;

    /// Settlement payments recorded on `date` (UTC).
    async fn payments_on(&self, date: NaiveDate) -> StoreResult<Vec<PaymentRecord>>;
}

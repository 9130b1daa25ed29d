//! # In-Memory Store
//!
//! [`CreditStore`] implementation backed by maps behind one async RwLock.
//!
//! ## Commit Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit_settlement                                                      │
//! │                                                                         │
//! │  1. take the write lock                                                │
//! │  2. CHECK  customer exists, record matches allocation                   │
//! │            every line: order exists, belongs to customer, is            │
//! │            Completed (not Settled), 0 < applied ≤ credit_due            │
//! │            total ≤ customer.credit_amount                               │
//! │  3. APPLY  (infallible from here on)                                    │
//! │  4. release the lock                                                   │
//! │                                                                         │
//! │  Readers never observe a half-applied settlement.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persistence
//! The store itself is volatile. [`MemoryStore::snapshot`] and
//! [`MemoryStore::from_snapshot`] exchange a JSON document with the
//! key-value persistence collaborator.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use tally_core::validation::{validate_customer, validate_order};
use tally_core::{
    Customer, LoyaltyPolicy, Money, Order, OrderStatus, PaymentRecord, SettlementAllocation,
};

use crate::error::{StoreError, StoreResult};
use crate::store::CreditStore;

// =============================================================================
// Snapshot
// =============================================================================

/// Serialized form of the whole store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub payments: Vec<PaymentRecord>,
}

// =============================================================================
// Memory Store
// =============================================================================

#[derive(Debug, Default)]
struct Inner {
    customers: BTreeMap<String, Customer>,
    orders: BTreeMap<String, Order>,
    payments: Vec<PaymentRecord>,
}

/// Thread-safe in-memory store.
///
/// Cloning is cheap; clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    loyalty: LoyaltyPolicy,
}

impl MemoryStore {
    /// Creates an empty store with the default loyalty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the loyalty policy used by order completion.
    pub fn with_loyalty_policy(mut self, policy: LoyaltyPolicy) -> Self {
        self.loyalty = policy;
        self
    }

    /// Serializes the full store to JSON.
    pub async fn snapshot(&self) -> StoreResult<String> {
        let inner = self.inner.read().await;
        let snapshot = StoreSnapshot {
            customers: inner.customers.values().cloned().collect(),
            orders: inner.orders.values().cloned().collect(),
            payments: inner.payments.clone(),
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Rebuilds a store from [`snapshot`](Self::snapshot) output.
    ///
    /// Rejects documents whose customer aggregates disagree with their
    /// ledgers, or whose orders point at unknown customers.
    pub fn from_snapshot(json: &str) -> StoreResult<Self> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;

        let mut inner = Inner::default();
        for customer in snapshot.customers {
            validate_customer(&customer)?;
            inner.customers.insert(customer.id.clone(), customer);
        }
        for order in snapshot.orders {
            validate_order(&order)?;
            if let Some(customer_id) = &order.customer_id {
                if !inner.customers.contains_key(customer_id) {
                    return Err(StoreError::Snapshot(format!(
                        "order {} references unknown customer {}",
                        order.id, customer_id
                    )));
                }
            }
            inner.orders.insert(order.id.clone(), order);
        }
        inner.payments = snapshot.payments;

        for customer in inner.customers.values() {
            let outstanding = inner.outstanding_for(&customer.id);
            if outstanding != customer.credit_amount {
                return Err(StoreError::Snapshot(format!(
                    "customer {} carries {} but its ledger sums to {}",
                    customer.id, customer.credit_amount, outstanding
                )));
            }
        }

        debug!(
            customers = inner.customers.len(),
            orders = inner.orders.len(),
            payments = inner.payments.len(),
            "Loaded store snapshot"
        );

        Ok(MemoryStore {
            inner: Arc::new(RwLock::new(inner)),
            loyalty: LoyaltyPolicy::default(),
        })
    }

    /// Sum of the customer's ledger, recomputed from orders.
    pub async fn outstanding_for(&self, customer_id: &str) -> Money {
        self.inner.read().await.outstanding_for(customer_id)
    }

    /// Every payment record, in commit order.
    pub async fn payments(&self) -> Vec<PaymentRecord> {
        self.inner.read().await.payments.clone()
    }
}

impl Inner {
    fn outstanding_for(&self, customer_id: &str) -> Money {
        self.orders
            .values()
            .filter(|order| order.customer_id.as_deref() == Some(customer_id))
            .filter_map(Order::ledger_entry)
            .map(|entry| entry.credit_due)
            .sum()
    }

    /// Every check of a settlement commit. Touches nothing.
    fn check_settlement(
        &self,
        customer_id: &str,
        allocation: &SettlementAllocation,
        record: &PaymentRecord,
    ) -> StoreResult<BTreeMap<String, Money>> {
        let customer = self
            .customers
            .get(customer_id)
            .ok_or_else(|| StoreError::not_found("Customer", customer_id))?;

        if allocation.is_empty() {
            return Err(StoreError::invalid_state("settlement has no allocation lines"));
        }
        if record.customer_id != customer_id {
            return Err(StoreError::invalid_state(format!(
                "payment record belongs to {}, not {}",
                record.customer_id, customer_id
            )));
        }
        if record.amount != allocation.total() {
            return Err(StoreError::invalid_state(format!(
                "payment record amount {} differs from allocation total {}",
                record.amount,
                allocation.total()
            )));
        }
        if self.payments.iter().any(|p| p.id == record.id) {
            return Err(StoreError::invalid_state(format!(
                "payment {} already recorded",
                record.id
            )));
        }

        // Merge duplicate lines so the per-order check sees the real total.
        let mut per_order: BTreeMap<String, Money> = BTreeMap::new();
        for line in allocation.iter() {
            if !line.amount_applied.is_positive() {
                return Err(StoreError::invalid_state(format!(
                    "allocation line for {} is not positive",
                    line.order_id
                )));
            }
            *per_order.entry(line.order_id.clone()).or_insert_with(Money::zero) += line.amount_applied;
        }

        for (order_id, applied) in &per_order {
            let order = self
                .orders
                .get(order_id)
                .ok_or_else(|| StoreError::not_found("Order", order_id.as_str()))?;

            if order.customer_id.as_deref() != Some(customer_id) {
                return Err(StoreError::invalid_state(format!(
                    "order {} does not belong to customer {}",
                    order_id, customer_id
                )));
            }
            match order.status {
                OrderStatus::Settled => {
                    return Err(StoreError::AlreadySettled {
                        order_id: order_id.clone(),
                    })
                }
                OrderStatus::Open => {
                    return Err(StoreError::invalid_state(format!(
                        "order {} is still open",
                        order_id
                    )))
                }
                OrderStatus::Completed => {}
            }
            if *applied > order.credit_due {
                return Err(StoreError::OverAllocation {
                    target: format!("order {}", order_id),
                    applied: *applied,
                    due: order.credit_due,
                });
            }
        }

        let total = allocation.total();
        if total > customer.credit_amount {
            return Err(StoreError::OverAllocation {
                target: format!("customer {}", customer_id),
                applied: total,
                due: customer.credit_amount,
            });
        }

        Ok(per_order)
    }
}

// =============================================================================
// CreditStore Implementation
// =============================================================================

impl CreditStore for MemoryStore {
    async fn get_customer(&self, id: &str) -> StoreResult<Customer> {
        self.inner
            .read()
            .await
            .customers
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Customer", id))
    }

    async fn get_orders_for_customer(&self, customer_id: &str) -> StoreResult<Vec<Order>> {
        let inner = self.inner.read().await;
        if !inner.customers.contains_key(customer_id) {
            return Err(StoreError::not_found("Customer", customer_id));
        }

        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|order| order.customer_id.as_deref() == Some(customer_id))
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    async fn commit_settlement(
        &self,
        customer_id: &str,
        allocation: &SettlementAllocation,
        record: PaymentRecord,
    ) -> StoreResult<Customer> {
        let mut inner = self.inner.write().await;

        let per_order = match inner.check_settlement(customer_id, allocation, &record) {
            Ok(per_order) => per_order,
            Err(err) => {
                warn!(customer_id = %customer_id, error = %err, "Settlement rejected");
                return Err(err);
            }
        };

        for (order_id, applied) in &per_order {
            if let Some(order) = inner.orders.get_mut(order_id) {
                order.credit_due -= *applied;
                if order.credit_due.is_zero() {
                    order.status = OrderStatus::Settled;
                }
                debug!(
                    order_id = %order_id,
                    applied = %applied,
                    remaining = %order.credit_due,
                    "Applied settlement line"
                );
            }
        }

        let total = allocation.total();
        let payment_id = record.id.clone();
        inner.payments.push(record);

        let customer = inner
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| StoreError::not_found("Customer", customer_id))?;
        customer.credit_amount -= total;
        let updated = customer.clone();

        info!(
            customer_id = %customer_id,
            payment_id = %payment_id,
            amount = %total,
            orders = per_order.len(),
            remaining_credit = %updated.credit_amount,
            "Settlement committed"
        );

        Ok(updated)
    }

    async fn complete_order(&self, order_id: &str, credit_portion: Money) -> StoreResult<Order> {
        let mut inner = self.inner.write().await;

        let order = inner
            .orders
            .get(order_id)
            .ok_or_else(|| StoreError::not_found("Order", order_id))?;

        match order.status {
            OrderStatus::Open => {}
            OrderStatus::Completed => {
                return Err(StoreError::invalid_state(format!(
                    "order {} is already completed",
                    order_id
                )))
            }
            OrderStatus::Settled => {
                return Err(StoreError::AlreadySettled {
                    order_id: order_id.to_string(),
                })
            }
        }

        let total = order.total();
        if credit_portion.is_negative() {
            return Err(StoreError::invalid_state("credit portion cannot be negative"));
        }
        if credit_portion > total {
            return Err(StoreError::OverAllocation {
                target: format!("order {}", order_id),
                applied: credit_portion,
                due: total,
            });
        }
        let customer_id = order.customer_id.clone();
        if credit_portion.is_positive() && customer_id.is_none() {
            return Err(StoreError::invalid_state(format!(
                "order {} has no customer to carry credit",
                order_id
            )));
        }
        if let Some(id) = &customer_id {
            if !inner.customers.contains_key(id) {
                return Err(StoreError::not_found("Customer", id.as_str()));
            }
        }

        let now = Utc::now();
        let points = self.loyalty.points_for(total);

        let mut completed = order.clone();
        completed.status = OrderStatus::Completed;
        completed.completed_at = Some(now);
        completed.credit_issued = credit_portion;
        completed.credit_due = credit_portion;
        inner.orders.insert(order_id.to_string(), completed.clone());

        if let Some(customer) = customer_id.as_deref().and_then(|id| inner.customers.get_mut(id)) {
            customer.credit_amount += credit_portion;
            customer.visit_count = customer.visit_count.saturating_add(1);
            customer.loyalty_points = customer.loyalty_points.saturating_add(points);
        }

        info!(
            order_id = %order_id,
            total = %total,
            credit = %credit_portion,
            loyalty_points = points,
            "Order completed"
        );

        Ok(completed)
    }

    async fn insert_customer(&self, customer: Customer) -> StoreResult<()> {
        validate_customer(&customer)?;
        if customer.credit_amount.is_positive() {
            return Err(StoreError::invalid_state(
                "new customers start without credit; complete an order instead",
            ));
        }

        let mut inner = self.inner.write().await;
        if inner.customers.contains_key(&customer.id) {
            return Err(StoreError::invalid_state(format!(
                "customer {} already exists",
                customer.id
            )));
        }

        debug!(id = %customer.id, name = %customer.name, "Inserting customer");
        inner.customers.insert(customer.id.clone(), customer);
        Ok(())
    }

    async fn insert_order(&self, order: Order) -> StoreResult<()> {
        validate_order(&order)?;
        if order.status != OrderStatus::Open {
            return Err(StoreError::invalid_state(format!(
                "order {} must be inserted open",
                order.id
            )));
        }

        let mut inner = self.inner.write().await;
        if inner.orders.contains_key(&order.id) {
            return Err(StoreError::invalid_state(format!("order {} already exists", order.id)));
        }
        if let Some(customer_id) = &order.customer_id {
            if !inner.customers.contains_key(customer_id) {
                return Err(StoreError::not_found("Customer", customer_id.as_str()));
            }
        }

        debug!(id = %order.id, items = order.items.len(), "Inserting order");
        let mut order = order;
        order.credit_issued = Money::zero();
        order.credit_due = Money::zero();
        order.completed_at = None;
        inner.orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn orders_on(&self, date: NaiveDate) -> StoreResult<Vec<Order>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|order| order.status != OrderStatus::Open)
            .filter(|order| order.completed_at.is_some_and(|at| at.date_naive() == date))
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.completed_at);
        Ok(orders)
    }

    async fn payments_on(&self, date: NaiveDate) -> StoreResult<Vec<PaymentRecord>> {
        Ok(self
            .inner
            .read()
            .await
            .payments
            .iter()
            .filter(|payment| payment.created_at.date_naive() == date)
            .cloned()
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Domain Types
//!
//! Core domain types used throughout Tally POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │      Order      │   │ CreditLedger-   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │ Entry           │       │
//! │  │  id             │◄──│  customer_id    │──►│  order_id       │       │
//! │  │  credit_amount  │   │  items          │   │  credit_due     │       │
//! │  │  loyalty_points │   │  credit_due     │   │  timestamp      │       │
//! │  │  visit_count    │   │  status         │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ SplitPaymentRow │   │ Settlement-     │   │ PaymentRecord   │       │
//! │  │  ─────────────  │   │ Allocation      │   │  ─────────────  │       │
//! │  │  method         │   │  ─────────────  │   │  rows           │       │
//! │  │  amount         │   │  [order, amt]   │   │  allocation     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Credit Invariant
//! `Customer.credit_amount == Σ CreditLedgerEntry.credit_due` over that
//! customer's unsettled orders. Only two operations move either side:
//! order completion (adds) and settlement commit (subtracts).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A customer who may carry an outstanding credit balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    /// Aggregate outstanding credit across all unsettled orders.
    pub credit_amount: Money,
    pub loyalty_points: u32,
    pub visit_count: u32,
}

impl Customer {
    /// Creates a customer with no history.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Customer {
            id: id.into(),
            name: name.into(),
            phone: None,
            credit_amount: Money::zero(),
            loyalty_points: 0,
            visit_count: 0,
        }
    }

    /// Sets the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Returns true if the customer owes anything.
    #[inline]
    pub fn has_credit(&self) -> bool {
        self.credit_amount.is_positive()
    }
}

// =============================================================================
// Credit Ledger Entry
// =============================================================================

/// The credit-bearing portion of one completed order.
///
/// Created when an order completes with an unpaid portion; only ever
/// reduced (towards zero) by settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditLedgerEntry {
    pub order_id: String,
    pub credit_due: Money,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl CreditLedgerEntry {
    pub fn new(order_id: impl Into<String>, credit_due: Money, timestamp: DateTime<Utc>) -> Self {
        CreditLedgerEntry {
            order_id: order_id.into(),
            credit_due,
            timestamp,
        }
    }
}

// =============================================================================
// Order Types
// =============================================================================

/// Print routing tag on a line item.
///
/// - `Kot`: Kitchen Order Ticket (food)
/// - `Bot`: Bar Order Ticket (drinks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Kot,
    Bot,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Kot => write!(f, "KOT"),
            OrderType::Bot => write!(f, "BOT"),
        }
    }
}

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Still being served; items may be added.
    #[default]
    Open,
    /// Billed. May still carry unpaid credit.
    Completed,
    /// Billed and every rupee of credit has been collected.
    Settled,
}

/// A line item on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub order_type: OrderType,
    pub note: Option<String>,
}

impl OrderItem {
    pub fn new(name: impl Into<String>, quantity: i64, unit_price: Money, order_type: OrderType) -> Self {
        OrderItem {
            name: name.into(),
            quantity,
            unit_price,
            order_type,
            note: None,
        }
    }

    /// Attaches a kitchen/bar note ("no onion", "extra ice").
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A restaurant order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_id: Option<String>,
    pub table: Option<String>,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    /// Credit portion recorded when the order completed.
    pub credit_issued: Money,
    /// Amount still owed on credit for this order.
    pub credit_due: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Creates an open order with no items.
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Order {
            id: id.into(),
            customer_id: None,
            table: None,
            items: Vec::new(),
            status: OrderStatus::Open,
            credit_issued: Money::zero(),
            credit_due: Money::zero(),
            created_at,
            completed_at: None,
        }
    }

    pub fn for_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn at_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_item(mut self, item: OrderItem) -> Self {
        self.items.push(item);
        self
    }

    /// Sum of every line total.
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Items routed to one station, in order-entry order.
    pub fn items_for(&self, order_type: OrderType) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(move |item| item.order_type == order_type)
    }

    /// The ledger view of this order, if it still owes credit.
    ///
    /// Open and settled orders never appear on the ledger.
    pub fn ledger_entry(&self) -> Option<CreditLedgerEntry> {
        if self.status != OrderStatus::Completed || !self.credit_due.is_positive() {
            return None;
        }
        let timestamp = self.completed_at.unwrap_or(self.created_at);
        Some(CreditLedgerEntry::new(self.id.clone(), self.credit_due, timestamp))
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a settlement (or part of one) was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Bank,
    Fonepay,
}

impl PaymentMethod {
    /// All methods in display order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Bank,
        PaymentMethod::Fonepay,
    ];

    /// Label printed on receipts.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Bank => "Bank",
            PaymentMethod::Fonepay => "Fonepay",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Split Payment Row
// =============================================================================

/// One tender line of a (possibly split) settlement payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SplitPaymentRow {
    pub method: PaymentMethod,
    pub amount: Money,
}

impl SplitPaymentRow {
    pub fn new(method: PaymentMethod, amount: Money) -> Self {
        SplitPaymentRow { method, amount }
    }
}

// =============================================================================
// Settlement Allocation
// =============================================================================

/// The amount of a settlement applied to one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AllocationLine {
    pub order_id: String,
    pub amount_applied: Money,
}

/// Ordered per-order split of a settlement amount, oldest debt first.
///
/// Built by [`crate::allocation::allocate`]; never constructed by hand in
/// production code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SettlementAllocation {
    pub lines: Vec<AllocationLine>,
}

impl SettlementAllocation {
    /// Sum of every applied amount.
    pub fn total(&self) -> Money {
        self.lines.iter().map(|line| line.amount_applied).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AllocationLine> {
        self.lines.iter()
    }

    /// Amount applied to one order, if it was touched.
    pub fn applied_to(&self, order_id: &str) -> Option<Money> {
        self.lines
            .iter()
            .find(|line| line.order_id == order_id)
            .map(|line| line.amount_applied)
    }
}

// =============================================================================
// Payment Record
// =============================================================================

/// Audit record committed together with a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentRecord {
    pub id: String,
    pub customer_id: String,
    pub amount: Money,
    pub rows: Vec<SplitPaymentRow>,
    pub allocation: SettlementAllocation,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Creates a record with a fresh UUID v4 and the current time.
    pub fn new(
        customer_id: impl Into<String>,
        rows: Vec<SplitPaymentRow>,
        allocation: SettlementAllocation,
    ) -> Self {
        PaymentRecord {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.into(),
            amount: allocation.total(),
            rows,
            allocation,
            created_at: Utc::now(),
        }
    }
}

// =============================================================================
// Loyalty Policy
// =============================================================================

/// How loyalty points are earned on completed orders.
///
/// One point per `spend_per_point` of order total, rounded down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoyaltyPolicy {
    pub spend_per_point: Money,
}

impl LoyaltyPolicy {
    /// Points earned for an order total. Non-positive totals earn nothing.
    pub fn points_for(&self, total: Money) -> u32 {
        if !self.spend_per_point.is_positive() || !total.is_positive() {
            return 0;
        }
        let points = total.cents() / self.spend_per_point.cents();
        u32::try_from(points).unwrap_or(u32::MAX)
    }
}

impl Default for LoyaltyPolicy {
    fn default() -> Self {
        LoyaltyPolicy {
            spend_per_point: Money::from_cents(10_000),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Daily Summary
//!
//! End-of-day totals printed from the counter printer.
//!
//! Built from two inputs: orders that completed on the day, and settlement
//! payments recorded on the day.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::split::split_totals_by_method;
use crate::types::{Order, OrderStatus, OrderType, PaymentMethod, PaymentRecord};

/// Totals for one business day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Orders completed (or completed and since settled) on the day.
    pub order_count: usize,
    /// Sum of those orders' totals.
    pub gross_sales: Money,
    /// Portion of gross sales paid at the counter.
    pub paid_at_counter: Money,
    /// Portion of gross sales put on customer credit.
    pub credit_issued: Money,
    /// Credit collected by settlements recorded on the day.
    pub credit_collected: Money,
    /// Settlement collections by tender method.
    pub collections: BTreeMap<PaymentMethod, Money>,
    pub settlement_count: usize,
    /// Kitchen item quantity sent on KOTs.
    pub kot_items: i64,
    /// Bar item quantity sent on BOTs.
    pub bot_items: i64,
}

impl DailySummary {
    /// Computes the summary for `date`.
    ///
    /// Orders are counted by their completion date; open orders are ignored.
    /// Payments are counted by their creation date. Both filters run here
    /// so callers can pass a wider window.
    pub fn compute(date: NaiveDate, orders: &[Order], payments: &[PaymentRecord]) -> Self {
        let mut summary = DailySummary {
            date,
            order_count: 0,
            gross_sales: Money::zero(),
            paid_at_counter: Money::zero(),
            credit_issued: Money::zero(),
            credit_collected: Money::zero(),
            collections: BTreeMap::new(),
            settlement_count: 0,
            kot_items: 0,
            bot_items: 0,
        };

        for order in orders {
            if order.status == OrderStatus::Open {
                continue;
            }
            let Some(completed_at) = order.completed_at else {
                continue;
            };
            if completed_at.date_naive() != date {
                continue;
            }

            let total = order.total();
            summary.order_count += 1;
            summary.gross_sales += total;
            summary.credit_issued += order.credit_issued;
            summary.paid_at_counter += total - order.credit_issued;
            summary.kot_items += order.items_for(OrderType::Kot).map(|i| i.quantity).sum::<i64>();
            summary.bot_items += order.items_for(OrderType::Bot).map(|i| i.quantity).sum::<i64>();
        }

        for payment in payments.iter().filter(|p| p.created_at.date_naive() == date) {
            summary.settlement_count += 1;
            summary.credit_collected += payment.amount;
            for (method, amount) in split_totals_by_method(&payment.rows) {
                *summary.collections.entry(method).or_insert_with(Money::zero) += amount;
            }
        }

        summary
    }

    /// Money that changed hands on the day: counter sales plus settlements.
    pub fn total_received(&self) -> Money {
        self.paid_at_counter + self.credit_collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AllocationLine, OrderItem, SettlementAllocation, SplitPaymentRow};
    use chrono::{TimeZone, Utc};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    fn completed(id: &str, hour: u32, credit: i64) -> Order {
        let mut order = Order::new(id, Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap())
            .with_item(OrderItem::new("Momo", 2, Money::from_cents(25000), OrderType::Kot))
            .with_item(OrderItem::new("Beer", 3, Money::from_cents(50000), OrderType::Bot));
        order.status = OrderStatus::Completed;
        order.completed_at = Some(Utc.with_ymd_and_hms(2026, 3, 14, hour, 0, 0).unwrap());
        order.credit_issued = Money::from_cents(credit);
        order.credit_due = Money::from_cents(credit);
        order
    }

    #[test]
    fn test_summary_counts_only_orders_completed_that_day() {
        let mut yesterday = completed("Y", 12, 0);
        yesterday.completed_at = Some(Utc.with_ymd_and_hms(2026, 3, 13, 23, 0, 0).unwrap());
        let open = Order::new("O", Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap());

        let orders = vec![completed("A", 12, 0), completed("B", 20, 100000), yesterday, open];
        let summary = DailySummary::compute(day(), &orders, &[]);

        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.gross_sales.cents(), 2 * 200000);
        assert_eq!(summary.credit_issued.cents(), 100000);
        assert_eq!(summary.paid_at_counter.cents(), 300000);
        assert_eq!(summary.kot_items, 4);
        assert_eq!(summary.bot_items, 6);
    }

    #[test]
    fn test_summary_collects_settlements_by_method() {
        let allocation = SettlementAllocation {
            lines: vec![AllocationLine {
                order_id: "B".into(),
                amount_applied: Money::from_cents(7000),
            }],
        };
        let mut payment = PaymentRecord::new(
            "c1",
            vec![
                SplitPaymentRow::new(PaymentMethod::Cash, Money::from_cents(5000)),
                SplitPaymentRow::new(PaymentMethod::Fonepay, Money::from_cents(2000)),
            ],
            allocation,
        );
        payment.created_at = Utc.with_ymd_and_hms(2026, 3, 14, 18, 30, 0).unwrap();

        let summary = DailySummary::compute(day(), &[], &[payment]);
        assert_eq!(summary.settlement_count, 1);
        assert_eq!(summary.credit_collected.cents(), 7000);
        assert_eq!(summary.collections[&PaymentMethod::Cash].cents(), 5000);
        assert_eq!(summary.collections[&PaymentMethod::Fonepay].cents(), 2000);
        assert_eq!(summary.total_received().cents(), 7000);
    }
}

//! # Settlement Service
//!
//! The cashier-facing credit settlement flow, plus the print-only flows
//! that read from the store.
//!
//! ## Settlement Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  prepare(customer, "80")                                                │
//! │     ├── parse_amount                     "80" ──► 80.00                 │
//! │     ├── get_customer                     (store read)                   │
//! │     ├── validate_settlement_amount       80.00 <= credit                │
//! │     ├── ledger_for_customer              (store read)                   │
//! │     └── allocate                         A 50.00, B 30.00               │
//! │                                                                         │
//! │  confirm(plan, rows, printer?)                                          │
//! │     ├── check_split                      rows sum to 80.00              │
//! │     ├── commit_settlement                ATOMIC, may fail as stale      │
//! │     └── compose + transmit receipt       failure is reported in the     │
//! │                                          outcome, the commit stands     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use tally_core::allocation::{allocate, validate_settlement_amount};
use tally_core::split::{check_split, parse_amount};
use tally_core::{Customer, DailySummary, Money, Order, PaymentRecord, SettlementAllocation, SplitPaymentRow};
use tally_print::compose::{
    compose_bot, compose_credit_statement, compose_daily_summary, compose_kot,
    compose_settlement_receipt,
};
use tally_print::{BluetoothTransport, DocumentKind, FailureKind, PrintJob, PrinterResult, PrinterSession};
use tally_store::CreditStore;

use crate::error::SettleResult;
use crate::form::SplitForm;

// =============================================================================
// Plan / Outcome
// =============================================================================

/// A validated settlement waiting for its tender rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementPlan {
    /// Customer as read during `prepare`.
    pub customer: Customer,
    pub amount: Money,
    pub allocation: SettlementAllocation,
}

impl SettlementPlan {
    /// An empty tender form for this plan's amount.
    pub fn split_form(&self) -> SplitForm {
        SplitForm::new(self.amount)
    }
}

/// What happened to the receipt of a committed settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReceiptStatus {
    Printed,
    /// No printer was offered.
    Skipped,
    /// The settlement stands; retry with `reprint`.
    Failed {
        kind: FailureKind,
        message: String,
        remedy: String,
    },
}

impl ReceiptStatus {
    fn from_result(result: &PrinterResult<()>) -> Self {
        match result {
            Ok(()) => ReceiptStatus::Printed,
            Err(e) => ReceiptStatus::Failed {
                kind: e.kind(),
                message: e.to_string(),
                remedy: e.remedy().to_string(),
            },
        }
    }
}

/// A committed settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementOutcome {
    /// Customer after the commit.
    pub customer: Customer,
    pub payment: PaymentRecord,
    pub receipt: ReceiptStatus,
}

impl SettlementOutcome {
    pub fn is_printed(&self) -> bool {
        self.receipt == ReceiptStatus::Printed
    }
}

// =============================================================================
// Settlement Service
// =============================================================================

pub struct SettlementService<S> {
    store: S,
}

impl<S: CreditStore> SettlementService<S> {
    pub fn new(store: S) -> Self {
        SettlementService { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parses the typed amount and allocates it over the customer's ledger.
    #[instrument(skip(self))]
    pub async fn prepare(&self, customer_id: &str, amount_input: &str) -> SettleResult<SettlementPlan> {
        let amount = parse_amount(amount_input);
        let customer = self.store.get_customer(customer_id).await?;
        validate_settlement_amount(&customer, amount)?;

        let ledger = self.store.ledger_for_customer(customer_id).await?;
        let allocation = allocate(&ledger, amount)?;

        debug!(
            amount = %amount,
            orders = allocation.len(),
            "Settlement prepared"
        );

        Ok(SettlementPlan {
            customer,
            amount,
            allocation,
        })
    }

    /// Commits the plan, then prints the receipt if a printer is offered.
    ///
    /// Only validation and store errors fail this call. A printer error is
    /// returned in [`SettlementOutcome::receipt`] because the money has
    /// already been recorded.
    #[instrument(skip_all, fields(customer_id = %plan.customer.id, amount = %plan.amount))]
    pub async fn confirm<T: BluetoothTransport>(
        &self,
        plan: &SettlementPlan,
        rows: Vec<SplitPaymentRow>,
        printer: Option<&PrinterSession<T>>,
    ) -> SettleResult<SettlementOutcome> {
        check_split(&rows, plan.amount)?;

        let record = PaymentRecord::new(plan.customer.id.clone(), rows, plan.allocation.clone());
        let customer = self
            .store
            .commit_settlement(&plan.customer.id, &plan.allocation, record.clone())
            .await?;

        info!(
            payment_id = %record.id,
            remaining = %customer.credit_amount,
            "Settlement committed"
        );

        let receipt = match printer {
            Some(session) => {
                let job = compose_settlement_receipt(&customer, &record, &session.config().layout());
                let status = ReceiptStatus::from_result(&session.transmit(&job).await);
                if let ReceiptStatus::Failed { message, .. } = &status {
                    warn!(payment_id = %record.id, error = %message, "Settlement receipt not printed");
                }
                status
            }
            None => ReceiptStatus::Skipped,
        };

        Ok(SettlementOutcome {
            customer,
            payment: record,
            receipt,
        })
    }

    /// Prints the receipt of a committed settlement again.
    pub async fn reprint<T: BluetoothTransport>(
        &self,
        outcome: &mut SettlementOutcome,
        session: &PrinterSession<T>,
    ) -> PrinterResult<()> {
        let job = compose_settlement_receipt(&outcome.customer, &outcome.payment, &session.config().layout());
        let result = session.transmit(&job).await;
        outcome.receipt = ReceiptStatus::from_result(&result);
        result
    }

    /// Prints the customer's outstanding orders, oldest first.
    #[instrument(skip(self, session))]
    pub async fn print_credit_statement<T: BluetoothTransport>(
        &self,
        customer_id: &str,
        session: &PrinterSession<T>,
    ) -> SettleResult<()> {
        let customer = self.store.get_customer(customer_id).await?;
        let ledger = self.store.ledger_for_customer(customer_id).await?;
        let job = compose_credit_statement(&customer, &ledger, &session.config().layout());
        session.transmit(&job).await?;
        Ok(())
    }

    /// Computes and prints the end-of-day summary for `date`.
    #[instrument(skip(self, session))]
    pub async fn print_daily_summary<T: BluetoothTransport>(
        &self,
        date: NaiveDate,
        session: &PrinterSession<T>,
    ) -> SettleResult<DailySummary> {
        let orders = self.store.orders_on(date).await?;
        let payments = self.store.payments_on(date).await?;
        let summary = DailySummary::compute(date, &orders, &payments);

        let job = compose_daily_summary(&summary, &session.config().layout());
        session.transmit(&job).await?;

        info!(
            orders = summary.order_count,
            received = %summary.total_received(),
            "Daily summary printed"
        );
        Ok(summary)
    }
}

// =============================================================================
// Station Tickets
// =============================================================================

/// Prints the KOT, then the BOT, skipping a ticket with no items.
///
/// Stops at the first failure; the returned kinds are the tickets that
/// printed.
#[instrument(skip_all, fields(order_id = %order.id))]
pub async fn print_station_tickets<T: BluetoothTransport>(
    order: &Order,
    session: &PrinterSession<T>,
) -> PrinterResult<Vec<DocumentKind>> {
    let layout = session.config().layout();
    let tickets: [PrintJob; 2] = [compose_kot(order, &layout), compose_bot(order, &layout)];

    let mut printed = Vec::new();
    for job in tickets.iter().filter(|job| job.has_body()) {
        session.transmit(job).await?;
        printed.push(job.kind());
    }

    debug!(?printed, "Station tickets printed");
    Ok(printed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettleError;
    use chrono::Utc;
    use tally_core::{CoreError, OrderItem, OrderType, PaymentMethod};
    use tally_print::testing::MockTransport;
    use tally_print::{ConnectionState, Device, PrinterConfig};
    use tally_store::{MemoryStore, StoreError};

    type NoPrinter<'a> = Option<&'a PrinterSession<MockTransport>>;

    fn item(name: &str, cents: i64, order_type: OrderType) -> OrderItem {
        OrderItem::new(name, 1, Money::from_cents(cents), order_type)
    }

    /// c1 owes A 50.00 then B 30.00.
    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_customer(Customer::new("c1", "Sita")).await.unwrap();
        for (id, cents) in [("A", 5000), ("B", 3000)] {
            store
                .insert_order(
                    Order::new(id, Utc::now())
                        .for_customer("c1")
                        .with_item(item("Thali", cents, OrderType::Kot)),
                )
                .await
                .unwrap();
            store.complete_order(id, Money::from_cents(cents)).await.unwrap();
        }
        store
    }

    async fn connected(mock: MockTransport) -> PrinterSession<MockTransport> {
        let session = PrinterSession::new(mock, PrinterConfig::default());
        session.enable().await.unwrap();
        session
            .connect(&Device::new("PT-210", "66:22:B3:4F:10:9A"))
            .await
            .unwrap();
        session
    }

    fn cash(cents: i64) -> Vec<SplitPaymentRow> {
        vec![SplitPaymentRow::new(PaymentMethod::Cash, Money::from_cents(cents))]
    }

    #[tokio::test]
    async fn test_prepare_allocates_oldest_first() {
        let service = SettlementService::new(seeded().await);
        let plan = service.prepare("c1", "60").await.unwrap();

        assert_eq!(plan.amount, Money::from_cents(6000));
        assert_eq!(plan.allocation.applied_to("A"), Some(Money::from_cents(5000)));
        assert_eq!(plan.allocation.applied_to("B"), Some(Money::from_cents(1000)));
        assert_eq!(plan.split_form().target(), plan.amount);
    }

    #[tokio::test]
    async fn test_prepare_rejects_bad_amounts() {
        let service = SettlementService::new(seeded().await);

        let err = service.prepare("c1", "100").await.unwrap_err();
        assert!(matches!(err, SettleError::Core(CoreError::AmountExceedsCredit { .. })));

        let err = service.prepare("c1", "abc").await.unwrap_err();
        assert!(matches!(err, SettleError::Core(CoreError::NothingToAllocate { .. })));

        let err = service.prepare("c9", "10").await.unwrap_err();
        assert!(matches!(err, SettleError::Store(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_confirm_commits_then_prints() {
        let mock = MockTransport::new();
        let session = connected(mock.clone()).await;
        let service = SettlementService::new(seeded().await);

        let plan = service.prepare("c1", "80").await.unwrap();
        let mut form = plan.split_form();
        let a = form.add_row(PaymentMethod::Cash);
        let b = form.add_row(PaymentMethod::Fonepay);
        form.set_amount(a, "50");
        form.set_amount(b, "30");
        assert!(form.is_confirm_enabled());

        let outcome = service.confirm(&plan, form.rows(), Some(&session)).await.unwrap();

        assert!(outcome.is_printed());
        assert_eq!(outcome.customer.credit_amount, Money::zero());
        assert_eq!(outcome.payment.amount, Money::from_cents(8000));
        assert!(service.store().ledger_for_customer("c1").await.unwrap().is_empty());
        assert!(mock.printed_lines().iter().any(|l| l.contains("CREDIT SETTLEMENT")));
    }

    #[tokio::test]
    async fn test_split_mismatch_commits_nothing() {
        let store = seeded().await;
        let service = SettlementService::new(store.clone());
        let before = store.snapshot().await.unwrap();

        let plan = service.prepare("c1", "80").await.unwrap();
        let err = service.confirm(&plan, cash(7999), NoPrinter::None).await.unwrap_err();

        assert!(matches!(err, SettleError::Core(CoreError::SplitMismatch { .. })));
        assert_eq!(store.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_negative_tender_commits_nothing() {
        let store = seeded().await;
        let service = SettlementService::new(store.clone());
        let before = store.snapshot().await.unwrap();

        let plan = service.prepare("c1", "80").await.unwrap();
        let rows = vec![
            SplitPaymentRow::new(PaymentMethod::Cash, Money::from_cents(10000)),
            SplitPaymentRow::new(PaymentMethod::Card, Money::from_cents(-2000)),
        ];
        let err = service.confirm(&plan, rows, NoPrinter::None).await.unwrap_err();

        assert_eq!(err.code(), crate::ErrorCode::ValidationError);
        assert_eq!(store.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_without_printer_receipt_is_skipped() {
        let service = SettlementService::new(seeded().await);
        let plan = service.prepare("c1", "20").await.unwrap();

        let outcome = service.confirm(&plan, cash(2000), NoPrinter::None).await.unwrap();
        assert_eq!(outcome.receipt, ReceiptStatus::Skipped);
        assert_eq!(outcome.customer.credit_amount, Money::from_cents(6000));
    }

    #[tokio::test]
    async fn test_print_failure_keeps_commit_and_reprints() {
        let mock = MockTransport::new().fail_primitive_at(3);
        let session = connected(mock.clone()).await;
        let store = seeded().await;
        let service = SettlementService::new(store.clone());

        let plan = service.prepare("c1", "40").await.unwrap();
        let mut outcome = service.confirm(&plan, cash(4000), Some(&session)).await.unwrap();

        match &outcome.receipt {
            ReceiptStatus::Failed { kind, .. } => assert_eq!(*kind, FailureKind::TransmitFailure),
            other => panic!("unexpected receipt status: {other:?}"),
        }
        assert_eq!(store.outstanding_for("c1").await, Money::from_cents(4000));
        assert_eq!(store.payments().await.len(), 1);
        assert_eq!(session.state().await, ConnectionState::Disconnected);

        let err = service.reprint(&mut outcome, &session).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotConnected);

        session
            .connect(&Device::new("PT-210", "66:22:B3:4F:10:9A"))
            .await
            .unwrap();
        service.reprint(&mut outcome, &session).await.unwrap();
        assert!(outcome.is_printed());
        assert_eq!(store.payments().await.len(), 1);
    }

    #[tokio::test]
    async fn test_stale_plan_is_a_conflict() {
        let service = SettlementService::new(seeded().await);
        let first = service.prepare("c1", "80").await.unwrap();
        let second = first.clone();

        service.confirm(&first, cash(8000), NoPrinter::None).await.unwrap();
        let err = service.confirm(&second, cash(8000), NoPrinter::None).await.unwrap_err();

        assert!(matches!(err, SettleError::Store(StoreError::AlreadySettled { .. })));
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_station_tickets_skip_empty_body() {
        let mock = MockTransport::new();
        let session = connected(mock.clone()).await;
        let order = Order::new("T4", Utc::now())
            .at_table("4")
            .with_item(item("Momo", 25000, OrderType::Kot))
            .with_item(item("Chowmein", 18000, OrderType::Kot));

        let printed = print_station_tickets(&order, &session).await.unwrap();
        assert_eq!(printed, vec![DocumentKind::Kot]);

        let lines = mock.printed_lines();
        assert!(lines.iter().any(|l| l.contains("Momo")));
        assert!(!lines.iter().any(|l| l.contains("BOT")));
    }

    #[tokio::test]
    async fn test_station_tickets_kot_then_bot() {
        let mock = MockTransport::new();
        let session = connected(mock.clone()).await;
        let order = Order::new("T5", Utc::now())
            .with_item(item("Lemonade", 15000, OrderType::Bot))
            .with_item(item("Momo", 25000, OrderType::Kot));

        let printed = print_station_tickets(&order, &session).await.unwrap();
        assert_eq!(printed, vec![DocumentKind::Kot, DocumentKind::Bot]);
    }

    #[tokio::test]
    async fn test_daily_summary_and_statement() {
        let mock = MockTransport::new();
        let session = connected(mock.clone()).await;
        let service = SettlementService::new(seeded().await);

        let plan = service.prepare("c1", "50").await.unwrap();
        service.confirm(&plan, cash(5000), NoPrinter::None).await.unwrap();

        let summary = service
            .print_daily_summary(Utc::now().date_naive(), &session)
            .await
            .unwrap();
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.credit_issued, Money::from_cents(8000));
        assert_eq!(summary.credit_collected, Money::from_cents(5000));
        assert_eq!(summary.settlement_count, 1);

        service.print_credit_statement("c1", &session).await.unwrap();
        assert!(mock.printed_lines().iter().any(|l| l.contains("CREDIT STATEMENT")));
    }

    #[tokio::test]
    async fn test_print_only_flow_surfaces_printer_error() {
        let session = PrinterSession::new(MockTransport::new(), PrinterConfig::default());
        let service = SettlementService::new(seeded().await);

        let err = service.print_credit_statement("c1", &session).await.unwrap_err();
        assert!(matches!(err, SettleError::Printer(_)));
    }
}

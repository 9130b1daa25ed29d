//! # Document Composition
//!
//! Pure functions from domain records to [`PrintJob`]s.
//!
//! ## Documents
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Document             Input                     Printed at             │
//! │  ──────────────────   ───────────────────────   ─────────────────────  │
//! │  Receipt              Order                     counter, on billing    │
//! │  KOT                  Order (KOT items only)    kitchen                │
//! │  BOT                  Order (BOT items only)    bar                    │
//! │  Credit statement     Customer + ledger         counter, on request    │
//! │  Daily summary        DailySummary              counter, end of day    │
//! │  Settlement receipt   Customer + PaymentRecord  counter, after commit  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every amount goes through `Money`'s `Display`, so it always has exactly
//! two decimals and reads back unchanged through `parse_amount`.

use chrono::{DateTime, Utc};

use tally_core::split::split_totals_by_method;
use tally_core::{
    CreditLedgerEntry, Customer, DailySummary, Money, Order, OrderType, PaymentRecord,
};

use crate::encoding::CodePage;
use crate::job::{Alignment, DocumentKind, JobBuilder, PrintJob, TextStyle};

/// Paper and branding shared by every document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Printed columns per line, in `code_page`.
    pub width: usize,
    pub code_page: CodePage,
    pub business_name: String,
    pub footer: Option<String>,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            width: 32,
            code_page: CodePage::default(),
            business_name: "Tally POS".to_string(),
            footer: None,
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Centered title block: business name, then the document title.
fn header(kind: DocumentKind, layout: &Layout, title: &str) -> JobBuilder {
    PrintJob::builder(kind, layout.width)
        .code_page(layout.code_page)
        .align(Alignment::Center)
        .font(TextStyle::TITLE)
        .line(layout.business_name.as_str())
        .font(TextStyle::BOLD)
        .line(title)
        .font(TextStyle::NORMAL)
        .align(Alignment::Left)
}

fn footer(builder: JobBuilder, layout: &Layout) -> PrintJob {
    let builder = match &layout.footer {
        Some(text) => builder.align(Alignment::Center).line(text.as_str()),
        None => builder,
    };
    builder.feed(3).build()
}

// =============================================================================
// Receipt
// =============================================================================

/// Customer receipt for a billed order.
pub fn compose_receipt(order: &Order, layout: &Layout) -> PrintJob {
    let mut b = header(DocumentKind::Receipt, layout, "RECEIPT")
        .line(format!("Order: {}", order.id));
    if let Some(table) = &order.table {
        b = b.line(format!("Table: {}", table));
    }
    b = b
        .line(format!("Date: {}", timestamp(order.completed_at.unwrap_or(order.created_at))))
        .separator('-');

    for item in &order.items {
        b = b.body_lr(&format!("{} x {}", item.quantity, item.name), &item.line_total().to_string());
    }

    let total = order.total();
    b = b
        .separator('-')
        .font(TextStyle::BOLD)
        .line_lr("TOTAL", &total.to_string())
        .font(TextStyle::NORMAL);

    if order.credit_issued.is_positive() {
        b = b
            .line_lr("Paid", &(total - order.credit_issued).to_string())
            .line_lr("On credit", &order.credit_issued.to_string());
    }

    footer(b, layout)
}

// =============================================================================
// Station Tickets
// =============================================================================

/// Kitchen ticket: only the order's KOT items.
pub fn compose_kot(order: &Order, layout: &Layout) -> PrintJob {
    compose_station_ticket(order, OrderType::Kot, layout)
}

/// Bar ticket: only the order's BOT items.
pub fn compose_bot(order: &Order, layout: &Layout) -> PrintJob {
    compose_station_ticket(order, OrderType::Bot, layout)
}

/// Station tickets carry no prices. An order with no items for the
/// station yields a job without body.
fn compose_station_ticket(order: &Order, station: OrderType, layout: &Layout) -> PrintJob {
    let kind = match station {
        OrderType::Kot => DocumentKind::Kot,
        OrderType::Bot => DocumentKind::Bot,
    };

    let mut b = PrintJob::builder(kind, layout.width)
        .code_page(layout.code_page)
        .align(Alignment::Center)
        .font(TextStyle::TITLE)
        .line(station.to_string())
        .font(TextStyle::NORMAL)
        .align(Alignment::Left)
        .line(format!("Order: {}", order.id));
    if let Some(table) = &order.table {
        b = b.font(TextStyle::BOLD).line(format!("Table: {}", table)).font(TextStyle::NORMAL);
    }
    b = b.line(format!("Time: {}", timestamp(order.created_at))).separator('-');

    for item in order.items_for(station) {
        b = b.font(TextStyle::BOLD).body_line(format!("{} x {}", item.quantity, item.name));
        if let Some(note) = &item.note {
            b = b.font(TextStyle::NORMAL).line(format!("   * {}", note));
        }
    }

    b.font(TextStyle::NORMAL).feed(3).build()
}

// =============================================================================
// Credit Statement
// =============================================================================

/// Outstanding credit for one customer, oldest debt first.
pub fn compose_credit_statement(
    customer: &Customer,
    ledger: &[CreditLedgerEntry],
    layout: &Layout,
) -> PrintJob {
    let mut b = header(DocumentKind::CreditStatement, layout, "CREDIT STATEMENT")
        .line(format!("Customer: {}", customer.name));
    if let Some(phone) = &customer.phone {
        b = b.line(format!("Phone: {}", phone));
    }
    b = b.separator('-');

    let mut entries: Vec<&CreditLedgerEntry> =
        ledger.iter().filter(|entry| entry.credit_due.is_positive()).collect();
    entries.sort_by(|x, y| x.timestamp.cmp(&y.timestamp).then_with(|| x.order_id.cmp(&y.order_id)));

    for entry in &entries {
        b = b.body_lr(
            &format!("{} #{}", entry.timestamp.format("%Y-%m-%d"), entry.order_id),
            &entry.credit_due.to_string(),
        );
    }

    let outstanding: Money = entries.iter().map(|entry| entry.credit_due).sum();
    b = b
        .separator('-')
        .font(TextStyle::BOLD)
        .line_lr("OUTSTANDING", &outstanding.to_string())
        .font(TextStyle::NORMAL)
        .line_lr("Loyalty points", &customer.loyalty_points.to_string())
        .line_lr("Visits", &customer.visit_count.to_string());

    footer(b, layout)
}

// =============================================================================
// Daily Summary
// =============================================================================

/// End-of-day totals.
pub fn compose_daily_summary(summary: &DailySummary, layout: &Layout) -> PrintJob {
    let mut b = header(DocumentKind::DailySummary, layout, "DAILY SUMMARY")
        .line(format!("Date: {}", summary.date.format("%Y-%m-%d")))
        .separator('-')
        .body_lr("Orders", &summary.order_count.to_string())
        .body_lr("Gross sales", &summary.gross_sales.to_string())
        .body_lr("Paid at counter", &summary.paid_at_counter.to_string())
        .body_lr("Credit issued", &summary.credit_issued.to_string())
        .separator('-')
        .body_lr("Settlements", &summary.settlement_count.to_string())
        .body_lr("Credit collected", &summary.credit_collected.to_string());

    for (method, amount) in &summary.collections {
        b = b.body_lr(&format!("  {}", method), &amount.to_string());
    }

    b = b
        .separator('-')
        .body_lr("KOT items", &summary.kot_items.to_string())
        .body_lr("BOT items", &summary.bot_items.to_string())
        .separator('=')
        .font(TextStyle::BOLD)
        .line_lr("TOTAL RECEIVED", &summary.total_received().to_string())
        .font(TextStyle::NORMAL);

    b.feed(3).build()
}

// =============================================================================
// Settlement Receipt
// =============================================================================

/// Receipt for a committed settlement.
///
/// `customer` is the state AFTER the commit, so the remaining credit line
/// is what the customer still owes.
pub fn compose_settlement_receipt(
    customer: &Customer,
    payment: &PaymentRecord,
    layout: &Layout,
) -> PrintJob {
    let receipt_no: String = payment.id.chars().take(8).collect();

    let mut b = header(DocumentKind::SettlementReceipt, layout, "CREDIT SETTLEMENT")
        .line(format!("Receipt: {}", receipt_no))
        .line(format!("Customer: {}", customer.name))
        .line(format!("Date: {}", timestamp(payment.created_at)))
        .separator('-')
        .line("Applied to:");

    for line in payment.allocation.iter() {
        b = b.body_lr(&format!("  Order #{}", line.order_id), &line.amount_applied.to_string());
    }

    b = b
        .separator('-')
        .font(TextStyle::BOLD)
        .line_lr("SETTLED", &payment.amount.to_string())
        .font(TextStyle::NORMAL);

    for (method, amount) in split_totals_by_method(&payment.rows) {
        b = b.line_lr(&format!("  {}", method), &amount.to_string());
    }

    b = b.separator('-').line_lr("Remaining credit", &customer.credit_amount.to_string());

    footer(b, layout)
}

// =============================================================================
// Unit Tests
// =============================================================================

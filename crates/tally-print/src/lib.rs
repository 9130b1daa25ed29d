//! # tally-print: Bluetooth Printer Session for Tally POS
//!
//! Composes receipts, kitchen/bar tickets, statements and summaries, and
//! sends them over the device's single Bluetooth printer link.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Print Pipeline                                 │
//! │                                                                         │
//! │  Order / Customer / DailySummary (tally-core)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌────────────────┐                                                    │
//! │  │   compose      │  pure: data + Layout ──► PrintJob                  │
//! │  └───────┬────────┘                                                    │
//! │          ▼                                                              │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │ PrinterSession │──│ health         │  reconnect cap, health report  │
//! │  │  state machine │  └────────────────┘                                │
//! │  └───────┬────────┘                                                    │
//! │          ▼                                                              │
//! │  ┌────────────────┐      ┌────────────────┐                            │
//! │  │ Bluetooth-     │ ◄─── │ EscPosTransport│  for byte-only links       │
//! │  │ Transport      │      │ (escpos)       │                            │
//! │  └────────────────┘      └────────────────┘                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`session`] - `PrinterSession` state machine
//! - [`transport`] - `BluetoothTransport` contract and `Device`
//! - [`job`] - `PrintJob` and its primitives
//! - [`compose`] - Document composers
//! - [`escpos`] - ESC/POS byte encoding
//! - [`encoding`] - Printer code pages and column widths
//! - [`health`] - Reconnect counter and health report
//! - [`config`] - `printer.toml` loading
//! - [`error`] - Printer error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_print::{compose, PrinterConfig, PrinterSession};
//!
//! let config = PrinterConfig::load_or_default(None);
//! let session = PrinterSession::new(transport, config);
//! session.enable().await?;
//!
//! let devices = session.scan_devices().await?;
//! session.connect(&devices[0]).await?;
//!
//! let job = compose::compose_kot(&order, &session.config().layout());
//! if job.has_body() {
//!     session.transmit(&job).await?;
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod compose;
pub mod config;
pub mod encoding;
pub mod error;
pub mod escpos;
pub mod health;
pub mod job;
pub mod session;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use compose::Layout;
pub use config::PrinterConfig;
pub use encoding::CodePage;
pub use error::{DisconnectError, FailureKind, PrinterError, PrinterResult};
pub use health::ConnectionHealth;
pub use job::{Alignment, DocumentKind, FontSize, PrintCommand, PrintJob, TextStyle};
pub use session::{ConnectionState, PrinterSession};
pub use transport::{BluetoothTransport, Device};

//! # Bluetooth Transport
//!
//! The primitive operations a platform Bluetooth printer plugin provides.
//!
//! ## Layering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PrinterSession (session.rs)                                            │
//! │  ├── state machine, timeouts, busy rejection, reconnect cap            │
//! │  │                                                                      │
//! │  ▼                                                                      │
//! │  BluetoothTransport (THIS TRAIT)                                        │
//! │  ├── radio:    is_available, is_enabled, request_permissions           │
//! │  ├── link:     scan, connect, disconnect                               │
//! │  └── print:    init, align, write_text, feed                           │
//! │  │                                                                      │
//! │  ▼                                                                      │
//! │  Platform plugin (external)                                            │
//! │                                                                         │
//! │  Contract: while connected, primitives are delivered in the order      │
//! │  they were sent, or the call fails. Nothing else is assumed.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::PrinterResult;
use crate::job::{Alignment, TextStyle};

/// A printer found by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    /// Bluetooth MAC address, e.g. `"66:22:B3:4F:10:9A"`.
    pub address: String,
}

impl Device {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Device {
            name: name.into(),
            address: address.into(),
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Trait for Bluetooth printer transports.
///
/// Implementations report failures with the connectivity variants of
/// [`PrinterError`](crate::PrinterError); the session turns print-primitive
/// failures into `TransmitFailure` itself.
#[allow(async_fn_in_trait)]
pub trait BluetoothTransport {
    /// Whether this build has Bluetooth support at all.
    fn is_available(&self) -> bool;

    /// Whether the radio is switched on.
    async fn is_enabled(&mut self) -> PrinterResult<bool>;

    /// Prompts for (or checks) the platform permissions. `Ok(false)` means denied.
    async fn request_permissions(&mut self) -> PrinterResult<bool>;

    /// Lists nearby and paired printers.
    async fn scan(&mut self) -> PrinterResult<Vec<Device>>;

    /// Opens the link to `address`.
    async fn connect(&mut self, address: &str) -> PrinterResult<()>;

    /// Closes the current link.
    async fn disconnect(&mut self) -> PrinterResult<()>;

    /// Resets the printer (ESC @).
    async fn init(&mut self) -> PrinterResult<()>;

    async fn align(&mut self, alignment: Alignment) -> PrinterResult<()>;

    /// Prints one line of text in `style`.
    async fn write_text(&mut self, text: &str, style: TextStyle) -> PrinterResult<()>;

    /// Advances the paper `lines` lines.
    async fn feed(&mut self, lines: u8) -> PrinterResult<()>;
}

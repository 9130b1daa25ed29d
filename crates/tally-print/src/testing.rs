//! Scripted transport for tests.
//!
//! [`MockTransport`] is `Clone`; clones share one script and one call log,
//! so a test keeps a clone after moving the original into a session.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::error::{PrinterError, PrinterResult};
use crate::job::{Alignment, TextStyle};
use crate::transport::{BluetoothTransport, Device};

/// One call the session made on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    IsEnabled,
    RequestPermissions,
    Scan,
    Connect(String),
    Disconnect,
    Init,
    Align(Alignment),
    WriteText(String, TextStyle),
    Feed(u8),
}

impl TransportCall {
    /// True for init/align/write_text/feed.
    pub fn is_print_primitive(&self) -> bool {
        matches!(
            self,
            TransportCall::Init
                | TransportCall::Align(_)
                | TransportCall::WriteText(..)
                | TransportCall::Feed(_)
        )
    }
}

/// How a `connect` call behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectBehavior {
    Succeed,
    Fail(String),
    /// Never completes; exercises the session timeout.
    Hang,
}

#[derive(Debug)]
struct Script {
    available: bool,
    enabled: bool,
    permissions: bool,
    devices: Vec<Device>,
    connect_default: ConnectBehavior,
    connect_queue: VecDeque<ConnectBehavior>,
    fail_primitive_at: Option<usize>,
    primitive_count: usize,
    primitive_delay: Option<Duration>,
    disconnect_error: Option<String>,
    calls: Vec<TransportCall>,
}

impl Default for Script {
    fn default() -> Self {
        Script {
            available: true,
            enabled: true,
            permissions: true,
            devices: vec![Device::new("PT-210", "66:22:B3:4F:10:9A")],
            connect_default: ConnectBehavior::Succeed,
            connect_queue: VecDeque::new(),
            fail_primitive_at: None,
            primitive_count: 0,
            primitive_delay: None,
            disconnect_error: None,
            calls: Vec::new(),
        }
    }
}

/// A [`BluetoothTransport`] whose answers are scripted up front.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<Script>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // A panicking test thread may poison the lock; the log is still usable.
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Scripting
    // =========================================================================

    /// Reports no Bluetooth capability.
    pub fn unavailable(self) -> Self {
        self.script().available = false;
        self
    }

    /// Reports the radio as off.
    pub fn bluetooth_off(self) -> Self {
        self.script().enabled = false;
        self
    }

    /// Denies the permission prompt.
    pub fn deny_permissions(self) -> Self {
        self.script().permissions = false;
        self
    }

    pub fn with_devices(self, devices: Vec<Device>) -> Self {
        self.script().devices = devices;
        self
    }

    /// Behavior for every connect not covered by [`queue_connect`](Self::queue_connect).
    pub fn connect_behavior(self, behavior: ConnectBehavior) -> Self {
        self.script().connect_default = behavior;
        self
    }

    /// Behavior for the next connect only; queued behaviors run first-in first-out.
    pub fn queue_connect(self, behavior: ConnectBehavior) -> Self {
        self.script().connect_queue.push_back(behavior);
        self
    }

    /// Makes the `n`th print primitive (1-based, counted across jobs) fail.
    pub fn fail_primitive_at(self, n: usize) -> Self {
        self.script().fail_primitive_at = Some(n);
        self
    }

    /// Every print primitive waits this long before completing.
    pub fn primitive_delay(self, delay: Duration) -> Self {
        self.script().primitive_delay = Some(delay);
        self
    }

    pub fn fail_disconnect(self, reason: impl Into<String>) -> Self {
        self.script().disconnect_error = Some(reason.into());
        self
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<TransportCall> {
        self.script().calls.clone()
    }

    /// Print primitives attempted so far, including a failed one.
    pub fn primitive_calls(&self) -> Vec<TransportCall> {
        self.script()
            .calls
            .iter()
            .filter(|call| call.is_print_primitive())
            .cloned()
            .collect()
    }

    /// Lines passed to `write_text`, in order.
    pub fn printed_lines(&self) -> Vec<String> {
        self.script()
            .calls
            .iter()
            .filter_map(|call| match call {
                TransportCall::WriteText(text, _) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn connect_count(&self) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|call| matches!(call, TransportCall::Connect(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.script().calls.clear();
    }

    async fn primitive(&mut self, call: TransportCall) -> PrinterResult<()> {
        let delay = self.script().primitive_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = self.script();
        script.primitive_count += 1;
        script.calls.push(call);
        if script.fail_primitive_at == Some(script.primitive_count) {
            return Err(PrinterError::unreachable("66:22:B3:4F:10:9A", "link lost mid-write"));
        }
        Ok(())
    }
}

impl BluetoothTransport for MockTransport {
    fn is_available(&self) -> bool {
        self.script().available
    }

    async fn is_enabled(&mut self) -> PrinterResult<bool> {
        let mut script = self.script();
        script.calls.push(TransportCall::IsEnabled);
        Ok(script.enabled)
    }

    async fn request_permissions(&mut self) -> PrinterResult<bool> {
        let mut script = self.script();
        script.calls.push(TransportCall::RequestPermissions);
        Ok(script.permissions)
    }

    async fn scan(&mut self) -> PrinterResult<Vec<Device>> {
        let mut script = self.script();
        script.calls.push(TransportCall::Scan);
        Ok(script.devices.clone())
    }

    async fn connect(&mut self, address: &str) -> PrinterResult<()> {
        let behavior = {
            let mut script = self.script();
            script.calls.push(TransportCall::Connect(address.to_string()));
            script
                .connect_queue
                .pop_front()
                .unwrap_or_else(|| script.connect_default.clone())
        };

        match behavior {
            ConnectBehavior::Succeed => Ok(()),
            ConnectBehavior::Fail(reason) => Err(PrinterError::unreachable(address, reason)),
            ConnectBehavior::Hang => std::future::pending().await,
        }
    }

    async fn disconnect(&mut self) -> PrinterResult<()> {
        let mut script = self.script();
        script.calls.push(TransportCall::Disconnect);
        match &script.disconnect_error {
            Some(reason) => Err(PrinterError::unreachable("66:22:B3:4F:10:9A", reason.clone())),
            None => Ok(()),
        }
    }

    async fn init(&mut self) -> PrinterResult<()> {
        self.primitive(TransportCall::Init).await
    }

    async fn align(&mut self, alignment: Alignment) -> PrinterResult<()> {
        self.primitive(TransportCall::Align(alignment)).await
    }

    async fn write_text(&mut self, text: &str, style: TextStyle) -> PrinterResult<()> {
        self.primitive(TransportCall::WriteText(text.to_string(), style)).await
    }

    async fn feed(&mut self, lines: u8) -> PrinterResult<()> {
        self.primitive(TransportCall::Feed(lines)).await
    }
}

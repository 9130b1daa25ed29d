//! # Printer Session
//!
//! One logical Bluetooth printer link per device.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐  enable   ┌──────────────┐  connect  ┌────────────┐      │
//! │   │ Disabled │ ────────► │ Disconnected │ ────────► │ Connecting │      │
//! │   └──────────┘           └──────────────┘           └─────┬──────┘      │
//! │                             ▲   ▲    ▲                    │             │
//! │                  disconnect │   │    │ timeout            │ ok          │
//! │             transmit failure│   │    └────────────────────┤             │
//! │                             │   │                         ▼             │
//! │                             │   │ reset           ┌───────────┐         │
//! │                             │ ┌─┴──────────┐      │ Connected │         │
//! │                             │ │ Error(msg) │      └─────┬─────┘         │
//! │                             │ └────────────┘            │               │
//! │                             │       ▲ connect error     │               │
//! │                             └───────┼───────────────────┘               │
//! │                                     │                                   │
//! │                          (from Connecting)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exclusivity
//! The transport sits behind a `tokio::sync::Mutex`. `connect`, `transmit`,
//! `scan_devices` and `enable` take it with `try_lock`; a second caller gets
//! `SessionBusy` instead of queueing. `disconnect` waits for the lock.

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::config::PrinterConfig;
use crate::error::{DisconnectError, PrinterError, PrinterResult};
use crate::health::{ConnectionHealth, HealthInputs, ReconnectCounter};
use crate::job::{PrintCommand, PrintJob, TextStyle};
use crate::transport::{BluetoothTransport, Device};

// =============================================================================
// Connection State
// =============================================================================

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ConnectionState {
    /// `enable` has not succeeded yet.
    Disabled,
    Disconnected,
    Connecting,
    Connected,
    /// The last connect failed; recover with `reset` or a fresh `connect`.
    Error(String),
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disabled => write!(f, "disabled"),
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

#[derive(Debug)]
struct SessionStatus {
    state: ConnectionState,
    device: Option<Device>,
    last_device: Option<Device>,
    last_error: Option<String>,
    bluetooth_enabled: bool,
    counter: ReconnectCounter,
    /// The transport may still hold a link: set on every connect attempt,
    /// cleared only once `disconnect` has been issued to it.
    link_open: bool,
}

// =============================================================================
// Printer Session
// =============================================================================

/// A printer session over an injected transport.
pub struct PrinterSession<T> {
    link: Mutex<T>,
    status: RwLock<SessionStatus>,
    config: PrinterConfig,
}

impl<T: BluetoothTransport> PrinterSession<T> {
    /// Creates a disabled session. A printer saved in `config` becomes the
    /// `reconnect` target.
    pub fn new(transport: T, config: PrinterConfig) -> Self {
        let status = SessionStatus {
            state: ConnectionState::Disabled,
            device: None,
            last_device: config.saved_device(),
            last_error: None,
            bluetooth_enabled: false,
            counter: ReconnectCounter::new(config.printer.max_reconnect_attempts),
            link_open: false,
        };

        PrinterSession {
            link: Mutex::new(transport),
            status: RwLock::new(status),
            config,
        }
    }

    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    pub async fn state(&self) -> ConnectionState {
        self.status.read().await.state.clone()
    }

    /// The printer currently connected, if any.
    pub async fn current_device(&self) -> Option<Device> {
        self.status.read().await.device.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.status.read().await.last_error.clone()
    }

    pub async fn reconnect_attempts(&self) -> u32 {
        self.status.read().await.counter.attempts()
    }

    fn try_link(&self) -> PrinterResult<MutexGuard<'_, T>> {
        self.link.try_lock().map_err(|_| PrinterError::SessionBusy)
    }

    async fn require_enabled(&self) -> PrinterResult<()> {
        if self.status.read().await.state == ConnectionState::Disabled {
            return Err(PrinterError::SessionDisabled);
        }
        Ok(())
    }

    // =========================================================================
    // Enable / Scan
    // =========================================================================

    /// Checks module availability, the radio and permissions, in that order.
    ///
    /// On success a `Disabled` session becomes `Disconnected`. On failure the
    /// state is left alone and the error is recorded.
    #[instrument(skip(self))]
    pub async fn enable(&self) -> PrinterResult<()> {
        let mut link = self.try_link()?;
        let (radio_on, result) = readiness(&mut *link).await;

        let mut status = self.status.write().await;
        status.bluetooth_enabled = radio_on;

        match result {
            Ok(()) => {
                if status.state == ConnectionState::Disabled {
                    status.state = ConnectionState::Disconnected;
                }
                status.last_error = None;
                info!("Printer session enabled");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, kind = %e.kind(), "Printer session could not be enabled");
                status.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Lists nearby printers.
    #[instrument(skip(self))]
    pub async fn scan_devices(&self) -> PrinterResult<Vec<Device>> {
        self.require_enabled().await?;
        let mut link = self.try_link()?;

        match link.scan().await {
            Ok(devices) => {
                debug!(count = devices.len(), "Scan complete");
                Ok(devices)
            }
            Err(e) => {
                warn!(error = %e, "Scan failed");
                self.status.write().await.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    // =========================================================================
    // Connect / Disconnect
    // =========================================================================

    /// Connects to `device`, dropping any existing link first.
    ///
    /// A link left behind by an aborted transmit or a failed connect is
    /// dropped too, so the transport never holds two. A timeout leaves the
    /// session `Disconnected`; any other failure leaves it in `Error`. Both
    /// count against the reconnect cap.
    #[instrument(skip(self, device), fields(address = %device.address))]
    pub async fn connect(&self, device: &Device) -> PrinterResult<()> {
        self.require_enabled().await?;
        let mut link = self.try_link()?;

        let stale_link = {
            let mut status = self.status.write().await;
            status.state = ConnectionState::Connecting;
            status.device = None;
            status.last_device = Some(device.clone());
            std::mem::replace(&mut status.link_open, true)
        };

        if stale_link {
            if let Err(e) = link.disconnect().await {
                warn!(error = %e, "Dropping previous link failed, connecting anyway");
            }
        }

        let wait = self.config.connect_timeout();
        let result = match timeout(wait, link.connect(&device.address)).await {
            Ok(result) => result,
            Err(_) => Err(PrinterError::ConnectionTimeout {
                address: device.address.clone(),
                secs: wait.as_secs(),
            }),
        };

        let mut status = self.status.write().await;
        match result {
            Ok(()) => {
                status.state = ConnectionState::Connected;
                status.device = Some(device.clone());
                status.last_error = None;
                status.counter.record_success();
                info!(device = %device, "Printer connected");
                Ok(())
            }
            Err(e) => {
                status.counter.record_failure();
                status.last_error = Some(e.to_string());
                status.state = match e {
                    PrinterError::ConnectionTimeout { .. } => ConnectionState::Disconnected,
                    _ => ConnectionState::Error(e.to_string()),
                };
                warn!(
                    error = %e,
                    attempts = status.counter.attempts(),
                    "Printer connect failed"
                );
                Err(e)
            }
        }
    }

    /// Closes the link. The session ends `Disconnected` whether or not the
    /// transport reported an error.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) -> Result<(), DisconnectError> {
        let mut link = self.link.lock().await;

        let address = {
            let status = self.status.read().await;
            if status.state == ConnectionState::Disabled {
                return Ok(());
            }
            status
                .device
                .as_ref()
                .or(status.last_device.as_ref())
                .map(|d| d.address.clone())
                .unwrap_or_default()
        };

        let result = link.disconnect().await;

        let mut status = self.status.write().await;
        status.state = ConnectionState::Disconnected;
        status.device = None;
        status.link_open = false;

        match result {
            Ok(()) => {
                info!("Printer disconnected");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Printer disconnect reported an error");
                Err(DisconnectError {
                    address,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Clears an `Error` state back to `Disconnected`.
    pub async fn reset(&self) {
        let mut status = self.status.write().await;
        if matches!(status.state, ConnectionState::Error(_)) {
            status.state = ConnectionState::Disconnected;
            status.last_error = None;
            debug!("Printer session reset");
        }
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Sends every primitive of `job` in order.
    ///
    /// The first failing primitive aborts the rest; the session drops to
    /// `Disconnected` and the document must be treated as not printed.
    #[instrument(skip(self, job), fields(kind = %job.kind(), commands = job.len()))]
    pub async fn transmit(&self, job: &PrintJob) -> PrinterResult<()> {
        let mut link = self.try_link()?;

        {
            let status = self.status.read().await;
            if status.state != ConnectionState::Connected {
                return Err(PrinterError::NotConnected {
                    state: status.state.to_string(),
                });
            }
        }

        let mut style = TextStyle::NORMAL;
        for (index, command) in job.commands().iter().enumerate() {
            let result = match command {
                PrintCommand::Init => {
                    style = TextStyle::NORMAL;
                    link.init().await
                }
                PrintCommand::Align(alignment) => link.align(*alignment).await,
                PrintCommand::SetFont(next) => {
                    style = *next;
                    Ok(())
                }
                PrintCommand::WriteText(text) => link.write_text(text, style).await,
                PrintCommand::Feed(lines) => link.feed(*lines).await,
            };

            if let Err(e) = result {
                let failure = PrinterError::TransmitFailure {
                    step: index + 1,
                    command: command.name().to_string(),
                    reason: e.to_string(),
                };
                let mut status = self.status.write().await;
                status.state = ConnectionState::Disconnected;
                status.device = None;
                status.last_error = Some(failure.to_string());
                warn!(error = %failure, "Print job aborted");
                return Err(failure);
            }
        }

        debug!("Print job sent");
        Ok(())
    }

    // =========================================================================
    // Reconnect / Health
    // =========================================================================

    /// Retries the last device with exponential backoff until it connects,
    /// a non-link error occurs, or the reconnect cap is reached.
    #[instrument(skip(self))]
    pub async fn reconnect(&self) -> PrinterResult<()> {
        let device = {
            let status = self.status.read().await;
            if status.counter.is_exhausted() {
                return Err(PrinterError::ReconnectLimit {
                    attempts: status.counter.attempts(),
                });
            }
            status.last_device.clone().ok_or(PrinterError::NoDevice)?
        };

        let mut backoff = self.create_backoff();
        loop {
            match self.connect(&device).await {
                Ok(()) => return Ok(()),
                Err(
                    e @ (PrinterError::DeviceUnreachable { .. }
                    | PrinterError::ConnectionTimeout { .. }),
                ) => {
                    let counter = self.status.read().await.counter;
                    if counter.is_exhausted() {
                        warn!(attempts = counter.attempts(), error = %e, "Giving up on reconnect");
                        return Err(PrinterError::ReconnectLimit {
                            attempts: counter.attempts(),
                        });
                    }

                    let wait = backoff
                        .next_backoff()
                        .unwrap_or_else(|| self.config.max_backoff());
                    debug!(?wait, attempt = counter.attempts(), "Waiting before reconnect");
                    tokio::time::sleep(wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Re-arms `reconnect` after the cap was reached.
    pub async fn reset_reconnect_attempts(&self) {
        self.status.write().await.counter.reset();
    }

    /// Advisory health report; never gates a transmit.
    pub async fn connection_health(&self) -> ConnectionHealth {
        let status = self.status.read().await;
        ConnectionHealth::assess(&HealthInputs {
            bluetooth_enabled: status.bluetooth_enabled,
            connected: status.state == ConnectionState::Connected,
            last_error: status.last_error.clone(),
            reconnect_attempts: status.counter.attempts(),
            reconnect_cap: status.counter.cap(),
        })
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.config.initial_backoff(),
            max_interval: self.config.max_backoff(),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Radio state and the outcome of the enable checks.
async fn readiness<T: BluetoothTransport>(link: &mut T) -> (bool, PrinterResult<()>) {
    if !link.is_available() {
        return (false, Err(PrinterError::ModuleUnavailable));
    }

    match link.is_enabled().await {
        Ok(true) => {}
        Ok(false) => return (false, Err(PrinterError::BluetoothDisabled)),
        Err(e) => return (false, Err(e)),
    }

    match link.request_permissions().await {
        Ok(true) => (true, Ok(())),
        Ok(false) => (true, Err(PrinterError::PermissionDenied)),
        Err(e) => (true, Err(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Alignment, DocumentKind};
    use crate::testing::{ConnectBehavior, MockTransport, TransportCall};
    use std::time::Duration;

    fn printer() -> Device {
        Device::new("PT-210", "66:22:B3:4F:10:9A")
    }

    async fn connected(mock: MockTransport) -> PrinterSession<MockTransport> {
        let session = PrinterSession::new(mock, PrinterConfig::default());
        session.enable().await.unwrap();
        session.connect(&printer()).await.unwrap();
        session
    }

    fn five_step_job() -> PrintJob {
        PrintJob::from_commands(
            DocumentKind::Receipt,
            vec![
                PrintCommand::Init,
                PrintCommand::Align(Alignment::Center),
                PrintCommand::WriteText("Table 4".into()),
                PrintCommand::WriteText("Total 40.00".into()),
                PrintCommand::Feed(3),
            ],
        )
    }

    #[tokio::test]
    async fn test_new_session_is_disabled() {
        let session = PrinterSession::new(MockTransport::new(), PrinterConfig::default());
        assert_eq!(session.state().await, ConnectionState::Disabled);
        assert!(session.current_device().await.is_none());

        let err = session.scan_devices().await.unwrap_err();
        assert!(matches!(err, PrinterError::SessionDisabled));
        let err = session.connect(&printer()).await.unwrap_err();
        assert!(matches!(err, PrinterError::SessionDisabled));
    }

    #[tokio::test]
    async fn test_enable_failures_are_classified() {
        let session = PrinterSession::new(MockTransport::new().unavailable(), PrinterConfig::default());
        assert!(matches!(session.enable().await, Err(PrinterError::ModuleUnavailable)));
        assert_eq!(session.state().await, ConnectionState::Disabled);

        let session = PrinterSession::new(MockTransport::new().bluetooth_off(), PrinterConfig::default());
        assert!(matches!(session.enable().await, Err(PrinterError::BluetoothDisabled)));
        assert!(session.last_error().await.is_some());

        let mock = MockTransport::new().deny_permissions();
        let session = PrinterSession::new(mock.clone(), PrinterConfig::default());
        assert!(matches!(session.enable().await, Err(PrinterError::PermissionDenied)));
        assert_eq!(
            mock.calls(),
            vec![TransportCall::IsEnabled, TransportCall::RequestPermissions]
        );
    }

    #[tokio::test]
    async fn test_enable_scan_connect() {
        let mock = MockTransport::new();
        let session = PrinterSession::new(mock.clone(), PrinterConfig::default());
        session.enable().await.unwrap();
        assert_eq!(session.state().await, ConnectionState::Disconnected);

        let devices = session.scan_devices().await.unwrap();
        assert_eq!(devices, vec![printer()]);

        session.connect(&devices[0]).await.unwrap();
        assert_eq!(session.state().await, ConnectionState::Connected);
        assert_eq!(session.current_device().await, Some(printer()));
        assert!(session.connection_health().await.healthy);
    }

    #[tokio::test]
    async fn test_connect_replaces_existing_link() {
        let mock = MockTransport::new();
        let session = connected(mock.clone()).await;
        mock.clear_calls();

        let other = Device::new("Kitchen", "11:22:33:44:55:66");
        session.connect(&other).await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                TransportCall::Disconnect,
                TransportCall::Connect("11:22:33:44:55:66".into())
            ]
        );
        assert_eq!(session.current_device().await, Some(other));
    }

    #[tokio::test]
    async fn test_transmit_sends_primitives_in_order() {
        let mock = MockTransport::new();
        let session = connected(mock.clone()).await;

        let job = PrintJob::from_commands(
            DocumentKind::Kot,
            vec![
                PrintCommand::Init,
                PrintCommand::SetFont(TextStyle::BOLD),
                PrintCommand::WriteText("KOT".into()),
                PrintCommand::SetFont(TextStyle::NORMAL),
                PrintCommand::WriteText("2 x Momo".into()),
            ],
        );
        session.transmit(&job).await.unwrap();

        assert_eq!(
            mock.primitive_calls(),
            vec![
                TransportCall::Init,
                TransportCall::WriteText("KOT".into(), TextStyle::BOLD),
                TransportCall::WriteText("2 x Momo".into(), TextStyle::NORMAL),
            ]
        );
        assert_eq!(session.state().await, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_transmit_failure_aborts_and_disconnects() {
        let mock = MockTransport::new().fail_primitive_at(3);
        let session = connected(mock.clone()).await;

        let err = session.transmit(&five_step_job()).await.unwrap_err();
        match err {
            PrinterError::TransmitFailure { step, ref command, .. } => {
                assert_eq!(step, 3);
                assert_eq!(command, "write_text");
            }
            other => panic!("unexpected error: {other}"),
        }

        // Primitives 4 and 5 were never sent.
        assert_eq!(mock.primitive_calls().len(), 3);
        assert_eq!(session.state().await, ConnectionState::Disconnected);
        assert!(session.current_device().await.is_none());

        let err = session.transmit(&five_step_job()).await.unwrap_err();
        assert!(matches!(err, PrinterError::NotConnected { .. }));
    }

    #[tokio::test]
    async fn test_connect_after_aborted_transmit_drops_old_link() {
        let mock = MockTransport::new().fail_primitive_at(2);
        let session = connected(mock.clone()).await;
        session.transmit(&five_step_job()).await.unwrap_err();
        mock.clear_calls();

        session.connect(&Device::new("Bar", "11:22:33:44:55:66")).await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                TransportCall::Disconnect,
                TransportCall::Connect("11:22:33:44:55:66".into())
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_after_timeout_drops_half_open_link() {
        let mock = MockTransport::new().queue_connect(ConnectBehavior::Hang);
        let session = PrinterSession::new(mock.clone(), PrinterConfig::default());
        session.enable().await.unwrap();
        session.connect(&printer()).await.unwrap_err();
        mock.clear_calls();

        session.connect(&printer()).await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                TransportCall::Disconnect,
                TransportCall::Connect("66:22:B3:4F:10:9A".into())
            ]
        );
    }

    #[tokio::test]
    async fn test_connect_after_disconnect_opens_one_link() {
        let mock = MockTransport::new();
        let session = connected(mock.clone()).await;
        session.disconnect().await.unwrap();
        mock.clear_calls();

        session.connect(&printer()).await.unwrap();

        assert_eq!(mock.calls(), vec![TransportCall::Connect("66:22:B3:4F:10:9A".into())]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout_leaves_disconnected() {
        let mock = MockTransport::new().connect_behavior(ConnectBehavior::Hang);
        let session = PrinterSession::new(mock, PrinterConfig::default());
        session.enable().await.unwrap();

        let err = session.connect(&printer()).await.unwrap_err();
        assert!(matches!(err, PrinterError::ConnectionTimeout { secs: 15, .. }));
        assert_eq!(session.state().await, ConnectionState::Disconnected);
        assert_eq!(session.reconnect_attempts().await, 1);
    }

    #[tokio::test]
    async fn test_connect_error_then_reset() {
        let mock = MockTransport::new().queue_connect(ConnectBehavior::Fail("out of range".into()));
        let session = PrinterSession::new(mock, PrinterConfig::default());
        session.enable().await.unwrap();

        let err = session.connect(&printer()).await.unwrap_err();
        assert!(matches!(err, PrinterError::DeviceUnreachable { .. }));
        assert!(matches!(session.state().await, ConnectionState::Error(_)));

        let health = session.connection_health().await;
        assert!(!health.healthy);
        assert!(health.issues.contains(&"Reconnect attempts: 1/3".to_string()));

        session.reset().await;
        assert_eq!(session.state().await, ConnectionState::Disconnected);
        assert!(session.last_error().await.is_none());

        session.connect(&printer()).await.unwrap();
        assert_eq!(session.reconnect_attempts().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_transmit_is_rejected() {
        let mock = MockTransport::new().primitive_delay(Duration::from_millis(50));
        let session = connected(mock.clone()).await;
        let job = five_step_job();

        let (first, second) = tokio::join!(session.transmit(&job), session.transmit(&job));

        assert!(first.is_ok());
        assert!(matches!(second, Err(PrinterError::SessionBusy)));
        assert_eq!(mock.primitive_calls().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_during_transmit_is_rejected() {
        let mock = MockTransport::new().primitive_delay(Duration::from_millis(50));
        let session = connected(mock).await;
        let job = five_step_job();

        let device = printer();

        let (sent, connect) = tokio::join!(session.transmit(&job), session.connect(&device));
        assert!(sent.is_ok());
        assert!(matches!(connect, Err(PrinterError::SessionBusy)));
    }

    #[tokio::test]
    async fn test_disconnect_error_still_disconnects() {
        let mock = MockTransport::new().fail_disconnect("socket already closed");
        let session = connected(mock).await;

        let err = session.disconnect().await.unwrap_err();
        assert_eq!(err.address, "66:22:B3:4F:10:9A");
        assert!(err.reason.contains("socket already closed"));
        assert_eq!(session.state().await, ConnectionState::Disconnected);
        assert!(session.current_device().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_stops_at_cap() {
        let mock = MockTransport::new().connect_behavior(ConnectBehavior::Fail("out of range".into()));
        let session = PrinterSession::new(mock.clone(), PrinterConfig::default());
        session.enable().await.unwrap();
        let _ = session.connect(&printer()).await;

        let err = session.reconnect().await.unwrap_err();
        assert!(matches!(err, PrinterError::ReconnectLimit { attempts: 3 }));
        assert_eq!(mock.connect_count(), 3);

        // Exhausted: no further transport calls until re-armed.
        let err = session.reconnect().await.unwrap_err();
        assert!(matches!(err, PrinterError::ReconnectLimit { .. }));
        assert_eq!(mock.connect_count(), 3);
        assert_eq!(session.reconnect_attempts().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_after_reset_succeeds() {
        let mock = MockTransport::new()
            .queue_connect(ConnectBehavior::Fail("out of range".into()))
            .queue_connect(ConnectBehavior::Fail("out of range".into()))
            .queue_connect(ConnectBehavior::Fail("out of range".into()));
        let session = PrinterSession::new(mock.clone(), PrinterConfig::default());
        session.enable().await.unwrap();
        let _ = session.connect(&printer()).await;
        assert!(session.reconnect().await.is_err());

        session.reset_reconnect_attempts().await;
        session.reconnect().await.unwrap();
        assert_eq!(session.state().await, ConnectionState::Connected);
        assert_eq!(session.reconnect_attempts().await, 0);
        assert_eq!(mock.connect_count(), 4);
    }

    #[tokio::test]
    async fn test_reconnect_without_device() {
        let session = PrinterSession::new(MockTransport::new(), PrinterConfig::default());
        session.enable().await.unwrap();
        assert!(matches!(session.reconnect().await, Err(PrinterError::NoDevice)));
    }

    #[tokio::test]
    async fn test_saved_device_is_reconnect_target() {
        let mut config = PrinterConfig::default();
        config.printer.address = Some("AA:BB:CC:DD:EE:FF".into());
        let mock = MockTransport::new();
        let session = PrinterSession::new(mock.clone(), config);
        session.enable().await.unwrap();

        session.reconnect().await.unwrap();
        assert_eq!(
            mock.calls().last(),
            Some(&TransportCall::Connect("AA:BB:CC:DD:EE:FF".into()))
        );
    }
}

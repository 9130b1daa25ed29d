//! # Printer Error Types
//!
//! Error types for the Bluetooth printer session.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Printer Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Connectivity   │  │  Transmission   │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  ModuleUnavail. │  │  TransmitFailure│  │  InvalidConfig          │ │
//! │  │  BluetoothDisab.│  │  SessionBusy    │  │  ConfigLoadFailed       │ │
//! │  │  PermissionDen. │  │  NotConnected   │  │  ConfigSaveFailed       │ │
//! │  │  DeviceUnreach. │  │                 │  │                         │ │
//! │  │  ConnectionTime.│  │                 │  │                         │ │
//! │  │  ReconnectLimit │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Transmission errors always surface AFTER a settlement has committed:  │
//! │  "settlement succeeded; printing failed, retry printing separately"    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;

/// Result type alias for printer operations.
pub type PrinterResult<T> = Result<T, PrinterError>;

// =============================================================================
// Failure Kind
// =============================================================================

/// Stable classification of a printer failure, for UI routing and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ModuleUnavailable,
    BluetoothDisabled,
    PermissionDenied,
    DeviceUnreachable,
    ConnectionTimeout,
    TransmitFailure,
    SessionBusy,
    SessionDisabled,
    NotConnected,
    ReconnectLimit,
    Configuration,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::ModuleUnavailable => "module_unavailable",
            FailureKind::BluetoothDisabled => "bluetooth_disabled",
            FailureKind::PermissionDenied => "permission_denied",
            FailureKind::DeviceUnreachable => "device_unreachable",
            FailureKind::ConnectionTimeout => "connection_timeout",
            FailureKind::TransmitFailure => "transmit_failure",
            FailureKind::SessionBusy => "session_busy",
            FailureKind::SessionDisabled => "session_disabled",
            FailureKind::NotConnected => "not_connected",
            FailureKind::ReconnectLimit => "reconnect_limit",
            FailureKind::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Printer Error
// =============================================================================

/// Printer session error covering every connectivity and transmission failure.
#[derive(Debug, Error)]
pub enum PrinterError {
    // =========================================================================
    // Connectivity Errors
    // =========================================================================
    /// This platform build has no Bluetooth capability.
    #[error("Bluetooth printing is not available on this device")]
    ModuleUnavailable,

    /// The Bluetooth radio is switched off.
    #[error("Bluetooth is turned off")]
    BluetoothDisabled,

    /// The user declined the Bluetooth/location permission prompt.
    #[error("Bluetooth permission was denied")]
    PermissionDenied,

    /// Scan or connect could not reach the device.
    #[error("Printer {address} is unreachable: {reason}")]
    DeviceUnreachable { address: String, reason: String },

    /// `connect` did not finish within the configured timeout.
    #[error("Connecting to {address} timed out after {secs} seconds")]
    ConnectionTimeout { address: String, secs: u64 },

    /// The capped reconnect counter is exhausted.
    #[error("Gave up reconnecting after {attempts} attempts")]
    ReconnectLimit { attempts: u32 },

    // =========================================================================
    // Transmission Errors
    // =========================================================================
    /// A primitive failed mid-job. The document must be treated as not printed.
    #[error("Print failed at step {step} ({command}): {reason}")]
    TransmitFailure {
        step: usize,
        command: String,
        reason: String,
    },

    /// Another job or connect is in flight on this session.
    #[error("Printer is busy with another job")]
    SessionBusy,

    /// The session has not been enabled yet.
    #[error("Printer session is not enabled")]
    SessionDisabled,

    /// The session is not connected to a printer.
    #[error("Printer is not connected (state: {state})")]
    NotConnected { state: String },

    /// Reconnect was requested but no printer was ever selected.
    #[error("No printer has been selected")]
    NoDevice,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid printer configuration.
    #[error("Invalid printer configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load printer config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save printer config: {0}")]
    ConfigSaveFailed(String),
}

impl PrinterError {
    /// Creates a DeviceUnreachable error.
    pub fn unreachable(address: impl Into<String>, reason: impl Into<String>) -> Self {
        PrinterError::DeviceUnreachable {
            address: address.into(),
            reason: reason.into(),
        }
    }

    /// Classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            PrinterError::ModuleUnavailable => FailureKind::ModuleUnavailable,
            PrinterError::BluetoothDisabled => FailureKind::BluetoothDisabled,
            PrinterError::PermissionDenied => FailureKind::PermissionDenied,
            PrinterError::DeviceUnreachable { .. } | PrinterError::NoDevice => {
                FailureKind::DeviceUnreachable
            }
            PrinterError::ConnectionTimeout { .. } => FailureKind::ConnectionTimeout,
            PrinterError::ReconnectLimit { .. } => FailureKind::ReconnectLimit,
            PrinterError::TransmitFailure { .. } => FailureKind::TransmitFailure,
            PrinterError::SessionBusy => FailureKind::SessionBusy,
            PrinterError::SessionDisabled => FailureKind::SessionDisabled,
            PrinterError::NotConnected { .. } => FailureKind::NotConnected,
            PrinterError::InvalidConfig(_)
            | PrinterError::ConfigLoadFailed(_)
            | PrinterError::ConfigSaveFailed(_) => FailureKind::Configuration,
        }
    }

    /// What the user should do about it.
    pub fn remedy(&self) -> &'static str {
        match self.kind() {
            FailureKind::ModuleUnavailable => {
                "This build cannot print over Bluetooth. Use a device with Bluetooth support."
            }
            FailureKind::BluetoothDisabled => "Turn on Bluetooth and try again.",
            FailureKind::PermissionDenied => {
                "Allow Bluetooth access for the app in system settings, then try again."
            }
            FailureKind::DeviceUnreachable => {
                "Make sure the printer is powered on, paired and within range, then reconnect."
            }
            FailureKind::ConnectionTimeout => {
                "The printer did not answer. Move closer or restart the printer, then reconnect."
            }
            FailureKind::TransmitFailure => {
                "The document was not printed. Reconnect the printer and reprint."
            }
            FailureKind::SessionBusy => "Wait for the current print to finish, then try again.",
            FailureKind::SessionDisabled => "Enable the printer in settings first.",
            FailureKind::NotConnected => "Connect to a printer first.",
            FailureKind::ReconnectLimit => {
                "Automatic reconnect stopped. Check the printer, then connect manually."
            }
            FailureKind::Configuration => "Check the printer settings file.",
        }
    }

    /// Returns true if retrying the same operation may succeed.
    ///
    /// ## Retryable Errors
    /// - Unreachable devices, timeouts (radio conditions change)
    /// - Busy sessions
    ///
    /// ## Non-Retryable Errors
    /// - Missing capability, disabled radio, denied permission
    /// - Configuration errors
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PrinterError::DeviceUnreachable { .. }
                | PrinterError::ConnectionTimeout { .. }
                | PrinterError::SessionBusy
        )
    }

    /// Returns true for failures of the Bluetooth link itself.
    pub fn is_connectivity_error(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::ModuleUnavailable
                | FailureKind::BluetoothDisabled
                | FailureKind::PermissionDenied
                | FailureKind::DeviceUnreachable
                | FailureKind::ConnectionTimeout
                | FailureKind::ReconnectLimit
        )
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for PrinterError {
    fn from(err: std::io::Error) -> Self {
        PrinterError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for PrinterError {
    fn from(err: toml::de::Error) -> Self {
        PrinterError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for PrinterError {
    fn from(err: toml::ser::Error) -> Self {
        PrinterError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Disconnect Error
// =============================================================================

/// A disconnect that did not complete cleanly.
///
/// The session is `Disconnected` either way; callers decide whether the
/// failure matters to them.
#[derive(Debug, Error)]
#[error("Disconnect from {address} failed: {reason}")]
pub struct DisconnectError {
    pub address: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PrinterError::unreachable("AA:BB", "out of range").is_retryable());
        assert!(PrinterError::ConnectionTimeout {
            address: "AA:BB".into(),
            secs: 15
        }
        .is_retryable());
        assert!(PrinterError::SessionBusy.is_retryable());

        assert!(!PrinterError::PermissionDenied.is_retryable());
        assert!(!PrinterError::ModuleUnavailable.is_retryable());
        assert!(!PrinterError::InvalidConfig("paper_width".into()).is_retryable());
    }

    #[test]
    fn test_every_kind_has_a_remedy() {
        let errors = [
            PrinterError::ModuleUnavailable,
            PrinterError::BluetoothDisabled,
            PrinterError::PermissionDenied,
            PrinterError::unreachable("AA:BB", "x"),
            PrinterError::ConnectionTimeout {
                address: "AA:BB".into(),
                secs: 15,
            },
            PrinterError::ReconnectLimit { attempts: 3 },
            PrinterError::TransmitFailure {
                step: 3,
                command: "write_text".into(),
                reason: "broken pipe".into(),
            },
            PrinterError::SessionBusy,
            PrinterError::SessionDisabled,
            PrinterError::NotConnected {
                state: "disconnected".into(),
            },
            PrinterError::NoDevice,
            PrinterError::InvalidConfig("x".into()),
        ];
        for err in &errors {
            assert!(!err.remedy().is_empty(), "{err}");
        }
    }

    #[test]
    fn test_kind_classification() {
        let err = PrinterError::TransmitFailure {
            step: 3,
            command: "write_text".into(),
            reason: "broken pipe".into(),
        };
        assert_eq!(err.kind(), FailureKind::TransmitFailure);
        assert_eq!(err.to_string(), "Print failed at step 3 (write_text): broken pipe");
        assert!(!err.is_connectivity_error());

        assert!(PrinterError::BluetoothDisabled.is_connectivity_error());
        assert_eq!(FailureKind::SessionBusy.to_string(), "session_busy");
    }
}

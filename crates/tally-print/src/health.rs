//! # Connection Health
//!
//! Reconnect bookkeeping and the advisory health report.
//!
//! ## Reconnect Counter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  cap = 3                                                                │
//! │                                                                         │
//! │  connect fails  ──► attempts 1                                          │
//! │  connect fails  ──► attempts 2                                          │
//! │  connect fails  ──► attempts 3   (reconnect() now refuses)              │
//! │  connect fails  ──► attempts 3   (saturates)                            │
//! │  connect works  ──► attempts 0                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The report never gates a transmit; `transmit` re-checks the state itself.

use serde::Serialize;

/// Consecutive failed connects, capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectCounter {
    attempts: u32,
    cap: u32,
}

impl ReconnectCounter {
    pub fn new(cap: u32) -> Self {
        ReconnectCounter { attempts: 0, cap }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    /// Counts a failed connect. Never exceeds the cap.
    pub fn record_failure(&mut self) {
        self.attempts = (self.attempts + 1).min(self.cap);
    }

    pub fn record_success(&mut self) {
        self.attempts = 0;
    }

    /// Alias of [`record_success`](Self::record_success) for manual re-arming.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.cap
    }
}

/// Inputs to the health report, copied out of the session.
#[derive(Debug, Clone, Default)]
pub struct HealthInputs {
    pub bluetooth_enabled: bool,
    pub connected: bool,
    pub last_error: Option<String>,
    pub reconnect_attempts: u32,
    pub reconnect_cap: u32,
}

/// Diagnostic summary of the printer link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionHealth {
    pub healthy: bool,
    pub issues: Vec<String>,
}

impl ConnectionHealth {
    /// Healthy iff Bluetooth is enabled, the link is connected, no error is
    /// stored and no reconnect attempts are pending. Every failed condition
    /// contributes one issue.
    pub fn assess(inputs: &HealthInputs) -> Self {
        let mut issues = Vec::new();

        if !inputs.bluetooth_enabled {
            issues.push("Bluetooth is not enabled".to_string());
        }
        if !inputs.connected {
            issues.push("Printer is not connected".to_string());
        }
        if let Some(error) = &inputs.last_error {
            issues.push(format!("Last error: {}", error));
        }
        if inputs.reconnect_attempts > 0 {
            issues.push(format!(
                "Reconnect attempts: {}/{}",
                inputs.reconnect_attempts, inputs.reconnect_cap
            ));
        }

        ConnectionHealth {
            healthy: issues.is_empty(),
            issues,
        }
    }
}

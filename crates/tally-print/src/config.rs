//! # Printer Configuration
//!
//! Configuration for the printer session and document layout.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TALLY_PRINTER_ADDRESS=66:22:B3:4F:10:9A                            │
//! │     TALLY_PAPER_WIDTH=48                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tally-pos/printer.toml (Linux)                           │
//! │     ~/Library/Application Support/com.tally.pos/printer.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     58mm paper, 15 s connect timeout, 3 reconnect attempts             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # printer.toml
//! [printer]
//! address = "66:22:B3:4F:10:9A"
//! name = "Counter PT-210"
//! connect_timeout_secs = 15
//! max_reconnect_attempts = 3
//!
//! [receipt]
//! business_name = "Himalayan Kitchen"
//! paper_width = 32
//! code_page = "wpc1252"   # or "cp866", "gbk"
//! footer = "Thank you, visit again!"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::compose::Layout;
use crate::encoding::CodePage;
use crate::error::{PrinterError, PrinterResult};
use crate::transport::Device;

// =============================================================================
// Printer Settings
// =============================================================================

/// Link and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterSettings {
    /// Address of the last-used printer, reconnected on startup.
    #[serde(default)]
    pub address: Option<String>,

    /// Display name of that printer.
    #[serde(default)]
    pub name: Option<String>,

    /// Connect timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Cap on consecutive failed connects before reconnect gives up.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Initial backoff between reconnect attempts (milliseconds).
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff between reconnect attempts (seconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
}

fn default_connect_timeout() -> u64 {
    15
}
fn default_max_reconnect_attempts() -> u32 {
    3
}
fn default_initial_backoff() -> u64 {
    500
}
fn default_max_backoff() -> u64 {
    8
}

impl Default for PrinterSettings {
    fn default() -> Self {
        PrinterSettings {
            address: None,
            name: None,
            connect_timeout_secs: default_connect_timeout(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_secs: default_max_backoff(),
        }
    }
}

// =============================================================================
// Receipt Settings
// =============================================================================

/// Layout settings shared by every composed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptSettings {
    /// Printed at the top of customer-facing documents.
    #[serde(default = "default_business_name")]
    pub business_name: String,

    /// Characters per line: 32 for 58mm paper, 48 for 80mm.
    #[serde(default = "default_paper_width")]
    pub paper_width: usize,

    /// Character table the printer is switched to; widths are counted in it.
    #[serde(default)]
    pub code_page: CodePage,

    /// Optional closing line on receipts.
    #[serde(default)]
    pub footer: Option<String>,
}

fn default_business_name() -> String {
    "Tally POS".to_string()
}

fn default_paper_width() -> usize {
    32
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        ReceiptSettings {
            business_name: default_business_name(),
            paper_width: default_paper_width(),
            code_page: CodePage::default(),
            footer: None,
        }
    }
}

// =============================================================================
// Main Printer Configuration
// =============================================================================

/// Complete printer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrinterConfig {
    #[serde(default)]
    pub printer: PrinterSettings,

    #[serde(default)]
    pub receipt: ReceiptSettings,
}

impl PrinterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `printer.toml` (or `config_path`) over the defaults, then
    /// applies `TALLY_*` overrides and rejects unusable values.
    pub fn load(config_path: Option<PathBuf>) -> PrinterResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading printer config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Like [`load`](Self::load), but a broken file never blocks printing.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load printer config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Writes the file back, e.g. after the cashier picks a new printer.
    pub fn save(&self, config_path: Option<PathBuf>) -> PrinterResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| PrinterError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Printer config saved");
        Ok(())
    }

    pub fn validate(&self) -> PrinterResult<()> {
        if self.printer.connect_timeout_secs == 0 {
            return Err(PrinterError::InvalidConfig(
                "connect_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.printer.max_reconnect_attempts == 0 {
            return Err(PrinterError::InvalidConfig(
                "max_reconnect_attempts must be greater than 0".into(),
            ));
        }

        if !(24..=64).contains(&self.receipt.paper_width) {
            return Err(PrinterError::InvalidConfig(format!(
                "paper_width must be between 24 and 64 characters, got {}",
                self.receipt.paper_width
            )));
        }

        if let Some(address) = &self.printer.address {
            if address.trim().is_empty() {
                return Err(PrinterError::InvalidConfig("printer address is empty".into()));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(address) = std::env::var("TALLY_PRINTER_ADDRESS") {
            debug!(address = %address, "Overriding printer address from environment");
            self.printer.address = Some(address);
        }

        if let Ok(width) = std::env::var("TALLY_PAPER_WIDTH") {
            match width.parse::<usize>() {
                Ok(w) => self.receipt.paper_width = w,
                Err(_) => warn!(value = %width, "Ignoring non-numeric TALLY_PAPER_WIDTH"),
            }
        }

        if let Ok(secs) = std::env::var("TALLY_CONNECT_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse::<u64>() {
                debug!(secs = s, "Overriding connect timeout from environment");
                self.printer.connect_timeout_secs = s;
            }
        }

        if let Ok(attempts) = std::env::var("TALLY_MAX_RECONNECT_ATTEMPTS") {
            if let Ok(n) = attempts.parse::<u32>() {
                self.printer.max_reconnect_attempts = n;
            }
        }

        if let Ok(name) = std::env::var("TALLY_BUSINESS_NAME") {
            self.receipt.business_name = name;
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tally", "pos")
            .map(|dirs| dirs.config_dir().join("printer.toml"))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.printer.connect_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.printer.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.printer.max_backoff_secs)
    }

    /// The remembered printer, if one is configured.
    pub fn saved_device(&self) -> Option<Device> {
        self.printer.address.as_ref().map(|address| {
            let name = self.printer.name.clone().unwrap_or_else(|| address.clone());
            Device::new(name, address.clone())
        })
    }

    /// Layout handed to the document composers.
    pub fn layout(&self) -> Layout {
        Layout {
            width: self.receipt.paper_width,
            code_page: self.receipt.code_page,
            business_name: self.receipt.business_name.clone(),
            footer: self.receipt.footer.clone(),
        }
    }
}

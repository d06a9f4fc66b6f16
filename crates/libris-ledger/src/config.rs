//! # Ledger Configuration
//!
//! Loan period, fine rate and dashboard thresholds.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LIBRIS_LOAN_PERIOD_DAYS=21                                         │
//! │     LIBRIS_DAILY_FINE_CENTS=50                                         │
//! │     LIBRIS_LOW_STOCK_PERCENT=25                                        │
//! │                                                                         │
//! │  2. TOML Config File (optional path)                                   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     30 days, $1.00/day, 30% low stock                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # libris.toml
//! loan_period_days = 30
//! daily_fine_cents = 100
//! low_stock_percent = 30
//! event_capacity = 256
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use libris_core::{
    CoreError, CoreResult, FinePolicy, Money, DEFAULT_DAILY_FINE_CENTS, DEFAULT_LOAN_PERIOD_DAYS,
    DEFAULT_LOW_STOCK_PERCENT,
};

/// Ledger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Days between borrow date and due date.
    #[serde(default = "default_loan_period_days")]
    pub loan_period_days: u32,

    /// Fine per overdue day, in cents.
    #[serde(default = "default_daily_fine_cents")]
    pub daily_fine_cents: i64,

    /// Titles with a smaller available share are reported as low stock.
    #[serde(default = "default_low_stock_percent")]
    pub low_stock_percent: u32,

    /// Buffered change events per subscriber before it starts lagging.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

/// Highest accepted daily fine: $1,000.00.
pub const MAX_DAILY_FINE_CENTS: i64 = 100_000;

fn default_loan_period_days() -> u32 {
    DEFAULT_LOAN_PERIOD_DAYS
}

fn default_daily_fine_cents() -> i64 {
    DEFAULT_DAILY_FINE_CENTS
}

fn default_low_stock_percent() -> u32 {
    DEFAULT_LOW_STOCK_PERCENT
}

fn default_event_capacity() -> usize {
    256
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            loan_period_days: default_loan_period_days(),
            daily_fine_cents: default_daily_fine_cents(),
            low_stock_percent: default_low_stock_percent(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl LedgerConfig {
    /// Loads configuration with priority: env > file > defaults.
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load(config_path: Option<&Path>) -> CoreResult<Self> {
        let mut config = match config_path {
            Some(path) if path.exists() => {
                info!(?path, "Loading ledger config");
                let contents = std::fs::read_to_string(path)
                    .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
                Self::from_toml(&contents)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                LedgerConfig::default()
            }
            None => LedgerConfig::default(),
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> CoreResult<Self> {
        Self::load(None)
    }

    /// Parses a TOML document. Missing keys take their defaults.
    pub fn from_toml(contents: &str) -> CoreResult<Self> {
        toml::from_str(contents).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Checks ranges.
    ///
    /// ## Rules
    /// - loan period: 1..=365 days
    /// - daily fine: 0..=[`MAX_DAILY_FINE_CENTS`] cents (zero disables fines)
    /// - low stock: 0..=100 percent
    /// - event capacity: >= 1
    pub fn validate(&self) -> CoreResult<()> {
        if !(1..=365).contains(&self.loan_period_days) {
            return Err(CoreError::Config(format!(
                "loan_period_days must be between 1 and 365, got {}",
                self.loan_period_days
            )));
        }
        if !(0..=MAX_DAILY_FINE_CENTS).contains(&self.daily_fine_cents) {
            return Err(CoreError::Config(format!(
                "daily_fine_cents must be between 0 and {}, got {}",
                MAX_DAILY_FINE_CENTS, self.daily_fine_cents
            )));
        }
        if self.low_stock_percent > 100 {
            return Err(CoreError::Config(format!(
                "low_stock_percent must be at most 100, got {}",
                self.low_stock_percent
            )));
        }
        if self.event_capacity == 0 {
            return Err(CoreError::Config("event_capacity must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Applies `LIBRIS_*` environment variables. Unparseable values are
    /// logged and ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(days) = std::env::var("LIBRIS_LOAN_PERIOD_DAYS") {
            match days.parse() {
                Ok(days) => self.loan_period_days = days,
                Err(_) => warn!(value = %days, "Ignoring invalid LIBRIS_LOAN_PERIOD_DAYS"),
            }
        }

        if let Ok(cents) = std::env::var("LIBRIS_DAILY_FINE_CENTS") {
            match cents.parse() {
                Ok(cents) => self.daily_fine_cents = cents,
                Err(_) => warn!(value = %cents, "Ignoring invalid LIBRIS_DAILY_FINE_CENTS"),
            }
        }

        if let Ok(percent) = std::env::var("LIBRIS_LOW_STOCK_PERCENT") {
            match percent.parse() {
                Ok(percent) => self.low_stock_percent = percent,
                Err(_) => warn!(value = %percent, "Ignoring invalid LIBRIS_LOW_STOCK_PERCENT"),
            }
        }
    }

    /// Fine policy derived from this configuration.
    pub fn fine_policy(&self) -> FinePolicy {
        FinePolicy::new(self.loan_period_days, Money::from_cents(self.daily_fine_cents))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Configuration
//!
//! Settings for the divvy shell: default currency, default surcharge
//! policies, output format and log filter.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DIVVY_CURRENCY=TND                                                 │
//! │     DIVVY_TIP_POLICY=equal                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/divvy/config.toml (Linux)                                │
//! │     ~/Library/Application Support/com.divvy.divvy/config.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     USD, proportional tax and tip, equal service fee, human output     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [currency]
//! default = "TND"
//!
//! [split]
//! tax = "proportional"
//! tip = "equal"
//! service_fee = "equal"
//!
//! [output]
//! format = "human"   # human | json
//!
//! [logging]
//! filter = "info,divvy=debug"
//! ```

use divvy_core::receipt::ReceiptPolicies;
use divvy_core::types::{SurchargeKind, SurchargePolicy};
use divvy_core::Currency;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

// =============================================================================
// Config Error
// =============================================================================

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Output Format
// =============================================================================

/// How reports are printed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Aligned text for a terminal.
    #[default]
    Human,
    /// Pretty-printed JSON for the front-end or scripts.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            other => Err(ConfigError::Invalid(format!(
                "Unknown output format: '{}'. Valid options: human, json",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// `[currency]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    /// Currency for bill files that do not name one.
    #[serde(default = "default_currency")]
    pub default: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            default: default_currency(),
        }
    }
}

/// `[split]` section: policy used when a surcharge does not name one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSettings {
    #[serde(default = "default_proportional")]
    pub tax: SurchargePolicy,

    #[serde(default = "default_proportional")]
    pub tip: SurchargePolicy,

    #[serde(default = "default_equal")]
    pub service_fee: SurchargePolicy,
}

fn default_proportional() -> SurchargePolicy {
    SurchargePolicy::Proportional
}

fn default_equal() -> SurchargePolicy {
    SurchargePolicy::Equal
}

impl Default for SplitSettings {
    fn default() -> Self {
        SplitSettings {
            tax: default_proportional(),
            tip: default_proportional(),
            service_fee: default_equal(),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(default)]
    pub format: OutputFormat,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins over it.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,divvy=debug".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete shell configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub currency: CurrencySettings,

    #[serde(default)]
    pub split: SplitSettings,

    #[serde(default)]
    pub output: OutputSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config.toml`)
    /// 3. Environment variables
    ///
    /// An explicitly passed path must exist; the platform default may not.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else if explicit {
                return Err(ConfigError::Invalid(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document; missing sections fall back to defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.default_currency()?;
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "logging.filter must not be empty".into(),
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `DIVVY_*` overrides from `lookup`. Unparseable values are
    /// logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(code) = lookup("DIVVY_CURRENCY") {
            debug!(currency = %code, "Overriding default currency from environment");
            self.currency.default = code;
        }

        let policies = [
            ("DIVVY_TAX_POLICY", &mut self.split.tax),
            ("DIVVY_TIP_POLICY", &mut self.split.tip),
            ("DIVVY_SERVICE_FEE_POLICY", &mut self.split.service_fee),
        ];
        for (key, slot) in policies {
            if let Some(value) = lookup(key) {
                match value.parse::<SurchargePolicy>() {
                    Ok(policy) => *slot = policy,
                    Err(_) => warn!(key, value = %value, "Unknown surcharge policy in environment"),
                }
            }
        }

        if let Some(format) = lookup("DIVVY_OUTPUT_FORMAT") {
            match format.parse() {
                Ok(parsed) => self.output.format = parsed,
                Err(_) => warn!(format = %format, "Unknown output format in environment"),
            }
        }

        if let Some(filter) = lookup("DIVVY_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "divvy", "divvy")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The configured default currency.
    pub fn default_currency(&self) -> ConfigResult<Currency> {
        Currency::from_code(&self.currency.default)
            .map_err(|e| ConfigError::Invalid(format!("currency.default: {}", e)))
    }

    /// Default policy for a surcharge kind.
    pub fn policy_for(&self, kind: SurchargeKind) -> SurchargePolicy {
        match kind {
            SurchargeKind::Tax => self.split.tax,
            SurchargeKind::Tip => self.split.tip,
            SurchargeKind::ServiceFee => self.split.service_fee,
        }
    }

    /// Policies applied to scanned receipts.
    pub fn receipt_policies(&self) -> ReceiptPolicies {
        ReceiptPolicies {
            tax: self.split.tax,
            tip: self.split.tip,
            service_fee: self.split.service_fee,
        }
    }
}

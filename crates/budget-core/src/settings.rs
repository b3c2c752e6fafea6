//! Operator settings.
//!
//! Layered with the `config` crate: built-in defaults, then an optional file,
//! then `BUDGET_`-prefixed environment variables using `__` between nested
//! keys (`BUDGET_LIMITS__MAX_MEMO_BYTES=128`).
//!
//! These settings describe how a host runs the ledger. They are unrelated to
//! the on-ledger configuration record, which is written once by `initialize`.

use std::path::Path;

use budget_storage::LedgerStorageConfig;
use budget_types::Capability;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSettings {
    #[serde(default)]
    pub capabilities: CapabilitySettings,

    #[serde(default)]
    pub storage: LedgerStorageConfig,

    #[serde(default)]
    pub limits: LimitSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Names of the global capabilities the executor signs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySettings {
    #[serde(default = "default_add_department")]
    pub add_department: Capability,

    #[serde(default = "default_toggle_department")]
    pub toggle_department: Capability,

    #[serde(default = "default_process_application")]
    pub process_application: Capability,

    /// Capability the ledger's own account signs `initialize` with
    #[serde(default = "default_platform")]
    pub platform: Capability,
}

impl Default for CapabilitySettings {
    fn default() -> Self {
        Self {
            add_department: default_add_department(),
            toggle_department: default_toggle_department(),
            process_application: default_process_application(),
            platform: default_platform(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitSettings {
    /// Longest memo, in bytes, forwarded to the payment collaborator
    #[serde(default = "default_max_memo_bytes")]
    pub max_memo_bytes: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_memo_bytes: default_max_memo_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_add_department() -> Capability {
    Capability::new("add-department")
}

fn default_toggle_department() -> Capability {
    Capability::new("toggle-department")
}

fn default_process_application() -> Capability {
    Capability::new("process-application")
}

fn default_platform() -> Capability {
    Capability::new("active")
}

fn default_max_memo_bytes() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LedgerSettings {
    /// Load settings from defaults, an optional file, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&LedgerSettings::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BUDGET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: LedgerSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let caps = &self.capabilities;
        for (key, cap) in [
            ("capabilities.add_department", &caps.add_department),
            ("capabilities.toggle_department", &caps.toggle_department),
            ("capabilities.process_application", &caps.process_application),
            ("capabilities.platform", &caps.platform),
        ] {
            if cap.as_str().is_empty() {
                return Err(SettingsError::Invalid(format!("{key} must not be empty")));
            }
        }
        if self.limits.max_memo_bytes == 0 {
            return Err(SettingsError::Invalid(
                "limits.max_memo_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

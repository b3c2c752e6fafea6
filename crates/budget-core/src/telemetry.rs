//! Tracing subscriber setup for hosts embedding the ledger.

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::settings::LoggingSettings;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("a global tracing subscriber is already installed")]
    AlreadyInstalled,
}

/// Install the global subscriber. A non-empty `RUST_LOG` takes precedence
/// over `settings.level`; an unparsable one is an error, not a fallback.
pub fn init_tracing(settings: &LoggingSettings) -> Result<(), TelemetryError> {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = build_filter(from_env.as_deref(), settings)?;

    let installed = if settings.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    installed.map_err(|_| TelemetryError::AlreadyInstalled)
}

fn build_filter(from_env: Option<&str>, settings: &LoggingSettings) -> Result<EnvFilter, TelemetryError> {
    let directive = match from_env {
        Some(directive) if !directive.trim().is_empty() => directive,
        _ => settings.level.as_str(),
    };
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

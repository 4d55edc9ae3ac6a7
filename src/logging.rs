//! # Structured Logging
//!
//! Environment-aware structured logging for tracing chain executions,
//! breaker transitions and trigger reconciliation.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call more than once; only the first call installs a subscriber.
/// Honors `RUST_LOG` when set, otherwise falls back to a per-environment
/// default level. Non-development environments log JSON for ingestion.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_log_level(&environment)));

        // A global subscriber may already be installed by the host process,
        // so tolerate try_init failures.
        let initialized = if environment == "development" {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_filter(filter),
                )
                .try_init()
                .is_ok()
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true)
                        .with_ansi(false)
                        .with_filter(filter),
                )
                .try_init()
                .is_ok()
        };

        if initialized {
            tracing::info!(environment = %environment, "structured logging initialized");
        } else {
            tracing::debug!("global tracing subscriber already initialized");
        }
    });
}

fn get_environment() -> String {
    std::env::var("RELAY_ENV").unwrap_or_else(|_| "development".to_string())
}

fn default_log_level(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        "test" => "warn",
        _ => "debug",
    }
}

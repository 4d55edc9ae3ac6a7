//! # Relay Configuration
//!
//! Typed runtime configuration for the orchestration core. All tunables are
//! explicit and validated at load time; there are no hidden environment
//! fallbacks inside the components themselves.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use relay_core::config::RelayConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Defaults, optionally overridden by config/relay.toml and RELAY_* vars.
//! let config = RelayConfig::load()?;
//! assert!(config.orchestration.fan_out_limit > 0);
//! # Ok(())
//! # }
//! ```

use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the relay core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub resilience: ResilienceSettings,
    pub orchestration: OrchestrationSettings,
    pub scheduler: SchedulerSettings,
    pub http: HttpSettings,
}

/// Retry and circuit-breaker tunables shared by all protected call sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceSettings {
    /// Consecutive transient failures that trip a breaker open.
    pub failure_threshold: u32,
    /// How long an open breaker rejects calls before re-admitting them.
    pub cooldown_seconds: u64,
    /// Base delay for exponential backoff between retry attempts.
    pub base_delay_ms: u64,
    /// Upper bound on the total time spent retrying a single call.
    /// Zero disables the global budget.
    pub global_timeout_seconds: u64,
}

/// Continuation-engine tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationSettings {
    /// Concurrency cap for fan-out over result rows. Branches beyond the
    /// cap queue until a slot frees up.
    pub fan_out_limit: usize,
}

/// Scheduler-trigger tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Reserved name prefix identifying triggers owned by this system in
    /// the scheduling daemon.
    pub trigger_prefix: String,
}

/// Outbound HTTP client tunables for the endpoint strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Whole-request timeout applied by the bundled HTTP transport.
    pub request_timeout_seconds: u64,
}

impl Default for ResilienceSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown_seconds: 30,
            base_delay_ms: 500,
            global_timeout_seconds: 300,
        }
    }
}

impl Default for OrchestrationSettings {
    fn default() -> Self {
        Self { fan_out_limit: 8 }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            trigger_prefix: "relay-sched-".to_string(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 60,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            resilience: ResilienceSettings::default(),
            orchestration: OrchestrationSettings::default(),
            scheduler: SchedulerSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from `config/relay.toml` (when present) with
    /// `RELAY_`-prefixed environment overrides, e.g.
    /// `RELAY_RESILIENCE__FAILURE_THRESHOLD=3`.
    pub fn load() -> Result<Self> {
        Self::load_from(std::env::var("RELAY_CONFIG").as_deref().unwrap_or("config/relay"))
    }

    /// Load configuration from an explicit file stem.
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path).required(false))
            .add_source(::config::Environment::with_prefix("RELAY").separator("__"))
            .build()
            .map_err(|e| RelayError::Configuration(format!("failed to read configuration: {e}")))?;

        let loaded: RelayConfig = settings
            .try_deserialize()
            .map_err(|e| RelayError::Configuration(format!("invalid configuration: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations that would disable the engine outright.
    pub fn validate(&self) -> Result<()> {
        if self.orchestration.fan_out_limit == 0 {
            return Err(RelayError::Configuration(
                "orchestration.fan_out_limit must be at least 1".into(),
            ));
        }
        if self.resilience.failure_threshold == 0 {
            return Err(RelayError::Configuration(
                "resilience.failure_threshold must be at least 1".into(),
            ));
        }
        if self.scheduler.trigger_prefix.trim().is_empty() {
            return Err(RelayError::Configuration(
                "scheduler.trigger_prefix must not be blank".into(),
            ));
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.resilience.cooldown_seconds)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.resilience.base_delay_ms)
    }

    pub fn global_timeout(&self) -> Duration {
        Duration::from_secs(self.resilience.global_timeout_seconds)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_seconds)
    }
}

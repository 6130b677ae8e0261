//! Save scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default minimum interval between writes while the user is active.
pub const DEFAULT_ACTIVE_INTERVAL_MS: u64 = 15_000;
/// Default minimum interval between writes while the user is idle.
pub const DEFAULT_IDLE_INTERVAL_MS: u64 = 3_600_000;
/// Default inactivity threshold before the user counts as idle.
pub const DEFAULT_IDLE_THRESHOLD_SECS: u64 = 180;
/// Default minimum delay for `save_delayed`.
pub const DEFAULT_DELAY_MS: u64 = 2_000;

/// Environment variable overriding the active interval.
pub const ENV_ACTIVE_INTERVAL_MS: &str = "SAVER_ACTIVE_INTERVAL_MS";
/// Environment variable overriding the idle interval.
pub const ENV_IDLE_INTERVAL_MS: &str = "SAVER_IDLE_INTERVAL_MS";
/// Environment variable overriding the idle threshold.
pub const ENV_IDLE_THRESHOLD_SECS: &str = "SAVER_IDLE_THRESHOLD_SECS";
/// Environment variable overriding the default delay.
pub const ENV_DEFAULT_DELAY_MS: &str = "SAVER_DEFAULT_DELAY_MS";

/// Timing configuration for a save scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaverConfig {
    /// Minimum milliseconds between writes while active.
    pub active_interval_ms: u64,
    /// Minimum milliseconds between writes while idle.
    pub idle_interval_ms: u64,
    /// Seconds of inactivity before the idle service reports `idle`.
    pub idle_threshold_secs: u64,
    /// Minimum delay applied by `save_delayed_default`.
    pub default_delay_ms: u64,
}

impl Default for SaverConfig {
    fn default() -> Self {
        Self {
            active_interval_ms: DEFAULT_ACTIVE_INTERVAL_MS,
            idle_interval_ms: DEFAULT_IDLE_INTERVAL_MS,
            idle_threshold_secs: DEFAULT_IDLE_THRESHOLD_SECS,
            default_delay_ms: DEFAULT_DELAY_MS,
        }
    }
}

impl SaverConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the active interval.
    #[must_use]
    pub fn with_active_interval(mut self, interval: Duration) -> Self {
        self.active_interval_ms = duration_ms(interval);
        self
    }

    /// Set the idle interval.
    #[must_use]
    pub fn with_idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval_ms = duration_ms(interval);
        self
    }

    /// Set the idle threshold (whole seconds).
    #[must_use]
    pub const fn with_idle_threshold(mut self, threshold: Duration) -> Self {
        self.idle_threshold_secs = threshold.as_secs();
        self
    }

    /// Set the default minimum delay.
    #[must_use]
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay_ms = duration_ms(delay);
        self
    }

    /// Minimum interval between writes while active.
    #[must_use]
    pub const fn active_interval(&self) -> Duration {
        Duration::from_millis(self.active_interval_ms)
    }

    /// Minimum interval between writes while idle.
    #[must_use]
    pub const fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    /// Inactivity threshold for the idle service.
    #[must_use]
    pub const fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }

    /// Default minimum delay for delayed saves.
    #[must_use]
    pub const fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms)
    }

    /// Interval that applies for the given idle state.
    #[must_use]
    pub const fn interval_for(&self, is_idle: bool) -> Duration {
        if is_idle {
            self.idle_interval()
        } else {
            self.active_interval()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.active_interval_ms == 0 {
            return Err("active_interval_ms must be greater than 0".into());
        }
        if self.idle_interval_ms == 0 {
            return Err("idle_interval_ms must be greater than 0".into());
        }
        if self.idle_threshold_secs == 0 {
            return Err("idle_threshold_secs must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present; a
    /// missing file is fine, an unreadable or malformed one is an error.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, String> {
        tolerate_missing_env_file(dotenvy::dotenv().map(drop))?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let read = |key: &str, slot: &mut u64| -> Result<(), String> {
            if let Some(raw) = lookup(key) {
                *slot = raw
                    .trim()
                    .parse()
                    .map_err(|e| format!("{key}: cannot parse `{raw}`: {e}"))?;
            }
            Ok(())
        };
        read(ENV_ACTIVE_INTERVAL_MS, &mut cfg.active_interval_ms)?;
        read(ENV_IDLE_INTERVAL_MS, &mut cfg.idle_interval_ms)?;
        read(ENV_IDLE_THRESHOLD_SECS, &mut cfg.idle_threshold_secs)?;
        read(ENV_DEFAULT_DELAY_MS, &mut cfg.default_delay_ms)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn tolerate_missing_env_file(loaded: Result<(), dotenvy::Error>) -> Result<(), String> {
    match loaded {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(format!(".env: {e}")),
    }
}

//! Console configuration.
//!
//! Loaded from `~/.aocc/config.yaml` when present. Every section and field
//! has a default, so a partial file (or none at all) is valid:
//!
//! ```yaml
//! toasts:
//!   default_duration_ms: 4000
//! recommendations:
//!   auto_dismiss_secs: 15
//!   trigger_severity: warning
//! alerts:
//!   reset_history_on_reenter: true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::MAX_TIMER_DELAY;
use crate::error::{AoccError, Result};
use crate::logging::aocc_home;
use crate::types::AlertSeverity;

/// Default toast lifetime in milliseconds.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 3000;

/// Default cap on simultaneously visible toasts.
pub const DEFAULT_MAX_VISIBLE_TOASTS: usize = 5;

/// Default recommendation auto-dismiss countdown in seconds.
pub const DEFAULT_AUTO_DISMISS_SECS: u64 = 30;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AoccConfig {
    /// Toast queue settings
    pub toasts: ToastConfig,

    /// Recommendation lifecycle settings
    pub recommendations: RecommendationConfig,

    /// Alert registry settings
    pub alerts: AlertConfig,
}

/// Toast queue settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    /// Lifetime of a toast when the caller gives none
    pub default_duration_ms: u64,

    /// Maximum toasts visible at once; the oldest is evicted on overflow
    pub max_visible: usize,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_TOAST_DURATION_MS,
            max_visible: DEFAULT_MAX_VISIBLE_TOASTS,
        }
    }
}

impl ToastConfig {
    /// Default lifetime as a [`Duration`], capped at [`MAX_TIMER_DELAY`].
    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.default_duration_ms).min(MAX_TIMER_DELAY)
    }
}

/// Recommendation lifecycle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Countdown before an unattended recommendation is dismissed
    pub auto_dismiss_secs: u64,

    /// Delay between an alert being raised and its recommendation showing
    pub presentation_delay_ms: u64,

    /// Delay between accepting and navigating to the staff view
    pub accept_navigation_delay_ms: u64,

    /// Raising an alert at or above this severity schedules a staff
    /// recommendation for it. `null` turns the trigger off.
    pub trigger_severity: Option<AlertSeverity>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            auto_dismiss_secs: DEFAULT_AUTO_DISMISS_SECS,
            presentation_delay_ms: 2000,
            accept_navigation_delay_ms: 1000,
            trigger_severity: Some(AlertSeverity::Critical),
        }
    }
}

// Accessors cap at MAX_TIMER_DELAY so a config built in code without
// validate() still yields representable deadlines.
impl RecommendationConfig {
    pub fn auto_dismiss(&self) -> Duration {
        Duration::from_secs(self.auto_dismiss_secs).min(MAX_TIMER_DELAY)
    }

    pub fn presentation_delay(&self) -> Duration {
        Duration::from_millis(self.presentation_delay_ms).min(MAX_TIMER_DELAY)
    }

    pub fn accept_navigation_delay(&self) -> Duration {
        Duration::from_millis(self.accept_navigation_delay_ms).min(MAX_TIMER_DELAY)
    }

    /// Whether an alert of `severity` should get a recommendation.
    pub fn triggers_on(&self, severity: AlertSeverity) -> bool {
        self.trigger_severity.is_some_and(|threshold| severity >= threshold)
    }
}

/// Alert registry settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Clear all previous alerts (resolved ones included) when the system
    /// re-enters alert mode. When false, history is kept and only seed
    /// entries with no active alert at the same location and category are
    /// raised again.
    pub reset_history_on_reenter: bool,
}

impl AoccConfig {
    /// Default config file path (`~/.aocc/config.yaml`).
    pub fn default_path() -> Result<PathBuf> {
        Ok(aocc_home()?.join("config.yaml"))
    }

    /// Load and validate configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AoccError::ConfigNotFound {
                    path: path.to_path_buf(),
                    source: Some(e),
                }
            } else {
                AoccError::io("reading config", path, e)
            }
        })?;

        let config = Self::from_yaml_str(&contents).map_err(|e| match e {
            AoccError::ConfigInvalid { message, .. } => AoccError::ConfigInvalid {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load from the default path, falling back to defaults when the file is missing.
    pub fn load_or_default() -> Result<Self> {
        let path = Self::default_path()?;
        match Self::load(&path) {
            Ok(config) => Ok(config),
            Err(AoccError::ConfigNotFound { .. }) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| AoccError::ConfigInvalid {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.toasts.default_duration_ms == 0 {
            return Err(AoccError::config_validation(
                "toasts.default_duration_ms must be greater than 0",
            ));
        }
        if self.toasts.max_visible == 0 {
            return Err(AoccError::config_validation(
                "toasts.max_visible must be at least 1",
            ));
        }
        if self.recommendations.auto_dismiss_secs == 0 {
            return Err(AoccError::config_validation(
                "recommendations.auto_dismiss_secs must be greater than 0",
            ));
        }

        let max_ms = MAX_TIMER_DELAY.as_millis() as u64;
        let delays_ms = [
            ("toasts.default_duration_ms", self.toasts.default_duration_ms),
            (
                "recommendations.presentation_delay_ms",
                self.recommendations.presentation_delay_ms,
            ),
            (
                "recommendations.accept_navigation_delay_ms",
                self.recommendations.accept_navigation_delay_ms,
            ),
        ];
        for (field, value) in delays_ms {
            if value > max_ms {
                return Err(AoccError::config_validation(format!(
                    "{field} must be at most {max_ms}"
                )));
            }
        }
        if self.recommendations.auto_dismiss_secs > MAX_TIMER_DELAY.as_secs() {
            return Err(AoccError::config_validation(format!(
                "recommendations.auto_dismiss_secs must be at most {}",
                MAX_TIMER_DELAY.as_secs()
            )));
        }
        Ok(())
    }

    /// Override the toast lifetime.
    pub fn with_toast_duration(mut self, duration: Duration) -> Self {
        self.toasts.default_duration_ms = duration.as_millis() as u64;
        self
    }

    /// Override the visible toast cap.
    pub fn with_max_visible_toasts(mut self, max_visible: usize) -> Self {
        self.toasts.max_visible = max_visible;
        self
    }

    /// Override the recommendation countdown.
    pub fn with_auto_dismiss_secs(mut self, secs: u64) -> Self {
        self.recommendations.auto_dismiss_secs = secs;
        self
    }

    /// Override the alert severity that triggers a recommendation.
    pub fn with_trigger_severity(mut self, severity: Option<AlertSeverity>) -> Self {
        self.recommendations.trigger_severity = severity;
        self
    }

    /// Choose whether re-entering alert mode clears alert history.
    pub fn with_reset_history_on_reenter(mut self, reset: bool) -> Self {
        self.alerts.reset_history_on_reenter = reset;
        self
    }
}

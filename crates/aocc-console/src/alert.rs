//! Operational alert registry.
//!
//! Tracks crowd, staffing and incident alerts raised against airport zones.
//!
//! ## Alert Severities
//!
//! - **Critical**: capacity threshold reached, immediate action required
//! - **Warning**: predicted surge or degraded queue
//! - **Info**: informational notices
//!
//! ## Lifecycle
//!
//! Alerts are created `active` and move to `resolved` exactly once, through
//! [`AlertRegistry::resolve`]. Resolved alerts stay in the registry so the
//! console can show them struck through; ids are never reused, even after
//! [`AlertRegistry::clear_history`].

use std::collections::BTreeMap;

use aocc_core::{AlertId, AoccError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use aocc_core::AlertSeverity;

/// What kind of condition an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    /// Passenger surge predicted from inbound flights
    PredictedSurge,
    /// Zone occupancy above capacity
    Overcrowding,
    /// Not enough staff on post
    Understaffing,
    /// Security or safety incident
    Incident,
}

impl AlertCategory {
    /// Human-readable title for this category.
    pub fn title(&self) -> &'static str {
        match self {
            AlertCategory::PredictedSurge => "Predicted Surge",
            AlertCategory::Overcrowding => "Overcrowding",
            AlertCategory::Understaffing => "Understaffing",
            AlertCategory::Incident => "Incident",
        }
    }
}

/// Alert status. Resolution is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Resolved,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Resolved => write!(f, "resolved"),
        }
    }
}

/// Alert contents before the registry assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    /// Zone identifier, e.g. "Security Zone 2"
    pub location: String,
    pub message: String,
    /// Display-only horizon such as "in 30 minutes"
    pub timeframe: Option<String>,
    /// Prediction confidence, 0-100
    pub confidence: Option<u8>,
}

impl NewAlert {
    /// Create alert contents.
    pub fn new(
        severity: AlertSeverity,
        category: AlertCategory,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            location: location.into(),
            message: message.into(),
            timeframe: None,
            confidence: None,
        }
    }

    /// Attach a display timeframe.
    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    /// Attach a prediction confidence (clamped to 100).
    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = Some(confidence.min(100));
        self
    }
}

/// A single alert record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identifier
    pub id: AlertId,
    pub severity: AlertSeverity,
    pub category: AlertCategory,
    pub location: String,
    pub message: String,
    pub timeframe: Option<String>,
    pub confidence: Option<u8>,
    pub status: AlertStatus,
    /// When the alert was first raised
    pub created_at: DateTime<Utc>,
    /// When the alert was resolved
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    fn from_new(id: AlertId, new: NewAlert, now: DateTime<Utc>) -> Self {
        Self {
            id,
            severity: new.severity,
            category: new.category,
            location: new.location,
            message: new.message,
            timeframe: new.timeframe,
            confidence: new.confidence,
            status: AlertStatus::Active,
            created_at: now,
            resolved_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// Format for display in one line.
    pub fn format_compact(&self) -> String {
        let marker = if self.is_active() { " " } else { "✓" };
        format!(
            "{} {} [{}] {}",
            marker,
            self.severity.icon(),
            self.location,
            self.message
        )
    }
}

/// Filter for [`AlertRegistry::query`]. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub severity: Option<AlertSeverity>,
    pub category: Option<AlertCategory>,
}

impl AlertFilter {
    /// Match every alert.
    pub fn all() -> Self {
        Self::default()
    }

    /// Match active alerts only.
    pub fn active() -> Self {
        Self::default().with_status(AlertStatus::Active)
    }

    pub fn with_status(mut self, status: AlertStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_severity(mut self, severity: AlertSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_category(mut self, category: AlertCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Check whether an alert passes this filter.
    pub fn matches(&self, alert: &Alert) -> bool {
        self.status.is_none_or(|s| alert.status == s)
            && self.severity.is_none_or(|s| alert.severity == s)
            && self.category.is_none_or(|c| alert.category == c)
    }
}

/// Registry of alerts for one operator session.
#[derive(Debug, Clone)]
pub struct AlertRegistry {
    /// All alerts by ID (ascending id = creation order)
    alerts: BTreeMap<AlertId, Alert>,
    /// Next alert ID
    next_id: AlertId,
}

impl Default for AlertRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertRegistry {
    /// Create an empty registry. The first alert gets id 1.
    pub fn new() -> Self {
        Self {
            alerts: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Raise a new alert. Every call creates its own record with a fresh id.
    pub fn raise(&mut self, new: NewAlert, now: DateTime<Utc>) -> AlertId {
        let id = self.next_id;
        self.next_id += 1;

        let alert = Alert::from_new(id, new, now);
        info!(
            alert_id = id,
            severity = %alert.severity,
            location = %alert.location,
            "alert raised"
        );
        self.alerts.insert(id, alert);
        id
    }

    /// Raise an ordered batch of alerts, returning their ids in order.
    pub fn seed(&mut self, alerts: impl IntoIterator<Item = NewAlert>, now: DateTime<Utc>) -> Vec<AlertId> {
        alerts.into_iter().map(|a| self.raise(a, now)).collect()
    }

    /// Resolve an active alert.
    ///
    /// Fails with `AlertNotFound` for unknown ids and `AlertAlreadyResolved`
    /// for repeated calls; neither failure changes any state.
    pub fn resolve(&mut self, id: AlertId, now: DateTime<Utc>) -> Result<&Alert> {
        let alert = self
            .alerts
            .get_mut(&id)
            .ok_or(AoccError::AlertNotFound { id })?;
        if !alert.is_active() {
            return Err(AoccError::AlertAlreadyResolved { id });
        }

        alert.status = AlertStatus::Resolved;
        alert.resolved_at = Some(now);
        info!(alert_id = id, location = %alert.location, "alert resolved");
        Ok(&*alert)
    }

    /// Get an alert by ID.
    pub fn get(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.get(&id)
    }

    /// Alerts passing `filter`, in creation order.
    pub fn query(&self, filter: &AlertFilter) -> Vec<&Alert> {
        self.alerts.values().filter(|a| filter.matches(a)).collect()
    }

    /// Every alert, in creation order.
    pub fn all(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.values()
    }

    /// Whether an active alert already covers `location` and `category`.
    pub fn has_active(&self, location: &str, category: AlertCategory) -> bool {
        self.alerts
            .values()
            .any(|a| a.is_active() && a.category == category && a.location == location)
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Get count of active alerts.
    pub fn active_count(&self) -> usize {
        self.alerts.values().filter(|a| a.is_active()).count()
    }

    /// Get alert summary for badge display.
    pub fn badge(&self) -> AlertBadge {
        let mut badge = AlertBadge::default();
        for alert in self.alerts.values().filter(|a| a.is_active()) {
            match alert.severity {
                AlertSeverity::Critical => badge.critical += 1,
                AlertSeverity::Warning => badge.warning += 1,
                AlertSeverity::Info => {}
            }
            badge.total += 1;
        }
        badge
    }

    /// Drop every alert, resolved ones included. Ids keep counting up.
    pub fn clear_history(&mut self) {
        let dropped = self.alerts.len();
        self.alerts.clear();
        debug!(dropped, "alert history cleared");
    }
}

/// Summary badge for the console header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertBadge {
    /// Active critical alerts
    pub critical: usize,
    /// Active warning alerts
    pub warning: usize,
    /// All active alerts
    pub total: usize,
}

impl AlertBadge {
    /// Check if badge should be displayed.
    pub fn should_display(&self) -> bool {
        self.total > 0
    }

    /// Format for display in header.
    pub fn format_header(&self) -> String {
        if self.critical > 0 {
            format!("⚠ {} critical | {} warning", self.critical, self.warning)
        } else if self.warning > 0 {
            format!("⚠ {} warning", self.warning)
        } else if self.total > 0 {
            format!("ℹ {} notice", self.total)
        } else {
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(location: &str) -> NewAlert {
        NewAlert::new(
            AlertSeverity::Warning,
            AlertCategory::Overcrowding,
            location,
            "Queue exceeding capacity",
        )
    }

    fn critical(location: &str) -> NewAlert {
        NewAlert::new(
            AlertSeverity::Critical,
            AlertCategory::PredictedSurge,
            location,
            "High volume predicted",
        )
    }

    #[test]
    fn test_raise_assigns_sequential_ids() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        assert_eq!(registry.raise(warning("Gate 5"), now), 1);
        assert_eq!(registry.raise(critical("Checkpoint A"), now), 2);
        assert_eq!(registry.active_count(), 2);
    }

    #[test]
    fn test_same_location_and_category_stay_separate() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        let queue_a = NewAlert::new(
            AlertSeverity::Warning,
            AlertCategory::Overcrowding,
            "Gate 5",
            "queue A",
        );
        let queue_b = NewAlert::new(
            AlertSeverity::Critical,
            AlertCategory::Overcrowding,
            "Gate 5",
            "queue B",
        );

        let ids = registry.seed([queue_a, queue_b], now);
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(registry.len(), 2);

        let first = registry.get(1).unwrap();
        assert_eq!(first.severity, AlertSeverity::Warning);
        assert_eq!(first.message, "queue A");
        let second = registry.get(2).unwrap();
        assert_eq!(second.severity, AlertSeverity::Critical);
        assert_eq!(second.message, "queue B");
    }

    #[test]
    fn test_has_active_ignores_resolved() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        registry.raise(warning("Gate 5"), now);
        assert!(registry.has_active("Gate 5", AlertCategory::Overcrowding));
        assert!(!registry.has_active("Gate 5", AlertCategory::Incident));

        registry.resolve(1, now).unwrap();
        assert!(!registry.has_active("Gate 5", AlertCategory::Overcrowding));
    }

    #[test]
    fn test_seed_then_resolve_filters_active() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        let ids = registry.seed([warning("Gate 5"), critical("Checkpoint A")], now);
        assert_eq!(ids, vec![1, 2]);

        registry.resolve(1, now).unwrap();

        let active = registry.query(&AlertFilter::active());
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, 2);
        assert_eq!(active[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn test_resolve_is_idempotent_on_state() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        registry.raise(warning("Gate 5"), now);

        registry.resolve(1, now).unwrap();
        let after_first = registry.get(1).cloned();

        let err = registry.resolve(1, now).unwrap_err();
        assert!(matches!(err, AoccError::AlertAlreadyResolved { id: 1 }));
        assert_eq!(registry.get(1).cloned(), after_first);
    }

    #[test]
    fn test_resolve_unknown_id() {
        let mut registry = AlertRegistry::new();
        let err = registry.resolve(42, Utc::now()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_resolved_alerts_are_retained() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        registry.raise(warning("Gate 5"), now);
        registry.resolve(1, now).unwrap();

        let resolved = registry.query(&AlertFilter::all().with_status(AlertStatus::Resolved));
        assert_eq!(resolved.len(), 1);
        assert!(resolved[0].resolved_at.is_some());
    }

    #[test]
    fn test_raise_after_resolve_creates_new_alert() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        registry.raise(warning("Gate 5"), now);
        registry.resolve(1, now).unwrap();
        assert_eq!(registry.raise(warning("Gate 5"), now), 2);
    }

    #[test]
    fn test_clear_history_never_reuses_ids() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        registry.seed([warning("Gate 5"), critical("Checkpoint A")], now);
        registry.clear_history();
        assert!(registry.is_empty());
        assert_eq!(registry.raise(warning("Gate 5"), now), 3);
    }

    #[test]
    fn test_query_by_severity_and_category() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        registry.seed([warning("Gate 5"), critical("Checkpoint A"), warning("Gate 7")], now);

        let warnings = registry.query(&AlertFilter::all().with_severity(AlertSeverity::Warning));
        assert_eq!(warnings.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 3]);

        let surges = registry.query(&AlertFilter::all().with_category(AlertCategory::PredictedSurge));
        assert_eq!(surges.len(), 1);
        assert_eq!(surges[0].location, "Checkpoint A");
    }

    #[test]
    fn test_badge() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        assert!(!registry.badge().should_display());

        registry.seed([warning("Gate 5"), critical("Checkpoint A")], now);
        let badge = registry.badge();
        assert_eq!(badge.critical, 1);
        assert_eq!(badge.warning, 1);
        assert_eq!(badge.total, 2);
        assert_eq!(badge.format_header(), "⚠ 1 critical | 1 warning");

        registry.resolve(2, now).unwrap();
        assert_eq!(registry.badge().format_header(), "⚠ 1 warning");
    }

    #[test]
    fn test_format_compact() {
        let mut registry = AlertRegistry::new();
        let now = Utc::now();
        registry.raise(critical("Checkpoint A"), now);
        let line = registry.get(1).unwrap().format_compact();
        assert!(line.contains("✖"));
        assert!(line.contains("Checkpoint A"));

        registry.resolve(1, now).unwrap();
        assert!(registry.get(1).unwrap().format_compact().starts_with('✓'));
    }

    #[test]
    fn test_confidence_is_clamped() {
        let alert = warning("Gate 5").with_confidence(140);
        assert_eq!(alert.confidence, Some(100));
    }
}

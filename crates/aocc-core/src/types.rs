//! Shared type definitions used across AOCC crates.

use serde::{Deserialize, Serialize};

/// Unique identifier for an alert. Assigned by the registry, never reused.
pub type AlertId = u64;

/// Unique identifier for a recommendation.
pub type RecommendationId = u64;

/// Alert severity level.
///
/// Lives here rather than next to the alert registry because configuration
/// names a severity threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    /// Informational
    Info = 0,
    /// Warning (predicted surge, queue building up)
    Warning = 1,
    /// Critical (capacity reached)
    Critical = 2,
}

impl AlertSeverity {
    /// Get the icon for this severity level.
    pub fn icon(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "ℹ",
            AlertSeverity::Warning => "⚠",
            AlertSeverity::Critical => "✖",
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Reference to a resource (staff member) in the resource directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRef(String);

impl ResourceRef {
    /// Create a reference from a directory id such as `"S001"`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw directory id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Screens and dashboard sections the core can ask the UI to navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenId {
    /// Landing screen shown after logout
    OperatorLanding,
    /// Main operator dashboard
    OperatorDashboard,
    /// Executive overview section
    Overview,
    /// Flight schedule section
    Flights,
    /// Population / zone occupancy section
    Population,
    /// Predictive heatmap section
    Heatmap,
    /// Staff allocation section
    StaffAllocation,
    /// CCTV surveillance section
    Surveillance,
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OperatorLanding => write!(f, "operator-landing"),
            Self::OperatorDashboard => write!(f, "operator-dashboard"),
            Self::Overview => write!(f, "overview"),
            Self::Flights => write!(f, "flights"),
            Self::Population => write!(f, "population"),
            Self::Heatmap => write!(f, "heatmap"),
            Self::StaffAllocation => write!(f, "staff-allocation"),
            Self::Surveillance => write!(f, "surveillance"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ref_serde_transparent() {
        let r = ResourceRef::new("S001");
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"S001\"");
        let back: ResourceRef = serde_json::from_str("\"S002\"").unwrap();
        assert_eq!(back.as_str(), "S002");
    }

    #[test]
    fn test_severity_serde_and_order() {
        assert_eq!(serde_json::to_string(&AlertSeverity::Critical).unwrap(), "\"critical\"");
        assert!(AlertSeverity::Critical > AlertSeverity::Warning);
        assert_eq!(AlertSeverity::Warning.to_string(), "warning");
    }

    #[test]
    fn test_screen_id_display_and_serde() {
        assert_eq!(ScreenId::StaffAllocation.to_string(), "staff-allocation");
        assert_eq!(
            serde_json::to_string(&ScreenId::OperatorLanding).unwrap(),
            "\"operator_landing\""
        );
    }
}

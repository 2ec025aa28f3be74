//! Deterministic demo data and the scripted pitch sequence.
//!
//! Entering alert mode seeds [`demo_alert_set`]; the staff directory starts
//! as [`demo_staff`]. [`DemoSequence`] is a step counter that drives a
//! scripted walkthrough: step 1 raises the alert, step 2 schedules the
//! recommendation, step 3 accepts it. Pausing is a presenter flag only;
//! advancing by hand still works while paused.

use aocc_core::AlertId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alert::{AlertCategory, AlertSeverity, NewAlert};
use crate::directory::{DutyStatus, StaffMember, StaffRole, StaffRoster};
use crate::recommendation::NewRecommendation;

/// Last step of the demo sequence.
pub const DEMO_LAST_STEP: u8 = 10;

/// Zone the demo recommendation deploys staff to.
pub const DEMO_ZONE: &str = "Security Zone 2";

/// Alerts seeded when the system enters alert mode.
pub fn demo_alert_set() -> Vec<NewAlert> {
    vec![
        NewAlert::new(
            AlertSeverity::Critical,
            AlertCategory::PredictedSurge,
            "Checkpoint A",
            "High volume predicted at Domestic Security (+20m)",
        )
        .with_timeframe("in 20 minutes"),
        NewAlert::new(
            AlertSeverity::Warning,
            AlertCategory::Overcrowding,
            "Gate 5",
            "Gate 5 boarding queue exceeding capacity",
        ),
        NewAlert::new(
            AlertSeverity::Warning,
            AlertCategory::PredictedSurge,
            DEMO_ZONE,
            "Predicted surge at Security Zone 2 in 30 minutes",
        )
        .with_timeframe("in 30 minutes")
        .with_confidence(85),
    ]
}

/// Initial staff roster.
pub fn demo_staff() -> StaffRoster {
    StaffRoster::new([
        StaffMember::new("S001", "Maria Santos", StaffRole::SecurityOfficer, "Security Zone 1"),
        StaffMember::new("S002", "John Reyes", StaffRole::SecurityOfficer, "Security Zone 3"),
        StaffMember::new("S003", "Carlos Tan", StaffRole::SecurityOfficer, "Security Zone 1")
            .with_duty(DutyStatus::Break),
        StaffMember::new("S004", "Anna Lee", StaffRole::CustomerService, "Check-in Hall")
            .assigned_to("Check-in Row A"),
        StaffMember::new("S005", "Mark Diaz", StaffRole::CustomerService, "Arrivals"),
    ])
}

/// The recommendation shown a couple of seconds after the surge alert.
pub fn demo_recommendation(alert_id: Option<AlertId>) -> NewRecommendation {
    let recommendation = NewRecommendation::new(
        "Deploy Additional Staff to Security Zone 2",
        "Predicted surge in 30 minutes. Deploy 3 officers from low-traffic zones \
         to open additional screening lanes.",
        DEMO_ZONE,
    )
    .with_resources(["S001", "S002", "S003"])
    .with_confidence(85);

    match alert_id {
        Some(id) => recommendation.for_alert(id),
        None => recommendation,
    }
}

/// What the session should do when the sequence reaches a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoStep {
    /// Switch the system into alert mode
    RaiseAlert,
    /// Present the demo recommendation after the presentation delay
    ScheduleRecommendation,
    /// Accept whatever recommendation is live
    AcceptRecommendation,
    /// Presenter-only step, nothing changes in the session
    Narration(u8),
}

impl DemoStep {
    fn for_step(step: u8) -> Self {
        match step {
            1 => Self::RaiseAlert,
            2 => Self::ScheduleRecommendation,
            3 => Self::AcceptRecommendation,
            other => Self::Narration(other),
        }
    }
}

/// Step counter for the scripted demo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoSequence {
    step: u8,
    paused: bool,
}

impl DemoSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.step >= DEMO_LAST_STEP
    }

    /// Advance one step. Returns `None` once the last step is reached.
    pub fn next_step(&mut self) -> Option<DemoStep> {
        if self.is_finished() {
            return None;
        }
        self.step += 1;
        debug!(step = self.step, "demo advanced");
        Some(DemoStep::for_step(self.step))
    }

    /// Back to step 0, unpaused.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Toggle pause. Returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::ResourceDirectory;
    use aocc_core::ResourceRef;

    #[test]
    fn test_demo_alert_set_shape() {
        let alerts = demo_alert_set();
        let critical = alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count();
        assert_eq!(alerts.len(), 3);
        assert_eq!(critical, 1);
    }

    #[test]
    fn test_demo_recommendation_resources_exist() {
        let staff = demo_staff();
        let rec = demo_recommendation(Some(3));
        assert_eq!(rec.alert_id, Some(3));
        assert!(staff.find_missing(&rec.suggested_resources).is_none());
        assert!(!staff.is_available(&ResourceRef::new("S004")));
    }

    #[test]
    fn test_sequence_steps() {
        let mut seq = DemoSequence::new();
        assert_eq!(seq.next_step(), Some(DemoStep::RaiseAlert));
        assert_eq!(seq.next_step(), Some(DemoStep::ScheduleRecommendation));
        assert_eq!(seq.next_step(), Some(DemoStep::AcceptRecommendation));
        assert_eq!(seq.next_step(), Some(DemoStep::Narration(4)));
    }

    #[test]
    fn test_sequence_stops_at_last_step() {
        let mut seq = DemoSequence::new();
        for _ in 0..DEMO_LAST_STEP {
            assert!(seq.next_step().is_some());
        }
        assert!(seq.is_finished());
        assert_eq!(seq.next_step(), None);
        assert_eq!(seq.step(), DEMO_LAST_STEP);
    }

    #[test]
    fn test_pause_and_reset() {
        let mut seq = DemoSequence::new();
        seq.next_step();
        assert!(seq.toggle_pause());
        assert_eq!(seq.next_step(), Some(DemoStep::ScheduleRecommendation));
        assert_eq!(seq.step(), 2);
        assert!(seq.is_paused());

        seq.reset();
        assert_eq!(seq.step(), 0);
        assert!(!seq.is_paused());
    }
}

//! Recommendation lifecycle.
//!
//! At most one recommendation is live at a time. A live recommendation is
//! always `pending`; it leaves that state through [`RecommendationLifecycle::accept`],
//! [`RecommendationLifecycle::dismiss`], or its countdown running out, which is
//! treated exactly like a dismiss. Finished recommendations move to history.
//!
//! The countdown is a single deadline fixed at presentation time; the
//! remaining seconds are derived from it on demand rather than ticked down.
//!
//! [`staff_response`] builds the recommendation the session schedules when
//! an alert reaches the configured trigger severity.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use aocc_core::{AlertId, AoccError, RecommendationId, ResourceRef, Result, deadline_after};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alert::Alert;
use crate::directory::{ResourceDirectory, StaffRole};

/// Officers suggested by a triggered recommendation.
pub const RESPONSE_TEAM_SIZE: usize = 3;

/// Recommendation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Pending,
    Accepted,
    Dismissed,
}

impl std::fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Dismissed => write!(f, "dismissed"),
        }
    }
}

/// Why a recommendation was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    /// Operator pressed dismiss
    Operator,
    /// Countdown reached zero while pending
    Expired,
}

/// Recommendation contents before the lifecycle assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecommendation {
    /// Alert this recommendation responds to
    pub alert_id: Option<AlertId>,
    pub title: String,
    pub description: String,
    /// Staff to reassign when accepted
    pub suggested_resources: BTreeSet<ResourceRef>,
    /// Post the suggested staff are sent to on accept
    pub assignment: String,
    /// Confidence, 0-100
    pub confidence: u8,
    /// Overrides the configured auto-dismiss countdown
    pub countdown: Option<Duration>,
}

impl NewRecommendation {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        assignment: impl Into<String>,
    ) -> Self {
        Self {
            alert_id: None,
            title: title.into(),
            description: description.into(),
            suggested_resources: BTreeSet::new(),
            assignment: assignment.into(),
            confidence: 0,
            countdown: None,
        }
    }

    pub fn for_alert(mut self, alert_id: AlertId) -> Self {
        self.alert_id = Some(alert_id);
        self
    }

    pub fn with_resources<I, R>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ResourceRef>,
    {
        self.suggested_resources
            .extend(resources.into_iter().map(Into::into));
        self
    }

    /// Set the confidence (clamped to 100).
    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = confidence.min(100);
        self
    }

    pub fn with_countdown(mut self, countdown: Duration) -> Self {
        self.countdown = Some(countdown);
        self
    }
}

/// A presented recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub alert_id: Option<AlertId>,
    pub title: String,
    pub description: String,
    pub suggested_resources: BTreeSet<ResourceRef>,
    pub assignment: String,
    pub confidence: u8,
    pub status: RecommendationStatus,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub dismiss_reason: Option<DismissReason>,
}

impl Recommendation {
    pub fn is_pending(&self) -> bool {
        self.status == RecommendationStatus::Pending
    }
}

#[derive(Debug, Clone)]
struct Live {
    recommendation: Recommendation,
    deadline: Instant,
}

/// Holder of the single live recommendation and the history of past ones.
#[derive(Debug, Clone)]
pub struct RecommendationLifecycle {
    live: Option<Live>,
    history: Vec<Recommendation>,
    next_id: RecommendationId,
    auto_dismiss: Duration,
}

impl RecommendationLifecycle {
    /// Create a lifecycle whose countdown defaults to `auto_dismiss`.
    pub fn new(auto_dismiss: Duration) -> Self {
        Self {
            live: None,
            history: Vec::new(),
            next_id: 1,
            auto_dismiss,
        }
    }

    /// Show a recommendation and start its countdown.
    ///
    /// Fails while another recommendation is still pending, and when the
    /// countdown is out of range. Neither failure uses up an id.
    pub fn present(
        &mut self,
        new: NewRecommendation,
        now: Instant,
        wall_now: DateTime<Utc>,
    ) -> Result<RecommendationId> {
        let id = self.next_id;
        if let Some(live) = &self.live {
            return Err(AoccError::RecommendationAlreadyPending {
                pending: live.recommendation.id,
                rejected: id,
            });
        }
        let countdown = new.countdown.unwrap_or(self.auto_dismiss);
        let deadline = deadline_after(now, countdown)?;
        self.next_id += 1;

        let recommendation = Recommendation {
            id,
            alert_id: new.alert_id,
            title: new.title,
            description: new.description,
            suggested_resources: new.suggested_resources,
            assignment: new.assignment,
            confidence: new.confidence,
            status: RecommendationStatus::Pending,
            created_at: wall_now,
            closed_at: None,
            dismiss_reason: None,
        };
        info!(
            recommendation_id = id,
            title = %recommendation.title,
            countdown_secs = countdown.as_secs(),
            "recommendation presented"
        );
        self.live = Some(Live {
            recommendation,
            deadline,
        });
        Ok(id)
    }

    /// The live (pending) recommendation, if any.
    pub fn current(&self) -> Option<&Recommendation> {
        self.live.as_ref().map(|l| &l.recommendation)
    }

    /// Countdown deadline of the live recommendation.
    pub fn deadline(&self) -> Option<Instant> {
        self.live.as_ref().map(|l| l.deadline)
    }

    /// Whole seconds left on the countdown, rounded up.
    pub fn seconds_remaining(&self, now: Instant) -> Option<u64> {
        self.deadline().map(|deadline| {
            let left = deadline.saturating_duration_since(now);
            left.as_millis().div_ceil(1000) as u64
        })
    }

    /// Check that `id` is the live, pending recommendation.
    pub fn ensure_pending(&self, id: RecommendationId) -> Result<&Recommendation> {
        match &self.live {
            Some(live) if live.recommendation.id == id => Ok(&live.recommendation),
            _ => match self.history.iter().find(|r| r.id == id) {
                Some(past) => Err(AoccError::not_pending(id, past.status)),
                None => Err(AoccError::RecommendationNotFound { id }),
            },
        }
    }

    /// Accept the live recommendation. Side effects are the caller's job.
    pub fn accept(&mut self, id: RecommendationId, wall_now: DateTime<Utc>) -> Result<Recommendation> {
        self.ensure_pending(id)?;
        self.close(RecommendationStatus::Accepted, None, wall_now)
            .ok_or(AoccError::RecommendationNotFound { id })
    }

    /// Dismiss the live recommendation.
    pub fn dismiss(&mut self, id: RecommendationId, wall_now: DateTime<Utc>) -> Result<Recommendation> {
        self.ensure_pending(id)?;
        self.close(
            RecommendationStatus::Dismissed,
            Some(DismissReason::Operator),
            wall_now,
        )
        .ok_or(AoccError::RecommendationNotFound { id })
    }

    /// Dismiss the live recommendation if its countdown has run out.
    pub fn expire(&mut self, now: Instant, wall_now: DateTime<Utc>) -> Option<Recommendation> {
        let due = self.live.as_ref().is_some_and(|l| l.deadline <= now);
        if !due {
            return None;
        }
        self.close(
            RecommendationStatus::Dismissed,
            Some(DismissReason::Expired),
            wall_now,
        )
    }

    /// Finished recommendations, oldest first.
    pub fn history(&self) -> &[Recommendation] {
        &self.history
    }

    /// Drop the live recommendation and its countdown without a transition.
    pub fn clear(&mut self) {
        if let Some(live) = self.live.take() {
            debug!(recommendation_id = live.recommendation.id, "live recommendation dropped");
        }
    }

    fn close(
        &mut self,
        status: RecommendationStatus,
        reason: Option<DismissReason>,
        wall_now: DateTime<Utc>,
    ) -> Option<Recommendation> {
        let mut recommendation = self.live.take()?.recommendation;
        recommendation.status = status;
        recommendation.closed_at = Some(wall_now);
        recommendation.dismiss_reason = reason;
        info!(
            recommendation_id = recommendation.id,
            status = %status,
            reason = ?reason,
            "recommendation closed"
        );
        self.history.push(recommendation.clone());
        Some(recommendation)
    }
}

/// Recommendation sending available security officers to `alert`.
///
/// `None` when the directory has no security officer to spare.
pub fn staff_response(alert: &Alert, directory: &dyn ResourceDirectory) -> Option<NewRecommendation> {
    let officers: Vec<ResourceRef> = directory
        .available_with_role(StaffRole::SecurityOfficer)
        .into_iter()
        .take(RESPONSE_TEAM_SIZE)
        .map(|m| m.id.clone())
        .collect();
    if officers.is_empty() {
        return None;
    }

    let description = format!(
        "{}. Deploy {} security officers to {}.",
        alert.message,
        officers.len(),
        alert.location
    );
    let recommendation = NewRecommendation::new(
        format!("Deploy Additional Staff to {}", alert.location),
        description,
        alert.location.clone(),
    )
    .for_alert(alert.id)
    .with_resources(officers);

    Some(match alert.confidence {
        Some(confidence) => recommendation.with_confidence(confidence),
        None => recommendation,
    })
}

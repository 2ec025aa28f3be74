//! The operator session.
//!
//! [`Session`] owns every piece of console state (system status, alert
//! registry, toast queue, live recommendation, confirmation gate, staff
//! directory) and is the only way to mutate it. It never spawns timers:
//! each timed entity carries a deadline, and [`Session::tick`] fires the
//! ones that are due against the injected [`Clock`]. The async driver in
//! [`crate::driver`] calls `tick` when the next deadline comes up; tests
//! call it after advancing a [`aocc_core::ManualClock`].
//!
//! Operator-facing failures are reported twice: as an `error` toast, the
//! way the dashboard would show them, and as the returned `Err`. Failures
//! of deferred work (a scheduled presentation that finds another
//! recommendation still pending) only have the toast.
//!
//! Raising an alert at or above `recommendations.trigger_severity` schedules
//! a staff recommendation for it, unless one is already live or queued.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use aocc_core::{
    AlertId, AoccConfig, AoccError, Clock, RecommendationId, Result, ScreenId, deadline_after,
    log_session_event,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::alert::{Alert, AlertBadge, AlertFilter, AlertRegistry, NewAlert};
use crate::confirmation::{ConfirmationGate, ConfirmationPrompt, ConfirmationRequest};
use crate::demo::{self, DEMO_ZONE, DemoSequence, DemoStep};
use crate::directory::{ResourceDirectory, StaffMember};
use crate::recommendation::{
    NewRecommendation, Recommendation, RecommendationLifecycle, staff_response,
};
use crate::status::{ProtocolState, SystemState, SystemStatus};
use crate::toast::{Toast, ToastId, ToastKind, ToastQueue};

/// Receiver of navigation requests emitted by the session.
pub trait Navigator: Send {
    fn navigate(&mut self, screen: ScreenId);
}

impl<F> Navigator for F
where
    F: FnMut(ScreenId) + Send,
{
    fn navigate(&mut self, screen: ScreenId) {
        self(screen)
    }
}

/// Consequential actions that go through the confirmation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum OperatorAction {
    Logout,
    InitiateProtocol,
    DeployStaff { alert_id: AlertId },
    AcknowledgeAlert { alert_id: AlertId },
}

/// Result of [`Session::confirm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The open request's action ran
    Completed(OperatorAction),
    /// Nothing was open
    AlreadyClosed,
}

#[derive(Debug, Clone)]
enum Task {
    Navigate(ScreenId),
    Present(Box<NewRecommendation>),
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    deadline: Instant,
    seq: u64,
    task: Task,
}

#[derive(Debug, Clone, Copy)]
enum Due {
    Toast(ToastId),
    Countdown,
    Task(usize),
}

/// Live recommendation plus its countdown, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationView {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub seconds_remaining: u64,
}

/// Point-in-time copy of everything the console renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub taken_at: chrono::DateTime<chrono::Utc>,
    pub status: SystemStatus,
    pub protocol: ProtocolState,
    pub badge: AlertBadge,
    pub alerts: Vec<Alert>,
    pub toasts: Vec<Toast>,
    pub recommendation: Option<RecommendationView>,
    pub confirmation: Option<ConfirmationPrompt>,
    pub staff: Vec<StaffMember>,
    pub screen: ScreenId,
    pub demo_step: u8,
    pub demo_paused: bool,
    pub disposed: bool,
}

/// Single-operator console state.
pub struct Session {
    config: AoccConfig,
    clock: Arc<dyn Clock>,
    system: SystemState,
    alerts: AlertRegistry,
    toasts: ToastQueue,
    recommendations: RecommendationLifecycle,
    gate: ConfirmationGate<OperatorAction>,
    directory: Box<dyn ResourceDirectory>,
    navigator: Option<Box<dyn Navigator>>,
    screen: ScreenId,
    scheduled: Vec<ScheduledTask>,
    toast_seq: HashMap<ToastId, u64>,
    countdown_seq: u64,
    next_seq: u64,
    alert_episodes: u32,
    demo: DemoSequence,
    disposed: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("status", &self.system.status())
            .field("alerts", &self.alerts.len())
            .field("toasts", &self.toasts.len())
            .field("recommendation", &self.recommendations.current().map(|r| r.id))
            .field("scheduled", &self.scheduled.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Session {
    /// Create a session in nominal status with the demo staff roster.
    pub fn new(config: AoccConfig, clock: Arc<dyn Clock>) -> Self {
        let toasts = ToastQueue::new(&config.toasts);
        let recommendations = RecommendationLifecycle::new(config.recommendations.auto_dismiss());
        log_session_event!("session_started");
        Self {
            config,
            clock,
            system: SystemState::new(),
            alerts: AlertRegistry::new(),
            toasts,
            recommendations,
            gate: ConfirmationGate::new(),
            directory: Box::new(demo::demo_staff()),
            navigator: None,
            screen: ScreenId::OperatorDashboard,
            scheduled: Vec::new(),
            toast_seq: HashMap::new(),
            countdown_seq: 0,
            next_seq: 0,
            alert_episodes: 0,
            demo: DemoSequence::new(),
            disposed: false,
        }
    }

    /// Replace the staff directory.
    pub fn with_directory(mut self, directory: Box<dyn ResourceDirectory>) -> Self {
        self.directory = directory;
        self
    }

    /// Attach a navigator.
    pub fn with_navigator(mut self, navigator: impl Navigator + 'static) -> Self {
        self.navigator = Some(Box::new(navigator));
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &AoccConfig {
        &self.config
    }

    pub fn status(&self) -> SystemStatus {
        self.system.status()
    }

    pub fn protocol(&self) -> ProtocolState {
        self.system.protocol()
    }

    pub fn alerts(&self) -> &AlertRegistry {
        &self.alerts
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    /// The live recommendation, if one is pending.
    pub fn recommendation(&self) -> Option<&Recommendation> {
        self.recommendations.current()
    }

    pub fn recommendation_history(&self) -> &[Recommendation] {
        self.recommendations.history()
    }

    /// Whole seconds left before the live recommendation auto-dismisses.
    pub fn seconds_remaining(&self) -> Option<u64> {
        self.recommendations.seconds_remaining(self.clock.now())
    }

    pub fn confirmation(&self) -> Option<ConfirmationPrompt> {
        self.gate.prompt()
    }

    pub fn directory(&self) -> &dyn ResourceDirectory {
        self.directory.as_ref()
    }

    /// Screen most recently navigated to.
    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    pub fn demo(&self) -> &DemoSequence {
        &self.demo
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Flip between nominal and alert.
    ///
    /// Entering alert mode seeds the demo alert set. When history is kept
    /// across episodes, seed entries whose location and category already
    /// have an active alert are skipped; existing alerts are never touched.
    /// Returning to nominal stands the protocol down.
    pub fn toggle_status(&mut self) -> Result<SystemStatus> {
        self.ensure_active()?;
        let status = self.system.toggle();
        let wall_now = self.clock.wall_now();

        match status {
            SystemStatus::Alert => {
                self.alert_episodes += 1;
                if self.alert_episodes > 1 && self.config.alerts.reset_history_on_reenter {
                    self.alerts.clear_history();
                }
                let fresh: Vec<NewAlert> = demo::demo_alert_set()
                    .into_iter()
                    .filter(|a| !self.alerts.has_active(&a.location, a.category))
                    .collect();
                let seeded = self.alerts.seed(fresh, wall_now);
                log_session_event!("status_alert", seeded = seeded.len(), episode = self.alert_episodes);
                self.notify(ToastKind::Warning, "System Alert Mode Activated");
                self.trigger_recommendation(&seeded);
            }
            SystemStatus::Nominal => {
                log_session_event!("status_nominal");
                self.notify(ToastKind::Success, "System Status: Nominal");
            }
        }
        Ok(status)
    }

    // =========================================================================
    // Toasts
    // =========================================================================

    /// Issue a toast. `duration` falls back to the configured default.
    pub fn show_toast(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> Result<ToastId> {
        self.ensure_active()?;
        let result = self.push_toast(kind, message, duration);
        self.surface(result)
    }

    /// Remove a toast early. Returns false if it was already gone.
    pub fn dismiss_toast(&mut self, id: &ToastId) -> bool {
        self.toast_seq.remove(id);
        self.toasts.dismiss(id)
    }

    // =========================================================================
    // Alerts
    // =========================================================================

    /// Raise an alert, scheduling a recommendation if it is severe enough.
    pub fn raise_alert(&mut self, alert: NewAlert) -> Result<AlertId> {
        self.ensure_active()?;
        let id = self.alerts.raise(alert, self.clock.wall_now());
        self.trigger_recommendation(&[id]);
        Ok(id)
    }

    pub fn query_alerts(&self, filter: &AlertFilter) -> Vec<&Alert> {
        self.alerts.query(filter)
    }

    /// Resolve an alert and confirm it with a toast.
    pub fn resolve_alert(&mut self, id: AlertId) -> Result<()> {
        self.ensure_active()?;
        let result = self.resolve_with_toast(id, |location| format!("Alert acknowledged: {location}"));
        self.surface(result)
    }

    fn resolve_with_toast(&mut self, id: AlertId, message: impl FnOnce(&str) -> String) -> Result<()> {
        let wall_now = self.clock.wall_now();
        let location = self.alerts.resolve(id, wall_now)?.location.clone();
        log_session_event!("alert_resolved", alert_id = id, location = %location);
        self.notify(ToastKind::Success, message(&location));
        Ok(())
    }

    // =========================================================================
    // Recommendations
    // =========================================================================

    /// Present a recommendation now.
    pub fn present_recommendation(&mut self, recommendation: NewRecommendation) -> Result<RecommendationId> {
        self.ensure_active()?;
        let result = self.present_now(recommendation);
        self.surface(result)
    }

    /// Present a recommendation after `delay` (default: the configured
    /// presentation delay). Replaces a presentation that is still queued.
    pub fn schedule_recommendation(
        &mut self,
        recommendation: NewRecommendation,
        delay: Option<Duration>,
    ) -> Result<()> {
        self.ensure_active()?;
        let delay = delay.unwrap_or(self.config.recommendations.presentation_delay());
        let result = self.schedule(delay, Task::Present(Box::new(recommendation)));
        self.surface(result)
    }

    /// Whether a presentation is waiting for its deadline.
    pub fn has_scheduled_presentation(&self) -> bool {
        self.scheduled
            .iter()
            .any(|t| matches!(t.task, Task::Present(_)))
    }

    fn trigger_recommendation(&mut self, raised: &[AlertId]) {
        let Some(alert) = raised
            .iter()
            .filter_map(|id| self.alerts.get(*id))
            .find(|a| self.config.recommendations.triggers_on(a.severity))
        else {
            return;
        };
        let alert_id = alert.id;
        if self.recommendations.current().is_some() || self.has_scheduled_presentation() {
            debug!(alert_id, "recommendation already in flight, trigger skipped");
            return;
        }
        let Some(recommendation) = staff_response(alert, self.directory.as_ref()) else {
            debug!(alert_id, "no security officers available, trigger skipped");
            return;
        };

        let delay = self.config.recommendations.presentation_delay();
        match self.schedule(delay, Task::Present(Box::new(recommendation))) {
            Ok(()) => log_session_event!("recommendation_triggered", alert_id),
            Err(e) => warn!(error = %e, alert_id, "triggered recommendation not scheduled"),
        }
    }

    /// Accept the live recommendation.
    ///
    /// The suggested staff are reassigned, a success toast is shown, and the
    /// console navigates to staff allocation after the configured delay.
    pub fn accept_recommendation(&mut self, id: RecommendationId) -> Result<()> {
        self.ensure_active()?;
        let result = self.accept_now(id);
        self.surface(result)
    }

    fn accept_now(&mut self, id: RecommendationId) -> Result<()> {
        let pending = self.recommendations.ensure_pending(id)?;
        if let Some(missing) = self.directory.find_missing(&pending.suggested_resources) {
            return Err(AoccError::ResourceNotFound {
                resource: missing.clone(),
            });
        }

        let accepted = self.recommendations.accept(id, self.clock.wall_now())?;
        self.directory
            .reassign(&accepted.suggested_resources, &accepted.assignment)?;
        log_session_event!(
            "recommendation_accepted",
            recommendation_id = id,
            staff = accepted.suggested_resources.len()
        );

        self.notify(
            ToastKind::Success,
            format!("Staff deployed to {}", accepted.assignment),
        );
        let delay = self.config.recommendations.accept_navigation_delay();
        self.schedule(delay, Task::Navigate(ScreenId::StaffAllocation))
    }

    /// Dismiss the live recommendation. Staff are left alone.
    pub fn dismiss_recommendation(&mut self, id: RecommendationId) -> Result<()> {
        self.ensure_active()?;
        let result = self
            .recommendations
            .dismiss(id, self.clock.wall_now())
            .map(|_| log_session_event!("recommendation_dismissed", recommendation_id = id));
        self.surface(result)
    }

    fn present_now(&mut self, recommendation: NewRecommendation) -> Result<RecommendationId> {
        let id = self
            .recommendations
            .present(recommendation, self.clock.now(), self.clock.wall_now())?;
        self.countdown_seq = self.take_seq();
        log_session_event!("recommendation_presented", recommendation_id = id);
        Ok(id)
    }

    // =========================================================================
    // Confirmation gate
    // =========================================================================

    /// Ask to log out.
    pub fn request_logout(&mut self) -> Result<Option<ConfirmationPrompt>> {
        self.ensure_active()?;
        let request = ConfirmationRequest::new(
            "Log Out?",
            "End this operator session and return to the landing screen.",
            OperatorAction::Logout,
        )
        .with_confirm_label("LOG OUT")
        .dangerous();
        Ok(self.open_gate(request))
    }

    /// Ask to start the crowd-control protocol. Only allowed in alert mode.
    pub fn request_protocol(&mut self) -> Result<Option<ConfirmationPrompt>> {
        self.ensure_active()?;
        let available = self.system.ensure_protocol_available();
        self.surface(available)?;
        let request = ConfirmationRequest::new(
            "Initiate Crowd Control?",
            "Security teams will be dispatched to every affected zone.",
            OperatorAction::InitiateProtocol,
        )
        .with_confirm_label("INITIATE PROTOCOL")
        .dangerous();
        Ok(self.open_gate(request))
    }

    /// Ask to deploy staff against an active alert.
    pub fn request_deploy_staff(&mut self, alert_id: AlertId) -> Result<Option<ConfirmationPrompt>> {
        self.ensure_active()?;
        let location = self.active_alert_location(alert_id);
        let location = self.surface(location)?;
        let request = ConfirmationRequest::new(
            "Deploy Staff?",
            format!("Deploy available staff to {location}."),
            OperatorAction::DeployStaff { alert_id },
        )
        .with_confirm_label("DEPLOY");
        Ok(self.open_gate(request))
    }

    /// Ask to acknowledge an active alert.
    pub fn request_acknowledge(&mut self, alert_id: AlertId) -> Result<Option<ConfirmationPrompt>> {
        self.ensure_active()?;
        let location = self.active_alert_location(alert_id);
        let location = self.surface(location)?;
        let request = ConfirmationRequest::new(
            "Acknowledge Alert?",
            format!("Mark the alert at {location} as handled."),
            OperatorAction::AcknowledgeAlert { alert_id },
        )
        .with_confirm_label("ACKNOWLEDGE");
        Ok(self.open_gate(request))
    }

    /// Run the open request's action. Closing a closed gate is not an error.
    pub fn confirm(&mut self) -> Result<ConfirmOutcome> {
        self.ensure_active()?;
        let Some(action) = self.gate.confirm() else {
            debug!("confirm with no open request");
            return Ok(ConfirmOutcome::AlreadyClosed);
        };
        log_session_event!("confirmation_accepted", action = ?action);
        let result = self.run_action(action);
        self.surface(result).map(|()| ConfirmOutcome::Completed(action))
    }

    /// Close the open request without running it.
    pub fn cancel(&mut self) -> bool {
        let closed = self.gate.cancel();
        if closed {
            log_session_event!("confirmation_cancelled");
        }
        closed
    }

    fn open_gate(&mut self, request: ConfirmationRequest<OperatorAction>) -> Option<ConfirmationPrompt> {
        log_session_event!("confirmation_requested", action = ?request.action);
        self.gate.request(request).map(|displaced| {
            debug!(action = ?displaced.action, "displaced confirmation dropped");
            displaced.prompt()
        })
    }

    fn run_action(&mut self, action: OperatorAction) -> Result<()> {
        match action {
            OperatorAction::Logout => {
                self.navigate(ScreenId::OperatorLanding);
                self.dispose();
                Ok(())
            }
            OperatorAction::InitiateProtocol => {
                self.system.activate_protocol(self.clock.wall_now())?;
                self.notify(
                    ToastKind::Success,
                    "Protocol Initiated: security teams have been dispatched",
                );
                Ok(())
            }
            OperatorAction::DeployStaff { alert_id } => {
                self.resolve_with_toast(alert_id, |location| format!("Staff deployed to {location}"))
            }
            OperatorAction::AcknowledgeAlert { alert_id } => {
                self.resolve_with_toast(alert_id, |location| format!("Alert acknowledged: {location}"))
            }
        }
    }

    fn active_alert_location(&self, alert_id: AlertId) -> Result<String> {
        match self.alerts.get(alert_id) {
            None => Err(AoccError::AlertNotFound { id: alert_id }),
            Some(alert) if !alert.is_active() => Err(AoccError::AlertAlreadyResolved { id: alert_id }),
            Some(alert) => Ok(alert.location.clone()),
        }
    }

    // =========================================================================
    // Demo sequence
    // =========================================================================

    /// Advance the demo sequence and apply its step.
    pub fn demo_next(&mut self) -> Result<Option<DemoStep>> {
        self.ensure_active()?;
        let Some(step) = self.demo.next_step() else {
            return Ok(None);
        };
        log_session_event!("demo_step", step = self.demo.step());

        match step {
            DemoStep::RaiseAlert => {
                if !self.status().is_alert() {
                    self.toggle_status()?;
                }
            }
            DemoStep::ScheduleRecommendation => {
                let alert_id = self
                    .alerts
                    .query(&AlertFilter::active())
                    .into_iter()
                    .find(|a| a.location == DEMO_ZONE)
                    .map(|a| a.id);
                self.schedule_recommendation(demo::demo_recommendation(alert_id), None)?;
            }
            DemoStep::AcceptRecommendation => {
                if let Some(id) = self.recommendation().map(|r| r.id) {
                    self.accept_recommendation(id)?;
                }
            }
            DemoStep::Narration(_) => {}
        }
        Ok(Some(step))
    }

    pub fn demo_reset(&mut self) {
        self.demo.reset();
    }

    pub fn demo_toggle_pause(&mut self) -> bool {
        self.demo.toggle_pause()
    }

    // =========================================================================
    // Deadlines
    // =========================================================================

    /// Earliest pending deadline across toasts, countdown and scheduled tasks.
    pub fn next_deadline(&self) -> Option<Instant> {
        let tasks = self.scheduled.iter().map(|t| t.deadline).min();
        [self.toasts.next_deadline(), self.recommendations.deadline(), tasks]
            .into_iter()
            .flatten()
            .min()
    }

    /// Fire every deadline that is due, earliest first. Returns how many fired.
    pub fn tick(&mut self) -> usize {
        let mut fired = 0;
        while !self.disposed {
            let now = self.clock.now();
            let Some(due) = self.next_due(now) else {
                break;
            };
            self.fire(due, now);
            fired += 1;
        }
        fired
    }

    fn next_due(&self, now: Instant) -> Option<Due> {
        let toasts = self.toasts.iter().filter_map(|t| {
            let deadline = t.expires_at()?;
            let seq = self.toast_seq.get(&t.id).copied().unwrap_or_default();
            Some((deadline, seq, Due::Toast(t.id)))
        });
        let countdown = self
            .recommendations
            .deadline()
            .map(|deadline| (deadline, self.countdown_seq, Due::Countdown));
        let tasks = self
            .scheduled
            .iter()
            .enumerate()
            .map(|(index, t)| (t.deadline, t.seq, Due::Task(index)));

        toasts
            .chain(countdown)
            .chain(tasks)
            .filter(|(deadline, _, _)| *deadline <= now)
            .min_by_key(|(deadline, seq, _)| (*deadline, *seq))
            .map(|(_, _, due)| due)
    }

    fn fire(&mut self, due: Due, now: Instant) {
        match due {
            Due::Toast(id) => {
                self.dismiss_toast(&id);
                debug!(toast_id = %id, "toast expired");
            }
            Due::Countdown => {
                if let Some(expired) = self.recommendations.expire(now, self.clock.wall_now()) {
                    log_session_event!("recommendation_expired", recommendation_id = expired.id);
                }
            }
            Due::Task(index) => {
                let scheduled = self.scheduled.remove(index);
                match scheduled.task {
                    Task::Navigate(screen) => self.navigate(screen),
                    Task::Present(recommendation) => {
                        if let Err(e) = self.present_now(*recommendation) {
                            warn!(error = %e, "scheduled recommendation not presented");
                            self.notify(ToastKind::Error, e.to_string());
                        }
                    }
                }
            }
        }
    }

    /// Queue `task`. At most one presentation is queued; a new one replaces it.
    fn schedule(&mut self, delay: Duration, task: Task) -> Result<()> {
        let deadline = deadline_after(self.clock.now(), delay)?;
        if matches!(task, Task::Present(_)) && self.has_scheduled_presentation() {
            self.scheduled.retain(|t| !matches!(t.task, Task::Present(_)));
            debug!("queued presentation replaced");
        }
        let seq = self.take_seq();
        debug!(?task, delay_ms = delay.as_millis() as u64, "task scheduled");
        self.scheduled.push(ScheduledTask { deadline, seq, task });
        Ok(())
    }

    // =========================================================================
    // Snapshot and teardown
    // =========================================================================

    /// Copy of the current render state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let now = self.clock.now();
        let recommendation = self.recommendations.current().map(|r| RecommendationView {
            recommendation: r.clone(),
            seconds_remaining: self.recommendations.seconds_remaining(now).unwrap_or(0),
        });
        SessionSnapshot {
            taken_at: self.clock.wall_now(),
            status: self.system.status(),
            protocol: self.system.protocol(),
            badge: self.alerts.badge(),
            alerts: self.alerts.all().cloned().collect(),
            toasts: self.toasts.iter().cloned().collect(),
            recommendation,
            confirmation: self.gate.prompt(),
            staff: self.directory.members().into_iter().cloned().collect(),
            screen: self.screen,
            demo_step: self.demo.step(),
            demo_paused: self.demo.is_paused(),
            disposed: self.disposed,
        }
    }

    /// Tear the session down. Every pending deadline is dropped and no
    /// further mutation is accepted. Safe to call twice.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.toasts.clear();
        self.toast_seq.clear();
        self.recommendations.clear();
        self.scheduled.clear();
        self.gate.cancel();
        log_session_event!("session_disposed");
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn ensure_active(&self) -> Result<()> {
        if self.disposed {
            return Err(AoccError::SessionDisposed);
        }
        Ok(())
    }

    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn push_toast(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> Result<ToastId> {
        let (id, evicted) = self
            .toasts
            .show(kind, message, duration, self.clock.now(), self.clock.wall_now())?;
        if let Some(old) = evicted {
            self.toast_seq.remove(&old.id);
        }
        let seq = self.take_seq();
        self.toast_seq.insert(id, seq);
        Ok(id)
    }

    /// Toast with the configured duration, for the session's own messages.
    fn notify(&mut self, kind: ToastKind, message: impl Into<String>) {
        if let Err(e) = self.push_toast(kind, message, None) {
            warn!(error = %e, "toast not shown");
        }
    }

    /// Show an error toast for a failed operator action and pass the result on.
    fn surface<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result
            && !self.disposed
        {
            warn!(error = %e, kind = ?e.kind(), "operator action failed");
            self.notify(ToastKind::Error, e.to_string());
        }
        result
    }

    fn navigate(&mut self, screen: ScreenId) {
        self.screen = screen;
        log_session_event!("navigate", screen = %screen);
        if let Some(navigator) = self.navigator.as_mut() {
            navigator.navigate(screen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aocc_core::ManualClock;

    fn session() -> (Session, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (Session::new(AoccConfig::default(), clock.clone()), clock)
    }

    #[test]
    fn test_toggle_seeds_and_toasts() {
        let (mut s, _) = session();
        assert_eq!(s.toggle_status().unwrap(), SystemStatus::Alert);
        assert_eq!(s.alerts().active_count(), 3);
        let toast = s.toasts().iter().last().unwrap();
        assert_eq!(toast.kind, ToastKind::Warning);
    }

    #[test]
    fn test_reentry_keeps_history_by_default() {
        let (mut s, _) = session();
        s.toggle_status().unwrap();
        let first = s.alerts().query(&AlertFilter::active())[0].id;
        s.resolve_alert(first).unwrap();
        let untouched: Vec<Alert> = s.alerts().all().skip(1).cloned().collect();
        s.toggle_status().unwrap();
        s.toggle_status().unwrap();

        // Resolved alert kept; only its condition is raised again
        assert_eq!(s.alerts().len(), 4);
        assert_eq!(s.alerts().active_count(), 3);
        let reraised = s.alerts().get(4).unwrap();
        assert_eq!(reraised.location, s.alerts().get(first).unwrap().location);
        for alert in &untouched {
            assert_eq!(s.alerts().get(alert.id), Some(alert));
        }
    }

    #[test]
    fn test_reentry_resets_history_when_configured() {
        let clock = Arc::new(ManualClock::new());
        let config = AoccConfig::default().with_reset_history_on_reenter(true);
        let mut s = Session::new(config, clock);
        s.toggle_status().unwrap();
        s.toggle_status().unwrap();
        s.toggle_status().unwrap();
        assert_eq!(s.alerts().len(), 3);
    }

    #[test]
    fn test_failed_action_toasts_error() {
        let (mut s, _) = session();
        let err = s.resolve_alert(42).unwrap_err();
        assert!(err.is_not_found());
        let toast = s.toasts().iter().last().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Alert not found: 42");
    }

    #[test]
    fn test_next_deadline_tracks_earliest() {
        let (mut s, clock) = session();
        assert_eq!(s.next_deadline(), None);
        s.show_toast(ToastKind::Info, "x", Some(Duration::from_millis(200))).unwrap();
        s.show_toast(ToastKind::Info, "y", None).unwrap();
        assert_eq!(s.next_deadline(), Some(clock.now() + Duration::from_millis(200)));
    }

    #[test]
    fn test_oversized_toast_is_refused_without_panic() {
        let (mut s, _) = session();
        let err = s.show_toast(ToastKind::Info, "x", Some(Duration::MAX)).unwrap_err();
        assert!(matches!(err, AoccError::TimerOutOfRange { .. }));

        let messages: Vec<_> = s.toasts().iter().map(|t| (t.kind, t.message.clone())).collect();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, ToastKind::Error);
        assert!(messages[0].1.contains("exceeds"));
    }

    #[test]
    fn test_oversized_schedule_delay_is_refused() {
        let (mut s, _) = session();
        let rec = demo::demo_recommendation(None);
        let err = s.schedule_recommendation(rec, Some(Duration::MAX)).unwrap_err();
        assert!(matches!(err, AoccError::TimerOutOfRange { .. }));
        assert!(!s.has_scheduled_presentation());
    }

    #[test]
    fn test_unvalidated_config_is_capped() {
        let clock = Arc::new(ManualClock::new());
        let config = AoccConfig::default().with_auto_dismiss_secs(u64::MAX);
        let mut s = Session::new(config, clock);
        s.present_recommendation(demo::demo_recommendation(None)).unwrap();
        assert_eq!(s.seconds_remaining(), Some(aocc_core::MAX_TIMER_DELAY.as_secs()));
    }

    #[test]
    fn test_dispose_rejects_mutation() {
        let (mut s, _) = session();
        s.dispose();
        s.dispose();
        assert!(matches!(s.toggle_status(), Err(AoccError::SessionDisposed)));
        assert!(s.snapshot().disposed);
    }
}

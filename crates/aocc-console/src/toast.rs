//! Self-expiring toast notifications.
//!
//! Toasts stack in insertion order (newest last) and never replace each
//! other. Each toast owns a single deadline, `issued + duration`; once the
//! clock reaches it, [`ToastQueue::expire`] removes the toast. Explicit
//! dismissal removes it earlier and is idempotent.
//!
//! Durations longer than [`aocc_core::MAX_TIMER_DELAY`] are refused rather
//! than scheduled.
//!
//! The queue is bounded by `max_visible`. Issuing a toast while the queue is
//! full evicts the oldest one so the newest message is always shown.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use aocc_core::config::ToastConfig;
use aocc_core::{Result, deadline_after};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Toast flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Success => "✔",
            Self::Error => "✖",
            Self::Warning => "⚠",
            Self::Info => "ℹ",
        }
    }
}

/// Toast identifier: issue time, a per-queue sequence number and a random
/// nonce. The sequence alone makes ids unique within a queue, even when
/// several toasts are issued in the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ToastId {
    issued_ms: i64,
    seq: u64,
    nonce: u16,
}

impl std::fmt::Display for ToastId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:x}-{}-{:04x}", self.issued_ms, self.seq, self.nonce)
    }
}

/// A visible toast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
    pub duration_ms: u64,
    pub issued_at: DateTime<Utc>,
    #[serde(skip)]
    expires_at: Option<Instant>,
}

impl Toast {
    /// Monotonic deadline at which this toast removes itself.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    pub fn format_line(&self) -> String {
        format!("{} {}", self.kind.icon(), self.message)
    }
}

/// Bounded stack of toasts.
#[derive(Debug, Clone)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    next_seq: u64,
    default_duration: Duration,
    max_visible: usize,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(&ToastConfig::default())
    }
}

impl ToastQueue {
    /// Create an empty queue.
    pub fn new(config: &ToastConfig) -> Self {
        Self {
            toasts: VecDeque::new(),
            next_seq: 0,
            default_duration: config.default_duration(),
            max_visible: config.max_visible.max(1),
        }
    }

    /// Issue a toast. `duration` falls back to the configured default.
    ///
    /// Returns the new id and, when the queue was full, the evicted toast.
    /// An out-of-range duration fails before anything is shown or evicted.
    pub fn show(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        duration: Option<Duration>,
        now: Instant,
        wall_now: DateTime<Utc>,
    ) -> Result<(ToastId, Option<Toast>)> {
        let duration = duration.unwrap_or(self.default_duration);
        let expires_at = deadline_after(now, duration)?;
        let id = ToastId {
            issued_ms: wall_now.timestamp_millis(),
            seq: self.next_seq,
            nonce: rand::random::<u16>(),
        };
        self.next_seq += 1;

        let evicted = if self.toasts.len() >= self.max_visible {
            self.toasts.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            debug!(toast_id = %old.id, "toast evicted by overflow");
        }

        let toast = Toast {
            id,
            kind,
            message: message.into(),
            duration_ms: duration.as_millis() as u64,
            issued_at: wall_now,
            expires_at: Some(expires_at),
        };
        debug!(toast_id = %id, kind = ?kind, message = %toast.message, "toast shown");
        self.toasts.push_back(toast);

        Ok((id, evicted))
    }

    /// Remove a toast before its deadline. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: &ToastId) -> bool {
        match self.toasts.iter().position(|t| &t.id == id) {
            Some(index) => {
                self.toasts.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove and return every toast whose deadline has passed.
    pub fn expire(&mut self, now: Instant) -> Vec<Toast> {
        let mut expired = Vec::new();
        self.toasts.retain(|t| {
            let due = t.expires_at.is_some_and(|at| at <= now);
            if due {
                expired.push(t.clone());
            }
            !due
        });
        expired
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.toasts.iter().filter_map(|t| t.expires_at).min()
    }

    /// Visible toasts, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn contains(&self, id: &ToastId) -> bool {
        self.toasts.iter().any(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Drop every toast and its deadline.
    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue(max_visible: usize) -> ToastQueue {
        ToastQueue::new(&ToastConfig {
            default_duration_ms: 3000,
            max_visible,
        })
    }

    #[test]
    fn test_ids_unique_within_same_instant() {
        let mut q = queue(10);
        let now = Instant::now();
        let wall = Utc::now();
        let (a, _) = q.show(ToastKind::Info, "one", None, now, wall).unwrap();
        let (b, _) = q.show(ToastKind::Info, "two", None, now, wall).unwrap();
        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_expiry_is_exact() {
        let mut q = queue(5);
        let t0 = Instant::now();
        let (id, _) = q.show(ToastKind::Success, "Staff deployed", None, t0, Utc::now()).unwrap();

        assert!(q.expire(t0 + Duration::from_millis(2999)).is_empty());
        assert!(q.contains(&id));

        let expired = q.expire(t0 + Duration::from_millis(3001));
        assert_eq!(expired.len(), 1);
        assert!(!q.contains(&id));
    }

    #[test]
    fn test_custom_duration() {
        let mut q = queue(5);
        let t0 = Instant::now();
        let (short, _) = q.show(ToastKind::Info, "short", Some(Duration::from_millis(500)), t0, Utc::now()).unwrap();
        let (long, _) = q.show(ToastKind::Info, "long", None, t0, Utc::now()).unwrap();

        assert_eq!(q.next_deadline(), Some(t0 + Duration::from_millis(500)));
        q.expire(t0 + Duration::from_millis(500));
        assert!(!q.contains(&short));
        assert!(q.contains(&long));
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut q = queue(5);
        let (id, _) = q.show(ToastKind::Warning, "w", None, Instant::now(), Utc::now()).unwrap();
        assert!(q.dismiss(&id));
        assert!(!q.dismiss(&id));
        assert!(q.is_empty());
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut q = queue(2);
        let now = Instant::now();
        let (first, _) = q.show(ToastKind::Info, "1", None, now, Utc::now()).unwrap();
        q.show(ToastKind::Info, "2", None, now, Utc::now()).unwrap();
        let (_, evicted) = q.show(ToastKind::Info, "3", None, now, Utc::now()).unwrap();

        assert_eq!(evicted.map(|t| t.id), Some(first));
        let messages: Vec<_> = q.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["2", "3"]);
    }

    #[test]
    fn test_oversized_duration_is_refused() {
        let mut q = queue(1);
        let now = Instant::now();
        let (kept, _) = q.show(ToastKind::Info, "kept", None, now, Utc::now()).unwrap();

        let err = q
            .show(ToastKind::Info, "x", Some(Duration::MAX), now, Utc::now())
            .unwrap_err();
        assert!(matches!(err, aocc_core::AoccError::TimerOutOfRange { .. }));
        assert!(q.contains(&kept));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_clear_drops_deadlines() {
        let mut q = queue(5);
        q.show(ToastKind::Info, "x", None, Instant::now(), Utc::now()).unwrap();
        q.clear();
        assert_eq!(q.next_deadline(), None);
    }
}

//! Confirmation gate for consequential operator actions.
//!
//! The gate holds at most one open [`ConfirmationRequest`]. Requesting while a
//! request is open replaces it; the displaced request is handed back and its
//! action is never run. Confirming takes the action out of the gate before
//! anything runs it, so the gate is closed even if the action panics.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A pending question to the operator plus the deferred action behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationRequest<A> {
    /// Title of the confirmation dialog.
    pub title: String,

    /// What will happen on confirm.
    pub message: String,

    /// Label of the confirm button.
    pub confirm_label: String,

    /// Destructive or irreversible action.
    pub is_dangerous: bool,

    /// Deferred operation, run at most once.
    pub action: A,
}

impl<A> ConfirmationRequest<A> {
    pub fn new(title: impl Into<String>, message: impl Into<String>, action: A) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: "Confirm".to_string(),
            is_dangerous: false,
            action,
        }
    }

    pub fn with_confirm_label(mut self, label: impl Into<String>) -> Self {
        self.confirm_label = label.into();
        self
    }

    pub fn dangerous(mut self) -> Self {
        self.is_dangerous = true;
        self
    }

    /// Render-only view of this request.
    pub fn prompt(&self) -> ConfirmationPrompt {
        ConfirmationPrompt {
            title: self.title.clone(),
            message: self.message.clone(),
            confirm_label: self.confirm_label.clone(),
            is_dangerous: self.is_dangerous,
        }
    }
}

/// The dialog text of an open request, without its action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub is_dangerous: bool,
}

/// Single-slot holder for the open confirmation request.
#[derive(Debug)]
pub struct ConfirmationGate<A> {
    open: Option<ConfirmationRequest<A>>,
}

impl<A> Default for ConfirmationGate<A> {
    fn default() -> Self {
        Self { open: None }
    }
}

impl<A> ConfirmationGate<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a request. Returns the request it displaced, if any.
    pub fn request(&mut self, request: ConfirmationRequest<A>) -> Option<ConfirmationRequest<A>> {
        let displaced = self.open.replace(request);
        if let Some(old) = &displaced {
            debug!(title = %old.title, "confirmation request displaced");
        }
        displaced
    }

    /// Close the gate and hand out the action. `None` when already closed.
    pub fn confirm(&mut self) -> Option<A> {
        self.open.take().map(|request| request.action)
    }

    /// Close the gate without running the action. Returns false if nothing was open.
    pub fn cancel(&mut self) -> bool {
        self.open.take().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn prompt(&self) -> Option<ConfirmationPrompt> {
        self.open.as_ref().map(ConfirmationRequest::prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[test]
    fn test_confirm_runs_exactly_once() {
        let mut gate = ConfirmationGate::new();
        gate.request(ConfirmationRequest::new("Logout?", "End the session", 1));

        let mut runs = 0;
        for _ in 0..2 {
            if let Some(action) = gate.confirm() {
                assert_eq!(action, 1);
                runs += 1;
            }
        }
        assert_eq!(runs, 1);
        assert!(!gate.is_open());
    }

    #[test]
    fn test_cancel_never_runs() {
        let mut gate = ConfirmationGate::new();
        gate.request(ConfirmationRequest::new("t", "m", "action"));
        assert!(gate.cancel());
        assert!(!gate.cancel());
        assert_eq!(gate.confirm(), None);
    }

    #[test]
    fn test_rerequest_displaces_previous() {
        let mut gate = ConfirmationGate::new();
        assert!(gate.request(ConfirmationRequest::new("first", "m", 1)).is_none());
        let displaced = gate.request(ConfirmationRequest::new("second", "m", 2)).unwrap();

        assert_eq!(displaced.action, 1);
        assert_eq!(gate.prompt().unwrap().title, "second");
        assert_eq!(gate.confirm(), Some(2));
    }

    #[test]
    fn test_closed_even_if_action_panics() {
        let mut gate = ConfirmationGate::new();
        gate.request(ConfirmationRequest::new("t", "m", ()));

        let result = catch_unwind(AssertUnwindSafe(|| {
            if let Some(()) = gate.confirm() {
                panic!("action failed");
            }
        }));
        assert!(result.is_err());
        assert!(!gate.is_open());
    }

    #[test]
    fn test_dangerous_prompt() {
        let request = ConfirmationRequest::new("Initiate Crowd Control?", "m", ())
            .with_confirm_label("INITIATE PROTOCOL")
            .dangerous();
        let prompt = request.prompt();
        assert!(prompt.is_dangerous);
        assert_eq!(prompt.confirm_label, "INITIATE PROTOCOL");
    }
}

//! Operator console state for the AOCC command center.
//!
//! This crate holds everything the operator dashboard renders and every
//! action it can take, without any UI of its own.
//!
//! ## Components
//!
//! - [`toast`] - Self-expiring notifications
//! - [`recommendation`] - Single live recommendation with an auto-dismiss countdown
//! - [`alert`] - Alert registry with one-way resolution and filtered views
//! - [`status`] - Nominal/alert toggle and the crowd-control protocol
//! - [`confirmation`] - Confirm/cancel gate for consequential actions
//! - [`session`] - The state container that wires them together
//! - [`driver`] - Tokio task that owns a session and fires its deadlines
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use aocc_console::Session;
//! use aocc_core::{AoccConfig, SystemClock};
//!
//! let mut session = Session::new(AoccConfig::default(), Arc::new(SystemClock));
//! session.toggle_status()?;
//! session.tick();
//! println!("{}", session.alerts().badge().format_header());
//! # Ok::<(), aocc_core::AoccError>(())
//! ```

pub mod alert;
pub mod confirmation;
pub mod demo;
pub mod directory;
pub mod driver;
pub mod recommendation;
pub mod session;
pub mod status;
pub mod toast;

pub use alert::{
    Alert, AlertBadge, AlertCategory, AlertFilter, AlertRegistry, AlertSeverity, AlertStatus, NewAlert,
};
pub use confirmation::{ConfirmationGate, ConfirmationPrompt, ConfirmationRequest};
pub use demo::{DemoSequence, DemoStep};
pub use directory::{DutyStatus, ResourceDirectory, StaffMember, StaffRole, StaffRoster};
pub use driver::SessionHandle;
pub use recommendation::{
    NewRecommendation, Recommendation, RecommendationLifecycle, RecommendationStatus,
};
pub use session::{
    ConfirmOutcome, Navigator, OperatorAction, RecommendationView, Session, SessionSnapshot,
};
pub use status::{ProtocolState, SystemState, SystemStatus};
pub use toast::{Toast, ToastId, ToastKind, ToastQueue};

//! # aocc-core
//!
//! Core types, errors, and utilities for the AOCC command center.
//!
//! This crate provides:
//! - [`AoccError`] - Error type shared by every AOCC crate
//! - [`logging`] - Tracing setup
//! - [`config`] - YAML configuration with defaults
//! - [`clock`] - Injectable time sources for deadlines
//! - [`types`] - Ids, resource references and navigation targets
//!
//! ## Example
//!
//! ```no_run
//! use aocc_core::{AoccConfig, logging};
//!
//! fn main() -> aocc_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!     let config = AoccConfig::load_or_default()?;
//!     tracing::info!(max_toasts = config.toasts.max_visible, "configured");
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export main types for convenience
pub use clock::{Clock, MAX_TIMER_DELAY, ManualClock, SystemClock, TokioClock, deadline_after};
pub use config::AoccConfig;
pub use error::{AoccError, ErrorKind, Result};
pub use logging::{LogGuard, init_logging};
pub use types::{AlertId, AlertSeverity, RecommendationId, ResourceRef, ScreenId};

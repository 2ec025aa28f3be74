//! Error types for AOCC operations.
//!
//! This module defines [`AoccError`], the error enum shared by every AOCC
//! crate. Every failure an operator action can hit is a local, recoverable
//! condition: mutators return a [`Result`] and the caller decides whether to
//! surface it (usually as an `error` toast). Nothing here is meant to crash
//! the session.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{AlertId, RecommendationId, ResourceRef};

/// Result type alias using [`AoccError`].
pub type Result<T> = std::result::Result<T, AoccError>;

/// Coarse classification of an [`AoccError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An id did not match any known entity
    NotFound,
    /// The entity exists but is not in the status the operation needs
    InvalidState,
    /// Configuration could not be read or is invalid
    Config,
    /// Filesystem failure
    Io,
    /// Bug in AOCC
    Internal,
}

/// Error type for all AOCC operations.
#[derive(Debug, Error)]
pub enum AoccError {
    // =========================================================================
    // Alert Errors
    // =========================================================================
    /// No alert with this id exists in the registry
    #[error("Alert not found: {id}")]
    AlertNotFound { id: AlertId },

    /// Alert was already resolved (resolution is one-way)
    #[error("Alert {id} is already resolved")]
    AlertAlreadyResolved { id: AlertId },

    /// Crowd-control protocol can only be started while the system is in alert mode
    #[error("Protocol unavailable while system status is {status}")]
    ProtocolUnavailable { status: String },

    /// Crowd-control protocol is already running
    #[error("Protocol already active")]
    ProtocolAlreadyActive,

    // =========================================================================
    // Recommendation Errors
    // =========================================================================
    /// No live recommendation has this id
    #[error("Recommendation not found: {id}")]
    RecommendationNotFound { id: RecommendationId },

    /// Recommendation is not pending (already accepted or dismissed)
    #[error("Recommendation {id} is {status}, expected pending")]
    RecommendationNotPending { id: RecommendationId, status: String },

    /// Another recommendation is still pending
    #[error("Recommendation {pending} is still pending; cannot present {rejected}")]
    RecommendationAlreadyPending {
        pending: RecommendationId,
        rejected: RecommendationId,
    },

    // =========================================================================
    // Resource Directory Errors
    // =========================================================================
    /// Suggested resource does not exist in the directory
    #[error("Resource not found: {resource}")]
    ResourceNotFound { resource: ResourceRef },

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// Session was torn down; no further mutation is accepted
    #[error("Session has been disposed")]
    SessionDisposed,

    /// Async driver task is gone (channel closed)
    #[error("Session driver stopped: {message}")]
    DriverStopped { message: String },

    /// Timer delay longer than the console accepts
    #[error("Timer delay of {delay_ms} ms exceeds the {max_ms} ms limit")]
    TimerOutOfRange { delay_ms: u64, max_ms: u64 },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in AOCC)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AoccError {
    // =========================================================================
    // Constructor helpers
    // =========================================================================

    /// Create a ConfigNotFound error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a ConfigValidation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a RecommendationNotPending error
    pub fn not_pending(id: RecommendationId, status: impl std::fmt::Display) -> Self {
        Self::RecommendationNotPending {
            id,
            status: status.to_string(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Classification helpers
    // =========================================================================

    /// Coarse kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlertNotFound { .. }
            | Self::RecommendationNotFound { .. }
            | Self::ResourceNotFound { .. } => ErrorKind::NotFound,
            Self::AlertAlreadyResolved { .. }
            | Self::ProtocolUnavailable { .. }
            | Self::ProtocolAlreadyActive
            | Self::RecommendationNotPending { .. }
            | Self::RecommendationAlreadyPending { .. }
            | Self::SessionDisposed
            | Self::DriverStopped { .. }
            | Self::TimerOutOfRange { .. } => ErrorKind::InvalidState,
            Self::ConfigNotFound { .. }
            | Self::ConfigInvalid { .. }
            | Self::ConfigValidation { .. } => ErrorKind::Config,
            Self::Io { .. } | Self::DirectoryCreation { .. } => ErrorKind::Io,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns true if an id did not match a known entity
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Returns true if the entity was in the wrong status for the operation
    pub fn is_invalid_state(&self) -> bool {
        self.kind() == ErrorKind::InvalidState
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        self.kind() == ErrorKind::Config
    }

    /// Returns true if the operator can simply try something else.
    ///
    /// Only configuration, filesystem and internal errors are worth stopping for.
    pub fn is_recoverable(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::InvalidState)
    }

    /// Returns actionable guidance for the operator
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Create ~/.aocc/config.yaml or run without --config to use defaults")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in the configuration file"),
            Self::ProtocolUnavailable { .. } => {
                Some("Switch the system status to alert before initiating the protocol")
            }
            Self::RecommendationAlreadyPending { .. } => {
                Some("Accept or dismiss the current recommendation first")
            }
            Self::SessionDisposed => Some("Start a new operator session"),
            _ => None,
        }
    }
}

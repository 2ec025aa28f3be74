//! System status and the crowd-control protocol.
//!
//! The console runs in one of two modes, [`SystemStatus::Nominal`] or
//! [`SystemStatus::Alert`]. While in alert mode the operator may start the
//! crowd-control protocol (after a dangerous confirmation). The protocol is
//! deliberately one-way from the operator's side: it only returns to idle
//! when the whole system goes back to nominal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use aocc_core::{AoccError, Result};

/// Session-wide operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    #[default]
    Nominal,
    Alert,
}

impl SystemStatus {
    /// The other mode.
    pub fn flipped(&self) -> Self {
        match self {
            Self::Nominal => Self::Alert,
            Self::Alert => Self::Nominal,
        }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, Self::Alert)
    }
}

impl std::fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nominal => write!(f, "nominal"),
            Self::Alert => write!(f, "alert"),
        }
    }
}

/// Crowd-control protocol sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ProtocolState {
    #[default]
    Idle,
    Active { initiated_at: DateTime<Utc> },
}

impl ProtocolState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// System status plus the protocol sub-machine it gates.
#[derive(Debug, Clone, Default)]
pub struct SystemState {
    status: SystemStatus,
    protocol: ProtocolState,
}

impl SystemState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SystemStatus {
        self.status
    }

    pub fn protocol(&self) -> ProtocolState {
        self.protocol
    }

    /// Flip the status. Returning to nominal resets the protocol to idle.
    pub fn toggle(&mut self) -> SystemStatus {
        self.status = self.status.flipped();
        if self.status == SystemStatus::Nominal && self.protocol.is_active() {
            info!("crowd-control protocol stood down with return to nominal");
            self.protocol = ProtocolState::Idle;
        }
        self.status
    }

    /// Check that the protocol could be started right now.
    pub fn ensure_protocol_available(&self) -> Result<()> {
        if !self.status.is_alert() {
            return Err(AoccError::ProtocolUnavailable {
                status: self.status.to_string(),
            });
        }
        if self.protocol.is_active() {
            return Err(AoccError::ProtocolAlreadyActive);
        }
        Ok(())
    }

    /// Start the protocol. Only reachable through a confirmed gate request.
    pub(crate) fn activate_protocol(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.ensure_protocol_available()?;
        self.protocol = ProtocolState::Active { initiated_at: now };
        info!(initiated_at = %now, "crowd-control protocol activated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_flips() {
        let mut state = SystemState::new();
        assert_eq!(state.status(), SystemStatus::Nominal);
        assert_eq!(state.toggle(), SystemStatus::Alert);
        assert_eq!(state.toggle(), SystemStatus::Nominal);
    }

    #[test]
    fn test_protocol_requires_alert_mode() {
        let mut state = SystemState::new();
        let err = state.activate_protocol(Utc::now()).unwrap_err();
        assert!(matches!(err, AoccError::ProtocolUnavailable { .. }));
        assert_eq!(state.protocol(), ProtocolState::Idle);
    }

    #[test]
    fn test_protocol_resets_on_nominal() {
        let mut state = SystemState::new();
        state.toggle();
        state.activate_protocol(Utc::now()).unwrap();
        assert!(state.protocol().is_active());

        // Still active while in alert mode, no way to stand it down directly
        assert!(matches!(
            state.activate_protocol(Utc::now()),
            Err(AoccError::ProtocolAlreadyActive)
        ));

        state.toggle();
        assert_eq!(state.protocol(), ProtocolState::Idle);
    }

    #[test]
    fn test_protocol_state_serde() {
        let json = serde_json::to_string(&ProtocolState::Idle).unwrap();
        assert_eq!(json, r#"{"state":"idle"}"#);
    }
}

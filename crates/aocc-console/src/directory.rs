//! Staff directory consulted by recommendation side effects.
//!
//! The console only needs two things from the directory: resolving a
//! [`ResourceRef`] and reassigning a set of them. [`ResourceDirectory`] is
//! the seam; [`StaffRoster`] is the in-memory implementation used by the
//! demo and the tests.

use std::collections::{BTreeMap, BTreeSet};

use aocc_core::{AoccError, ResourceRef, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    SecurityOfficer,
    CustomerService,
    Maintenance,
    Medical,
}

/// Duty status of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    OnDuty,
    Break,
    OffDuty,
}

/// One directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: ResourceRef,
    pub name: String,
    pub role: StaffRole,
    pub duty: DutyStatus,
    /// Current post, if assigned
    pub assignment: Option<String>,
    pub location: String,
    /// Whether the member can take a new assignment
    pub available: bool,
}

impl StaffMember {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: StaffRole,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: ResourceRef::new(id),
            name: name.into(),
            role,
            duty: DutyStatus::OnDuty,
            assignment: None,
            location: location.into(),
            available: true,
        }
    }

    pub fn with_duty(mut self, duty: DutyStatus) -> Self {
        self.duty = duty;
        self
    }

    /// Mark as already assigned (and therefore unavailable).
    pub fn assigned_to(mut self, assignment: impl Into<String>) -> Self {
        self.assignment = Some(assignment.into());
        self.available = false;
        self
    }
}

/// Lookup and reassignment of resources.
pub trait ResourceDirectory: Send {
    /// Look up a resource.
    fn get(&self, resource: &ResourceRef) -> Option<&StaffMember>;

    /// Assign every resource in `resources` to `assignment` and mark it
    /// unavailable. Either all resources are reassigned or none are.
    fn reassign(&mut self, resources: &BTreeSet<ResourceRef>, assignment: &str) -> Result<()>;

    /// Every member, in id order.
    fn members(&self) -> Vec<&StaffMember>;

    /// First resource in `resources` the directory does not know.
    fn find_missing<'a>(&self, resources: &'a BTreeSet<ResourceRef>) -> Option<&'a ResourceRef> {
        resources.iter().find(|r| self.get(r).is_none())
    }

    /// Whether a resource exists and is available.
    fn is_available(&self, resource: &ResourceRef) -> bool {
        self.get(resource).is_some_and(|m| m.available)
    }

    /// Available members with the given role, in id order.
    fn available_with_role(&self, role: StaffRole) -> Vec<&StaffMember> {
        self.members()
            .into_iter()
            .filter(|m| m.available && m.role == role)
            .collect()
    }
}

/// In-memory staff roster.
#[derive(Debug, Clone, Default)]
pub struct StaffRoster {
    members: BTreeMap<ResourceRef, StaffMember>,
}

impl StaffRoster {
    pub fn new(members: impl IntoIterator<Item = StaffMember>) -> Self {
        Self {
            members: members.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }
}

impl ResourceDirectory for StaffRoster {
    fn get(&self, resource: &ResourceRef) -> Option<&StaffMember> {
        self.members.get(resource)
    }

    fn reassign(&mut self, resources: &BTreeSet<ResourceRef>, assignment: &str) -> Result<()> {
        if let Some(missing) = self.find_missing(resources) {
            return Err(AoccError::ResourceNotFound {
                resource: missing.clone(),
            });
        }

        for resource in resources {
            if let Some(member) = self.members.get_mut(resource) {
                member.assignment = Some(assignment.to_string());
                member.available = false;
            }
        }
        info!(count = resources.len(), assignment, "staff reassigned");
        Ok(())
    }

    fn members(&self) -> Vec<&StaffMember> {
        self.members.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> StaffRoster {
        StaffRoster::new([
            StaffMember::new("S001", "Maria Santos", StaffRole::SecurityOfficer, "Zone 1"),
            StaffMember::new("S002", "John Reyes", StaffRole::SecurityOfficer, "Zone 3"),
            StaffMember::new("S004", "Anna Lee", StaffRole::CustomerService, "Zone 1")
                .assigned_to("Check-in Row A"),
        ])
    }

    fn refs(ids: &[&str]) -> BTreeSet<ResourceRef> {
        ids.iter().map(|id| ResourceRef::new(*id)).collect()
    }

    #[test]
    fn test_reassign_marks_unavailable() {
        let mut roster = roster();
        roster.reassign(&refs(&["S001", "S002"]), "Security Zone 2").unwrap();

        let maria = roster.get(&ResourceRef::new("S001")).unwrap();
        assert!(!maria.available);
        assert_eq!(maria.assignment.as_deref(), Some("Security Zone 2"));
        assert!(roster.available_with_role(StaffRole::SecurityOfficer).is_empty());
    }

    #[test]
    fn test_reassign_is_all_or_nothing() {
        let mut roster = roster();
        let err = roster
            .reassign(&refs(&["S001", "S999"]), "Security Zone 2")
            .unwrap_err();
        assert!(matches!(err, AoccError::ResourceNotFound { .. }));
        assert!(roster.is_available(&ResourceRef::new("S001")));
    }

    #[test]
    fn test_available_with_role() {
        let roster = roster();
        assert_eq!(roster.available_with_role(StaffRole::SecurityOfficer).len(), 2);
        assert!(roster.available_with_role(StaffRole::CustomerService).is_empty());
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability computation for presentation.
//!
//! Capabilities expose what an actor is permitted to do without leaking
//! domain internals. They are advisory only and are derived from the same
//! decision function handlers enforce.

use serde::{Deserialize, Serialize};

use crate::auth::{AuthorizationService, Operation, Role};

/// Represents whether a specific action is permitted.
///
/// Serializes to JSON as true/false.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// The action is permitted.
    Allowed,
    /// The action is not permitted.
    Denied,
}

impl Capability {
    /// Returns true if the capability is allowed.
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// Creates a capability from a boolean value.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::Allowed } else { Self::Denied }
    }
}

impl Serialize for Capability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bool(self.is_allowed())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value: bool = bool::deserialize(deserializer)?;
        Ok(Self::from_bool(value))
    }
}

/// What an actor may do, as flags for a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCapabilities {
    pub can_log_work: Capability,
    pub can_create_salary_reports: Capability,
    pub can_delete_salary_reports: Capability,
    pub can_manage_bills: Capability,
    pub can_view_all_bills: Capability,
    pub can_run_verification: Capability,
    pub can_manage_catalog: Capability,
    pub can_manage_accounts: Capability,
}

/// Computes the capability flags for a role.
///
/// Flags that depend on a resource owner are evaluated against the
/// actor's own resources; a teacher can log work for themselves only.
#[must_use]
pub const fn compute_capabilities(role: Role) -> RoleCapabilities {
    let own_teacher_id: i64 = match role {
        Role::Teacher { teacher_id } => teacher_id,
        _ => 0,
    };
    let other_student_id: i64 = match role {
        Role::Student { student_id } => student_id.wrapping_add(1),
        _ => 0,
    };

    RoleCapabilities {
        can_log_work: allowed(
            role,
            Operation::LogWork {
                teacher_id: own_teacher_id,
            },
        ),
        can_create_salary_reports: allowed(role, Operation::CreateSalaryReport),
        can_delete_salary_reports: allowed(role, Operation::DeleteSalaryReport),
        can_manage_bills: allowed(role, Operation::ChargeService),
        can_view_all_bills: allowed(
            role,
            Operation::ViewBill {
                student_id: other_student_id,
            },
        ),
        can_run_verification: allowed(role, Operation::RunVerification),
        can_manage_catalog: allowed(role, Operation::ManageCatalog),
        can_manage_accounts: allowed(role, Operation::ManageAccounts),
    }
}

const fn allowed(role: Role, operation: Operation) -> Capability {
    Capability::from_bool(AuthorizationService::permits(role, operation))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_owner_has_every_capability() {
        let caps = compute_capabilities(Role::Owner);
        assert!(caps.can_log_work.is_allowed());
        assert!(caps.can_manage_bills.is_allowed());
        assert!(caps.can_manage_accounts.is_allowed());
    }

    #[test]
    fn test_inspector_reads_and_reports_but_does_not_bill() {
        let caps = compute_capabilities(Role::Inspector);
        assert!(caps.can_create_salary_reports.is_allowed());
        assert!(caps.can_run_verification.is_allowed());
        assert!(caps.can_view_all_bills.is_allowed());
        assert_eq!(caps.can_log_work, Capability::Denied);
        assert_eq!(caps.can_manage_bills, Capability::Denied);
        assert_eq!(caps.can_delete_salary_reports, Capability::Denied);
    }

    #[test]
    fn test_teacher_logs_own_work_only() {
        let caps = compute_capabilities(Role::Teacher { teacher_id: 4 });
        assert!(caps.can_log_work.is_allowed());
        assert_eq!(caps.can_create_salary_reports, Capability::Denied);
        assert_eq!(caps.can_view_all_bills, Capability::Denied);
    }

    #[test]
    fn test_student_cannot_view_other_bills() {
        let caps = compute_capabilities(Role::Student { student_id: 9 });
        assert_eq!(caps.can_view_all_bills, Capability::Denied);
        assert_eq!(caps.can_log_work, Capability::Denied);
    }

    #[test]
    fn test_capability_serializes_as_bool() {
        let json = serde_json::to_string(&compute_capabilities(Role::Inspector)).unwrap();
        assert!(json.contains("\"can_run_verification\":true"));
        assert!(json.contains("\"can_manage_bills\":false"));
    }
}

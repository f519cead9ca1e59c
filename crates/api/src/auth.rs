// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Roles, operations and the single authorization decision.
//!
//! A role is derived once per request from the account's flags and
//! profiles. Every handler then asks [`AuthorizationService::authorize`]
//! whether that role may perform the operation on the resource it targets.
//! There are no other permission checks.

use serde::{Deserialize, Serialize};
use tutor_ledger_domain::{StudentProfile, TeacherProfile, UserAccount};
use tutor_ledger_persistence::SqlitePersistence;

use crate::error::AuthError;

/// The effective role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    /// Superuser: may do everything.
    Owner,
    /// May read everything, run verification and create salary reports.
    Inspector,
    /// May log and view their own work and view their own salary reports.
    Teacher { teacher_id: i64 },
    /// May view their own bills, balance and sessions.
    Student { student_id: i64 },
}

impl Role {
    /// Derives the role from account flags and profiles.
    ///
    /// Precedence is superuser, inspector flag, teacher profile, student
    /// profile.
    ///
    /// # Returns
    ///
    /// `None` when the account holds no usable role.
    #[must_use]
    pub const fn derive(
        account: &UserAccount,
        teacher: Option<&TeacherProfile>,
        student: Option<&StudentProfile>,
    ) -> Option<Self> {
        if account.is_superuser {
            return Some(Self::Owner);
        }
        if account.is_inspector {
            return Some(Self::Inspector);
        }
        if let Some(teacher) = teacher {
            return Some(Self::Teacher {
                teacher_id: teacher.teacher_id,
            });
        }
        if let Some(student) = student {
            return Some(Self::Student {
                student_id: student.student_id,
            });
        }
        None
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Inspector => "inspector",
            Self::Teacher { .. } => "teacher",
            Self::Student { .. } => "student",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Every operation the API performs, with the owner of its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Log work for a teacher.
    LogWork { teacher_id: i64 },
    /// Close a teacher's open clock session.
    CloseWorkSession { teacher_id: i64 },
    /// Soft-delete a session.
    DeleteWorkSession,
    /// View a session by its teacher and (optional) student.
    ViewWorkSession {
        teacher_id: i64,
        student_id: Option<i64>,
    },
    /// List a student's sessions.
    ViewStudentSessions { student_id: i64 },
    CreateSalaryReport,
    BulkCreateSalaryReports,
    DeleteSalaryReport,
    /// View a teacher's salary reports or breakdown.
    ViewSalary { teacher_id: i64 },
    /// Add a service line to a student's bill.
    ChargeService,
    BillWorkSession,
    EditBillItem,
    DeleteBillItem,
    MarkBillPaid,
    OpenMonthlyBills,
    /// View a student's bill or statement.
    ViewBill { student_id: i64 },
    /// View a student's outstanding balance.
    ViewBalance { student_id: i64 },
    RunVerification,
    ManageCatalog,
    ManageAccounts,
}

impl Operation {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LogWork { .. } => "log_work",
            Self::CloseWorkSession { .. } => "close_work_session",
            Self::DeleteWorkSession => "delete_work_session",
            Self::ViewWorkSession { .. } => "view_work_session",
            Self::ViewStudentSessions { .. } => "view_student_sessions",
            Self::CreateSalaryReport => "create_salary_report",
            Self::BulkCreateSalaryReports => "bulk_create_salary_reports",
            Self::DeleteSalaryReport => "delete_salary_report",
            Self::ViewSalary { .. } => "view_salary",
            Self::ChargeService => "charge_service",
            Self::BillWorkSession => "bill_work_session",
            Self::EditBillItem => "edit_bill_item",
            Self::DeleteBillItem => "delete_bill_item",
            Self::MarkBillPaid => "mark_bill_paid",
            Self::OpenMonthlyBills => "open_monthly_bills",
            Self::ViewBill { .. } => "view_bill",
            Self::ViewBalance { .. } => "view_balance",
            Self::RunVerification => "run_verification",
            Self::ManageCatalog => "manage_catalog",
            Self::ManageAccounts => "manage_accounts",
        }
    }

    /// Whether the operation only reads.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        matches!(
            self,
            Self::ViewWorkSession { .. }
                | Self::ViewStudentSessions { .. }
                | Self::ViewSalary { .. }
                | Self::ViewBill { .. }
                | Self::ViewBalance { .. }
        )
    }
}

/// An account resolved for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl AuthenticatedActor {
    #[must_use]
    pub const fn new(user_id: i64, username: String, role: Role) -> Self {
        Self {
            user_id,
            username,
            role,
        }
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Decides whether `role` may perform `operation`.
    #[must_use]
    pub const fn permits(role: Role, operation: Operation) -> bool {
        match role {
            Role::Owner => true,
            Role::Inspector => {
                operation.is_read()
                    || matches!(
                        operation,
                        Operation::CreateSalaryReport
                            | Operation::BulkCreateSalaryReports
                            | Operation::RunVerification
                    )
            }
            Role::Teacher { teacher_id } => match operation {
                Operation::LogWork { teacher_id: owner }
                | Operation::CloseWorkSession { teacher_id: owner }
                | Operation::ViewWorkSession {
                    teacher_id: owner, ..
                }
                | Operation::ViewSalary { teacher_id: owner } => owner == teacher_id,
                _ => false,
            },
            Role::Student { student_id } => match operation {
                Operation::ViewWorkSession {
                    student_id: Some(owner),
                    ..
                }
                | Operation::ViewStudentSessions { student_id: owner }
                | Operation::ViewBill { student_id: owner }
                | Operation::ViewBalance { student_id: owner } => owner == student_id,
                _ => false,
            },
        }
    }

    /// Checks that the actor may perform the operation.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` when the role does not permit it.
    pub fn authorize(actor: &AuthenticatedActor, operation: Operation) -> Result<(), AuthError> {
        if Self::permits(actor.role, operation) {
            return Ok(());
        }
        tracing::warn!(
            username = %actor.username,
            role = %actor.role,
            operation = operation.name(),
            "Denied operation"
        );
        Err(AuthError::Unauthorized {
            operation: operation.name().to_string(),
            role: actor.role.name().to_string(),
        })
    }
}

/// Resolves the acting account of a request.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Looks up an account by username and derives its role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if the account does not
    /// exist, holds no role, or cannot be loaded.
    pub fn resolve_actor(
        persistence: &mut SqlitePersistence,
        username: &str,
    ) -> Result<AuthenticatedActor, AuthError> {
        let account: UserAccount = persistence
            .get_user_by_username(username)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: format!("Unknown user: {username}"),
            })?;

        let teacher: Option<TeacherProfile> = persistence
            .get_teacher_for_user(account.user_id)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?;
        let student: Option<StudentProfile> = persistence
            .get_student_for_user(account.user_id)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Database error: {e}"),
            })?;

        let role: Role = Role::derive(&account, teacher.as_ref(), student.as_ref()).ok_or_else(
            || AuthError::AuthenticationFailed {
                reason: format!("User {username} has no role"),
            },
        )?;

        Ok(AuthenticatedActor::new(account.user_id, account.username, role))
    }
}

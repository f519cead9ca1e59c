// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The role by operation decision table.

use crate::{ApiError, AuthError, AuthenticatedActor, AuthorizationService, Operation, Role};

fn actor_with(role: Role) -> AuthenticatedActor {
    AuthenticatedActor::new(1, String::from("someone"), role)
}

const MUTATIONS: [Operation; 11] = [
    Operation::DeleteWorkSession,
    Operation::DeleteSalaryReport,
    Operation::ChargeService,
    Operation::BillWorkSession,
    Operation::EditBillItem,
    Operation::DeleteBillItem,
    Operation::MarkBillPaid,
    Operation::OpenMonthlyBills,
    Operation::ManageCatalog,
    Operation::ManageAccounts,
    Operation::LogWork { teacher_id: 3 },
];

// ============================================================================
// Owner and inspector
// ============================================================================

#[test]
fn test_owner_may_do_everything() {
    for operation in MUTATIONS {
        assert!(AuthorizationService::permits(Role::Owner, operation));
    }
    assert!(AuthorizationService::permits(
        Role::Owner,
        Operation::RunVerification
    ));
}

#[test]
fn test_inspector_reads_everything() {
    let reads = [
        Operation::ViewWorkSession {
            teacher_id: 3,
            student_id: Some(4),
        },
        Operation::ViewStudentSessions { student_id: 4 },
        Operation::ViewSalary { teacher_id: 3 },
        Operation::ViewBill { student_id: 4 },
        Operation::ViewBalance { student_id: 4 },
    ];
    for operation in reads {
        assert!(AuthorizationService::permits(Role::Inspector, operation));
    }
}

#[test]
fn test_inspector_creates_reports_and_verifies_but_never_mutates_bills_or_work() {
    assert!(AuthorizationService::permits(
        Role::Inspector,
        Operation::CreateSalaryReport
    ));
    assert!(AuthorizationService::permits(
        Role::Inspector,
        Operation::BulkCreateSalaryReports
    ));
    assert!(AuthorizationService::permits(
        Role::Inspector,
        Operation::RunVerification
    ));
    for operation in MUTATIONS {
        assert!(
            !AuthorizationService::permits(Role::Inspector, operation),
            "inspector must not {}",
            operation.name()
        );
    }
}

// ============================================================================
// Teacher and student
// ============================================================================

#[test]
fn test_teacher_acts_on_own_sessions_only() {
    let role = Role::Teacher { teacher_id: 3 };

    assert!(AuthorizationService::permits(
        role,
        Operation::LogWork { teacher_id: 3 }
    ));
    assert!(AuthorizationService::permits(
        role,
        Operation::CloseWorkSession { teacher_id: 3 }
    ));
    assert!(AuthorizationService::permits(
        role,
        Operation::ViewSalary { teacher_id: 3 }
    ));
    assert!(!AuthorizationService::permits(
        role,
        Operation::LogWork { teacher_id: 5 }
    ));
    assert!(!AuthorizationService::permits(
        role,
        Operation::ViewSalary { teacher_id: 5 }
    ));
    assert!(!AuthorizationService::permits(
        role,
        Operation::CreateSalaryReport
    ));
    assert!(!AuthorizationService::permits(
        role,
        Operation::DeleteWorkSession
    ));
}

#[test]
fn test_student_views_own_records_only() {
    let role = Role::Student { student_id: 4 };

    assert!(AuthorizationService::permits(
        role,
        Operation::ViewBill { student_id: 4 }
    ));
    assert!(AuthorizationService::permits(
        role,
        Operation::ViewBalance { student_id: 4 }
    ));
    assert!(AuthorizationService::permits(
        role,
        Operation::ViewWorkSession {
            teacher_id: 3,
            student_id: Some(4),
        }
    ));
    assert!(!AuthorizationService::permits(
        role,
        Operation::ViewWorkSession {
            teacher_id: 3,
            student_id: None,
        }
    ));
    assert!(!AuthorizationService::permits(
        role,
        Operation::ViewBill { student_id: 5 }
    ));
    assert!(!AuthorizationService::permits(
        role,
        Operation::LogWork { teacher_id: 3 }
    ));
}

#[test]
fn test_authorize_reports_role_and_operation() {
    let err = AuthorizationService::authorize(
        &actor_with(Role::Student { student_id: 4 }),
        Operation::MarkBillPaid,
    )
    .unwrap_err();

    assert_eq!(
        err,
        AuthError::Unauthorized {
            operation: String::from("mark_bill_paid"),
            role: String::from("student"),
        }
    );
    assert!(matches!(
        ApiError::from(err),
        ApiError::Unauthorized { .. }
    ));
}

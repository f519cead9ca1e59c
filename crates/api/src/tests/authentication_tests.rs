// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tutor_ledger_persistence::RoleFlags;

use super::helpers::{at, create_test_seed, setup_test_persistence};
use crate::{AuthError, AuthenticationService, Role, whoami};

#[test]
fn test_roles_are_derived_from_flags_and_profiles() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    assert_eq!(seed.owner.role, Role::Owner);
    assert_eq!(seed.inspector.role, Role::Inspector);
    assert_eq!(
        seed.teacher.role,
        Role::Teacher {
            teacher_id: seed.teacher_id
        }
    );
    assert_eq!(
        seed.student.role,
        Role::Student {
            student_id: seed.student_id
        }
    );
}

#[test]
fn test_unknown_user_fails_authentication() {
    let mut persistence = setup_test_persistence();

    let err = AuthenticationService::resolve_actor(&mut persistence, "nobody").unwrap_err();

    assert!(matches!(err, AuthError::AuthenticationFailed { .. }));
}

#[test]
fn test_account_without_role_fails_authentication() {
    let mut persistence = setup_test_persistence();
    persistence
        .create_user("drifter", "No Role", RoleFlags::default(), at(2026, 1, 1, 0, 0))
        .unwrap();

    let err = AuthenticationService::resolve_actor(&mut persistence, "drifter").unwrap_err();

    assert!(err.to_string().contains("has no role"));
}

#[test]
fn test_whoami_reports_capabilities() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let response = whoami(&seed.teacher);

    assert_eq!(response.username, "teacher1");
    assert!(response.capabilities.can_log_work.is_allowed());
    assert!(!response.capabilities.can_manage_bills.is_allowed());
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeSet;
use tutor_ledger_domain::{InspectorProfile, StudentProfile, TeacherProfile, UserAccount};

use super::{CheckKind, Finding, ProfileKind, VerificationReport};

/// Checks that each account's role flags agree with its profiles.
///
/// Every non-owner holds exactly one of the inspector, teacher and
/// student flags, and each flag is matched by a profile of that kind.
#[must_use]
pub fn check_roles(
    accounts: &[UserAccount],
    teachers: &[TeacherProfile],
    students: &[StudentProfile],
    inspectors: &[InspectorProfile],
) -> VerificationReport {
    let mut report: VerificationReport = VerificationReport::new(CheckKind::Roles);

    let teacher_users: BTreeSet<i64> = teachers.iter().map(|p| p.user_id).collect();
    let student_users: BTreeSet<i64> = students.iter().map(|p| p.user_id).collect();
    let inspector_users: BTreeSet<i64> = inspectors.iter().map(|p| p.user_id).collect();

    for account in accounts {
        report.examined += 1;

        match account.role_flag_count() {
            0 if !account.is_superuser => report.push(Finding::NoRole {
                user_id: account.user_id,
                username: account.username.clone(),
            }),
            0 | 1 => {}
            _ => report.push(Finding::MultipleRoles {
                user_id: account.user_id,
                username: account.username.clone(),
            }),
        }

        let pairs: [(ProfileKind, bool, &BTreeSet<i64>); 3] = [
            (ProfileKind::Teacher, account.is_teacher, &teacher_users),
            (ProfileKind::Student, account.is_student, &student_users),
            (ProfileKind::Inspector, account.is_inspector, &inspector_users),
        ];
        for (kind, flagged, profiles) in pairs {
            let has_profile: bool = profiles.contains(&account.user_id);
            if flagged && !has_profile {
                report.push(Finding::RoleWithoutProfile {
                    user_id: account.user_id,
                    username: account.username.clone(),
                    kind,
                });
            } else if !flagged && has_profile {
                report.push(Finding::ProfileWithoutRole {
                    user_id: account.user_id,
                    username: account.username.clone(),
                    kind,
                });
            }
        }
    }

    report
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tutor_ledger_domain::WorkEntry;
use tutor_ledger_persistence::{RoleFlags, SqlitePersistence};

use crate::{AuthenticatedActor, AuthenticationService, LogWorkRequest};

/// One account per role plus the catalog most tests need.
pub struct Seeded {
    pub owner: AuthenticatedActor,
    pub inspector: AuthenticatedActor,
    pub teacher: AuthenticatedActor,
    pub other_teacher: AuthenticatedActor,
    pub student: AuthenticatedActor,
    pub other_student: AuthenticatedActor,
    pub teacher_id: i64,
    pub other_teacher_id: i64,
    pub student_id: i64,
    pub other_student_id: i64,
    /// 15.00 per hour for the student, 15.00 per hour for the teacher.
    pub task_id: i64,
    /// A workbook at 21.00.
    pub service_id: i64,
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal literal")
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid test instant")
}

pub fn setup_test_persistence() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().expect("in-memory database")
}

fn actor(persistence: &mut SqlitePersistence, username: &str) -> AuthenticatedActor {
    AuthenticationService::resolve_actor(persistence, username).expect("seeded account")
}

pub fn create_test_seed(persistence: &mut SqlitePersistence) -> Seeded {
    let now: DateTime<Utc> = at(2026, 1, 1, 0, 0);
    persistence
        .create_user(
            "owner",
            "Center Owner",
            RoleFlags {
                is_superuser: true,
                ..RoleFlags::default()
            },
            now,
        )
        .unwrap();
    persistence
        .register_inspector("inspector", "Inspector", now)
        .unwrap();
    let teacher = persistence
        .register_teacher("teacher1", "Teacher One", Some("Maths"), now)
        .unwrap();
    let other_teacher = persistence
        .register_teacher("teacher2", "Teacher Two", None, now)
        .unwrap();
    let student = persistence
        .register_student("student1", "Student One", None, now)
        .unwrap();
    let other_student = persistence
        .register_student("student2", "Student Two", Some("555-0100"), now)
        .unwrap();
    let task = persistence
        .create_task("Lesson", None, dec("15.00"), dec("15.00"), now)
        .unwrap();
    let service = persistence
        .create_service("Workbook", Some("Printed workbook"), dec("21.00"), now)
        .unwrap();

    Seeded {
        owner: actor(persistence, "owner"),
        inspector: actor(persistence, "inspector"),
        teacher: actor(persistence, "teacher1"),
        other_teacher: actor(persistence, "teacher2"),
        student: actor(persistence, "student1"),
        other_student: actor(persistence, "student2"),
        teacher_id: teacher.teacher_id,
        other_teacher_id: other_teacher.teacher_id,
        student_id: student.student_id,
        other_student_id: other_student.student_id,
        task_id: task.task_id,
        service_id: service.service_id,
    }
}

/// A manual entry by the seeded teacher for the seeded student.
pub fn create_manual_request(seed: &Seeded, hours: &str, created_at: DateTime<Utc>) -> LogWorkRequest {
    LogWorkRequest {
        teacher_id: seed.teacher_id,
        task_id: seed.task_id,
        student_id: Some(seed.student_id),
        entry: WorkEntry::manual(dec(hours)),
        created_at: Some(created_at),
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod billing_tests;
mod initialization_tests;
mod work_session_tests;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tutor_ledger_domain::{BillingMonth, NewWorkSession, WorkEntry};

use crate::SqlitePersistence;

/// Ids of the records most tests start from.
pub struct Fixture {
    pub teacher_id: i64,
    pub student_id: i64,
    /// A task priced 15.00 per hour for both customer and teacher.
    pub task_id: i64,
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal literal")
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid test instant")
}

pub fn march_2026() -> BillingMonth {
    BillingMonth::new(2026, 3).expect("valid month")
}

pub fn create_test_persistence() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().expect("in-memory database")
}

/// Seeds a teacher, a student and one 15.00/15.00 task.
pub fn create_test_fixture(persistence: &mut SqlitePersistence) -> Fixture {
    let now: DateTime<Utc> = at(2026, 1, 1, 0, 0);
    let teacher = persistence
        .register_teacher("teacher1", "Teacher One", Some("Maths"), now)
        .unwrap();
    let student = persistence
        .register_student("student1", "Student One", None, now)
        .unwrap();
    let task = persistence
        .create_task("Lesson", Some("One-to-one lesson"), dec("15.00"), dec("15.00"), now)
        .unwrap();

    Fixture {
        teacher_id: teacher.teacher_id,
        student_id: student.student_id,
        task_id: task.task_id,
    }
}

pub fn create_test_draft(
    fixture: &Fixture,
    entry: WorkEntry,
    created_at: DateTime<Utc>,
) -> NewWorkSession {
    NewWorkSession {
        teacher_id: fixture.teacher_id,
        student_id: Some(fixture.student_id),
        entry,
        created_at: Some(created_at),
    }
}

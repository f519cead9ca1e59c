// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account and role profile mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::codec::{encode_flag, encode_instant};
use crate::diesel_schema::{inspectors, students, teachers, users};
use crate::error::PersistenceError;

/// Role flags for a new account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleFlags {
    pub is_superuser: bool,
    pub is_inspector: bool,
    pub is_teacher: bool,
    pub is_student: bool,
}

/// Creates a user account.
///
/// # Errors
///
/// Returns `IntegrityViolation` if the username is taken.
pub fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    display_name: &str,
    flags: RoleFlags,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(users::table)
        .values((
            users::username.eq(username),
            users::display_name.eq(display_name),
            users::is_superuser.eq(encode_flag(flags.is_superuser)),
            users::is_inspector.eq(encode_flag(flags.is_inspector)),
            users::is_teacher.eq(encode_flag(flags.is_teacher)),
            users::is_student.eq(encode_flag(flags.is_student)),
            users::created_at.eq(encode_instant(now)),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;
    info!(user_id, username, "Created user");
    Ok(user_id)
}

/// Attaches a teacher profile to a user.
///
/// # Errors
///
/// Returns `IntegrityViolation` if the user is missing or already has one.
pub fn create_teacher_profile(
    conn: &mut SqliteConnection,
    user_id: i64,
    subjects: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(teachers::table)
        .values((teachers::user_id.eq(user_id), teachers::subjects.eq(subjects)))
        .execute(conn)?;

    let teacher_id: i64 = conn.get_last_insert_rowid()?;
    info!(teacher_id, user_id, "Created teacher profile");
    Ok(teacher_id)
}

/// Attaches an active student profile to a user.
///
/// # Errors
///
/// Returns `IntegrityViolation` if the user is missing or already has one.
pub fn create_student_profile(
    conn: &mut SqliteConnection,
    user_id: i64,
    phone: Option<&str>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(students::table)
        .values((
            students::user_id.eq(user_id),
            students::phone.eq(phone),
            students::is_active.eq(1),
        ))
        .execute(conn)?;

    let student_id: i64 = conn.get_last_insert_rowid()?;
    info!(student_id, user_id, "Created student profile");
    Ok(student_id)
}

/// Attaches an inspector profile to a user.
///
/// # Errors
///
/// Returns `IntegrityViolation` if the user is missing or already has one.
pub fn create_inspector_profile(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(inspectors::table)
        .values(inspectors::user_id.eq(user_id))
        .execute(conn)?;

    let inspector_id: i64 = conn.get_last_insert_rowid()?;
    info!(inspector_id, user_id, "Created inspector profile");
    Ok(inspector_id)
}

/// Marks a student active or inactive.
///
/// # Errors
///
/// Returns `NotFound` if the student does not exist.
pub fn set_student_active(
    conn: &mut SqliteConnection,
    student_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(students::table)
        .filter(students::student_id.eq(student_id))
        .set(students::is_active.eq(encode_flag(is_active)))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Student {student_id}"
        )));
    }

    info!(student_id, is_active, "Updated student status");
    Ok(())
}

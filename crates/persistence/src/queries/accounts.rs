// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account and role profile queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;
use tutor_ledger_domain::{InspectorProfile, StudentProfile, TeacherProfile, UserAccount};

use crate::data_models::{InspectorRow, StudentRow, TeacherRow, UserRow};
use crate::diesel_schema::{inspectors, students, teachers, users};
use crate::error::PersistenceError;

/// Retrieves a user by username.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no such user exists.
pub fn get_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> Result<Option<UserAccount>, PersistenceError> {
    debug!("Looking up user by username: {}", username);

    let row: Option<UserRow> = users::table
        .filter(users::username.eq(username))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(UserAccount::from))
}

/// Retrieves a user by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<UserAccount>, PersistenceError> {
    let row: Option<UserRow> = users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(UserAccount::from))
}

/// Lists all users ordered by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut SqliteConnection) -> Result<Vec<UserAccount>, PersistenceError> {
    let rows: Vec<UserRow> = users::table
        .order(users::user_id.asc())
        .select(UserRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(UserAccount::from).collect())
}

/// Retrieves a teacher profile by teacher ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_teacher(
    conn: &mut SqliteConnection,
    teacher_id: i64,
) -> Result<Option<TeacherProfile>, PersistenceError> {
    let row: Option<TeacherRow> = teachers::table
        .filter(teachers::teacher_id.eq(teacher_id))
        .select(TeacherRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(TeacherProfile::from))
}

/// Retrieves the teacher profile belonging to a user.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_teacher_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<TeacherProfile>, PersistenceError> {
    let row: Option<TeacherRow> = teachers::table
        .filter(teachers::user_id.eq(user_id))
        .select(TeacherRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(TeacherProfile::from))
}

/// Lists all teacher profiles ordered by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_teachers(conn: &mut SqliteConnection) -> Result<Vec<TeacherProfile>, PersistenceError> {
    let rows: Vec<TeacherRow> = teachers::table
        .order(teachers::teacher_id.asc())
        .select(TeacherRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(TeacherProfile::from).collect())
}

/// Retrieves a student profile by student ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_student(
    conn: &mut SqliteConnection,
    student_id: i64,
) -> Result<Option<StudentProfile>, PersistenceError> {
    let row: Option<StudentRow> = students::table
        .filter(students::student_id.eq(student_id))
        .select(StudentRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(StudentProfile::from))
}

/// Retrieves the student profile belonging to a user.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_student_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<StudentProfile>, PersistenceError> {
    let row: Option<StudentRow> = students::table
        .filter(students::user_id.eq(user_id))
        .select(StudentRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(StudentProfile::from))
}

/// Lists all student profiles ordered by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_students(conn: &mut SqliteConnection) -> Result<Vec<StudentProfile>, PersistenceError> {
    let rows: Vec<StudentRow> = students::table
        .order(students::student_id.asc())
        .select(StudentRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(StudentProfile::from).collect())
}

/// Retrieves the inspector profile belonging to a user.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_inspector_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<InspectorProfile>, PersistenceError> {
    let row: Option<InspectorRow> = inspectors::table
        .filter(inspectors::user_id.eq(user_id))
        .select(InspectorRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(InspectorProfile::from))
}

/// Lists all inspector profiles ordered by ID.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_inspectors(
    conn: &mut SqliteConnection,
) -> Result<Vec<InspectorProfile>, PersistenceError> {
    let rows: Vec<InspectorRow> = inspectors::table
        .order(inspectors::inspector_id.asc())
        .select(InspectorRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(InspectorProfile::from).collect())
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Work session queries.
//!
//! Interval filters compare the fixed-width instant text directly, which
//! orders the same way as the instants themselves.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;
use tutor_ledger_domain::WorkSession;

use crate::codec::encode_instant;
use crate::data_models::WorkSessionRow;
use crate::diesel_schema::work_sessions;
use crate::error::PersistenceError;

fn decode_all(rows: Vec<WorkSessionRow>) -> Result<Vec<WorkSession>, PersistenceError> {
    rows.into_iter().map(WorkSession::try_from).collect()
}

/// Retrieves a work session by ID, including soft-deleted sessions.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn get_work_session(
    conn: &mut SqliteConnection,
    work_session_id: i64,
) -> Result<Option<WorkSession>, PersistenceError> {
    work_sessions::table
        .filter(work_sessions::work_session_id.eq(work_session_id))
        .select(WorkSessionRow::as_select())
        .first::<WorkSessionRow>(conn)
        .optional()?
        .map(WorkSession::try_from)
        .transpose()
}

/// Lists every work session, including soft-deleted ones.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn list_work_sessions(
    conn: &mut SqliteConnection,
) -> Result<Vec<WorkSession>, PersistenceError> {
    let rows: Vec<WorkSessionRow> = work_sessions::table
        .order(work_sessions::work_session_id.asc())
        .select(WorkSessionRow::as_select())
        .load(conn)?;

    decode_all(rows)
}

/// Lists a teacher's live sessions created in `[start, end)`.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn list_teacher_sessions_in_interval(
    conn: &mut SqliteConnection,
    teacher_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<WorkSession>, PersistenceError> {
    let rows: Vec<WorkSessionRow> = work_sessions::table
        .filter(work_sessions::teacher_id.eq(teacher_id))
        .filter(work_sessions::deleted_at.is_null())
        .filter(work_sessions::created_at.ge(encode_instant(start)))
        .filter(work_sessions::created_at.lt(encode_instant(end)))
        .order((
            work_sessions::created_at.asc(),
            work_sessions::work_session_id.asc(),
        ))
        .select(WorkSessionRow::as_select())
        .load(conn)?;

    debug!(teacher_id, count = rows.len(), "Loaded teacher sessions");
    decode_all(rows)
}

/// Lists a student's live sessions created in `[start, end)`.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn list_student_sessions_in_interval(
    conn: &mut SqliteConnection,
    student_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<WorkSession>, PersistenceError> {
    let rows: Vec<WorkSessionRow> = work_sessions::table
        .filter(work_sessions::student_id.eq(student_id))
        .filter(work_sessions::deleted_at.is_null())
        .filter(work_sessions::created_at.ge(encode_instant(start)))
        .filter(work_sessions::created_at.lt(encode_instant(end)))
        .order((
            work_sessions::created_at.asc(),
            work_sessions::work_session_id.asc(),
        ))
        .select(WorkSessionRow::as_select())
        .load(conn)?;

    decode_all(rows)
}

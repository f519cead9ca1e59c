// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Work session mutations.
//!
//! Sessions are always written whole from a domain `WorkSession`, so the
//! stored inputs, snapshot and derived columns are one consistent value.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;
use tutor_ledger_domain::WorkSession;

use crate::backend::PersistenceBackend;
use crate::data_models::WorkSessionValues;
use crate::diesel_schema::work_sessions;
use crate::error::PersistenceError;

/// Inserts a new session and returns its ID.
///
/// # Errors
///
/// Returns `IntegrityViolation` if the teacher, task or student is missing.
pub fn insert_work_session(
    conn: &mut SqliteConnection,
    session: &WorkSession,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(work_sessions::table)
        .values(WorkSessionValues::from(session))
        .execute(conn)?;

    let work_session_id: i64 = conn.get_last_insert_rowid()?;
    debug!(
        work_session_id,
        stored_hours = ?session.stored_hours(),
        "Inserted work session row"
    );
    Ok(work_session_id)
}

/// Overwrites a stored session with its new state.
///
/// # Errors
///
/// Returns `NotFound` if the session does not exist.
pub fn rewrite_work_session(
    conn: &mut SqliteConnection,
    work_session_id: i64,
    session: &WorkSession,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(work_sessions::table)
        .filter(work_sessions::work_session_id.eq(work_session_id))
        .set(WorkSessionValues::from(session))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Work session {work_session_id}"
        )));
    }

    debug!(
        work_session_id,
        deleted = session.is_deleted(),
        "Rewrote work session row"
    );
    Ok(())
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Salary report mutations.
//!
//! Reports are inserted once with frozen totals. The only later change
//! is a soft delete, which touches `deleted_at` and nothing else.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::codec::encode_instant;
use crate::data_models::NewSalaryReportRow;
use crate::diesel_schema::salary_reports;
use crate::error::PersistenceError;

/// Inserts a frozen salary report and returns its ID.
///
/// # Errors
///
/// Returns `IntegrityViolation` if the teacher or creator is missing.
pub fn insert_salary_report(
    conn: &mut SqliteConnection,
    report: &NewSalaryReportRow,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(salary_reports::table)
        .values(report)
        .execute(conn)?;

    let salary_report_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        salary_report_id,
        teacher_id = report.teacher_id,
        total_hours = %report.total_hours,
        total_amount = %report.total_amount,
        "Created salary report"
    );
    Ok(salary_report_id)
}

/// Soft-deletes a salary report.
///
/// # Returns
///
/// `true` if the report was live and is now deleted, `false` if it was
/// already deleted.
///
/// # Errors
///
/// Returns `NotFound` if the report does not exist.
pub fn soft_delete_salary_report(
    conn: &mut SqliteConnection,
    salary_report_id: i64,
    now: DateTime<Utc>,
) -> Result<bool, PersistenceError> {
    let rows_affected: usize = diesel::update(salary_reports::table)
        .filter(salary_reports::salary_report_id.eq(salary_report_id))
        .filter(salary_reports::deleted_at.is_null())
        .set(salary_reports::deleted_at.eq(Some(encode_instant(now))))
        .execute(conn)?;

    if rows_affected > 0 {
        info!(salary_report_id, "Soft-deleted salary report");
        return Ok(true);
    }

    let exists: i64 = salary_reports::table
        .filter(salary_reports::salary_report_id.eq(salary_report_id))
        .count()
        .get_result(conn)?;
    if exists == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Salary report {salary_report_id}"
        )));
    }
    Ok(false)
}

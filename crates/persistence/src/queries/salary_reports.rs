// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Salary report queries.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tutor_ledger_domain::SalaryReport;

use crate::codec::encode_instant;
use crate::data_models::SalaryReportRow;
use crate::diesel_schema::salary_reports;
use crate::error::PersistenceError;

/// Retrieves a salary report by ID, including soft-deleted reports.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn get_salary_report(
    conn: &mut SqliteConnection,
    salary_report_id: i64,
) -> Result<Option<SalaryReport>, PersistenceError> {
    salary_reports::table
        .filter(salary_reports::salary_report_id.eq(salary_report_id))
        .select(SalaryReportRow::as_select())
        .first::<SalaryReportRow>(conn)
        .optional()?
        .map(SalaryReport::try_from)
        .transpose()
}

/// Lists every salary report, including soft-deleted ones.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn list_salary_reports(
    conn: &mut SqliteConnection,
) -> Result<Vec<SalaryReport>, PersistenceError> {
    salary_reports::table
        .order(salary_reports::salary_report_id.asc())
        .select(SalaryReportRow::as_select())
        .load::<SalaryReportRow>(conn)?
        .into_iter()
        .map(SalaryReport::try_from)
        .collect()
}

/// Lists a teacher's live salary reports, newest interval first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn list_teacher_salary_reports(
    conn: &mut SqliteConnection,
    teacher_id: i64,
) -> Result<Vec<SalaryReport>, PersistenceError> {
    salary_reports::table
        .filter(salary_reports::teacher_id.eq(teacher_id))
        .filter(salary_reports::deleted_at.is_null())
        .order((
            salary_reports::start_date.desc(),
            salary_reports::salary_report_id.desc(),
        ))
        .select(SalaryReportRow::as_select())
        .load::<SalaryReportRow>(conn)?
        .into_iter()
        .map(SalaryReport::try_from)
        .collect()
}

/// Whether a live report already covers exactly `[start, end)` for a teacher.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn live_report_exists(
    conn: &mut SqliteConnection,
    teacher_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<bool, PersistenceError> {
    let count: i64 = salary_reports::table
        .filter(salary_reports::teacher_id.eq(teacher_id))
        .filter(salary_reports::deleted_at.is_null())
        .filter(salary_reports::start_date.eq(encode_instant(start)))
        .filter(salary_reports::end_date.eq(encode_instant(end)))
        .count()
        .get_result(conn)?;

    Ok(count > 0)
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lenient full-table reads for the reconciliation checks.
//!
//! A row that cannot be decoded is set aside with its error; the rest of
//! the table is still returned.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::warn;
use tutor_ledger_domain::{Bill, BillItem, SalaryReport, WorkSession};

use crate::data_models::{BillItemRow, BillRow, SalaryReportRow, WorkSessionRow};
use crate::diesel_schema::{bill_items, bills, salary_reports, work_sessions};
use crate::error::PersistenceError;

/// A stored row that could not be turned into a domain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableRow {
    pub table: &'static str,
    pub row_id: i64,
    pub error: String,
}

/// Every decodable record of a table, plus the rows that were not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scanned<T> {
    pub records: Vec<T>,
    pub unreadable: Vec<UnreadableRow>,
}

fn partition<R, T>(rows: Vec<R>, table: &'static str, row_id: fn(&R) -> i64) -> Scanned<T>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    let mut scanned: Scanned<T> = Scanned {
        records: Vec::with_capacity(rows.len()),
        unreadable: Vec::new(),
    };

    for row in rows {
        let id: i64 = row_id(&row);
        match T::try_from(row) {
            Ok(record) => scanned.records.push(record),
            Err(error) => {
                warn!(table, row_id = id, %error, "Skipping unreadable row");
                scanned.unreadable.push(UnreadableRow {
                    table,
                    row_id: id,
                    error: error.to_string(),
                });
            }
        }
    }

    scanned
}

/// Reads every work session, deleted ones included.
///
/// # Errors
///
/// Returns an error only if the query itself fails.
pub fn scan_work_sessions(
    conn: &mut SqliteConnection,
) -> Result<Scanned<WorkSession>, PersistenceError> {
    let rows: Vec<WorkSessionRow> = work_sessions::table
        .order(work_sessions::work_session_id.asc())
        .select(WorkSessionRow::as_select())
        .load(conn)?;

    Ok(partition(rows, "work_sessions", |row| row.work_session_id))
}

/// Reads every salary report, deleted ones included.
///
/// # Errors
///
/// Returns an error only if the query itself fails.
pub fn scan_salary_reports(
    conn: &mut SqliteConnection,
) -> Result<Scanned<SalaryReport>, PersistenceError> {
    let rows: Vec<SalaryReportRow> = salary_reports::table
        .order(salary_reports::salary_report_id.asc())
        .select(SalaryReportRow::as_select())
        .load(conn)?;

    Ok(partition(rows, "salary_reports", |row| row.salary_report_id))
}

/// Reads every bill.
///
/// # Errors
///
/// Returns an error only if the query itself fails.
pub fn scan_bills(conn: &mut SqliteConnection) -> Result<Scanned<Bill>, PersistenceError> {
    let rows: Vec<BillRow> = bills::table
        .order(bills::bill_id.asc())
        .select(BillRow::as_select())
        .load(conn)?;

    Ok(partition(rows, "bills", |row| row.bill_id))
}

/// Reads every bill item.
///
/// # Errors
///
/// Returns an error only if the query itself fails.
pub fn scan_bill_items(conn: &mut SqliteConnection) -> Result<Scanned<BillItem>, PersistenceError> {
    let rows: Vec<BillItemRow> = bill_items::table
        .order(bill_items::bill_item_id.asc())
        .select(BillItemRow::as_select())
        .load(conn)?;

    Ok(partition(rows, "bill_items", |row| row.bill_item_id))
}

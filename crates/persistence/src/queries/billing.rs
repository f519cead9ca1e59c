// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bill and bill item queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tutor_ledger_domain::{Bill, BillItem, BillingMonth};

use crate::codec::encode_month;
use crate::data_models::{BillItemRow, BillRow};
use crate::diesel_schema::{bill_items, bills};
use crate::error::PersistenceError;

fn decode_bills(rows: Vec<BillRow>) -> Result<Vec<Bill>, PersistenceError> {
    rows.into_iter().map(Bill::try_from).collect()
}

fn decode_items(rows: Vec<BillItemRow>) -> Result<Vec<BillItem>, PersistenceError> {
    rows.into_iter().map(BillItem::try_from).collect()
}

/// Retrieves a bill by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn get_bill(conn: &mut SqliteConnection, bill_id: i64) -> Result<Option<Bill>, PersistenceError> {
    bills::table
        .filter(bills::bill_id.eq(bill_id))
        .select(BillRow::as_select())
        .first::<BillRow>(conn)
        .optional()?
        .map(Bill::try_from)
        .transpose()
}

/// Retrieves the bill of a student for a month.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn get_bill_for_month(
    conn: &mut SqliteConnection,
    student_id: i64,
    month: BillingMonth,
) -> Result<Option<Bill>, PersistenceError> {
    bills::table
        .filter(bills::student_id.eq(student_id))
        .filter(bills::month.eq(encode_month(month)?))
        .select(BillRow::as_select())
        .first::<BillRow>(conn)
        .optional()?
        .map(Bill::try_from)
        .transpose()
}

/// Lists every bill.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn list_bills(conn: &mut SqliteConnection) -> Result<Vec<Bill>, PersistenceError> {
    let rows: Vec<BillRow> = bills::table
        .order(bills::bill_id.asc())
        .select(BillRow::as_select())
        .load(conn)?;

    decode_bills(rows)
}

/// Lists a student's bills, newest month first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn list_student_bills(
    conn: &mut SqliteConnection,
    student_id: i64,
) -> Result<Vec<Bill>, PersistenceError> {
    let rows: Vec<BillRow> = bills::table
        .filter(bills::student_id.eq(student_id))
        .order(bills::month.desc())
        .select(BillRow::as_select())
        .load(conn)?;

    decode_bills(rows)
}

/// Retrieves a bill item by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn get_bill_item(
    conn: &mut SqliteConnection,
    bill_item_id: i64,
) -> Result<Option<BillItem>, PersistenceError> {
    bill_items::table
        .filter(bill_items::bill_item_id.eq(bill_item_id))
        .select(BillItemRow::as_select())
        .first::<BillItemRow>(conn)
        .optional()?
        .map(BillItem::try_from)
        .transpose()
}

/// Retrieves the line billing a work session, if it has been billed.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn get_bill_item_for_session(
    conn: &mut SqliteConnection,
    work_session_id: i64,
) -> Result<Option<BillItem>, PersistenceError> {
    bill_items::table
        .filter(bill_items::work_session_id.eq(work_session_id))
        .select(BillItemRow::as_select())
        .first::<BillItemRow>(conn)
        .optional()?
        .map(BillItem::try_from)
        .transpose()
}

/// Lists the items of one bill in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn list_bill_items(
    conn: &mut SqliteConnection,
    bill_id: i64,
) -> Result<Vec<BillItem>, PersistenceError> {
    let rows: Vec<BillItemRow> = bill_items::table
        .filter(bill_items::bill_id.eq(bill_id))
        .order(bill_items::bill_item_id.asc())
        .select(BillItemRow::as_select())
        .load(conn)?;

    decode_items(rows)
}

/// Lists every bill item.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn list_all_bill_items(
    conn: &mut SqliteConnection,
) -> Result<Vec<BillItem>, PersistenceError> {
    let rows: Vec<BillItemRow> = bill_items::table
        .order(bill_items::bill_item_id.asc())
        .select(BillItemRow::as_select())
        .load(conn)?;

    decode_items(rows)
}

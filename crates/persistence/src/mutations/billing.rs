// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bill and bill item mutations.
//!
//! Every item change must be followed by `resum_bill_total` in the same
//! transaction; the adapter in `lib.rs` does this.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use tracing::{debug, info};
use tutor_ledger::billable_total;
use tutor_ledger_domain::{Bill, BillItem, BillLine, BillingMonth};

use crate::backend::PersistenceBackend;
use crate::codec::{encode_decimal, encode_instant, encode_month};
use crate::data_models::NewBillItemRow;
use crate::diesel_schema::{bill_items, bills};
use crate::error::PersistenceError;
use crate::queries;

/// Returns the bill for `(student, month)`, creating an empty one if needed.
///
/// # Returns
///
/// The bill and whether it was created by this call.
///
/// # Errors
///
/// Returns `IntegrityViolation` if the student does not exist.
pub fn find_or_create_bill(
    conn: &mut SqliteConnection,
    student_id: i64,
    month: BillingMonth,
    now: DateTime<Utc>,
) -> Result<(Bill, bool), PersistenceError> {
    if let Some(bill) = queries::billing::get_bill_for_month(conn, student_id, month)? {
        return Ok((bill, false));
    }

    let now_text: String = encode_instant(now);
    diesel::insert_into(bills::table)
        .values((
            bills::student_id.eq(student_id),
            bills::month.eq(encode_month(month)?),
            bills::total_amount.eq(Some(encode_decimal(Decimal::ZERO))),
            bills::is_paid.eq(0),
            bills::created_at.eq(&now_text),
            bills::updated_at.eq(&now_text),
        ))
        .execute(conn)?;

    let bill_id: i64 = conn.get_last_insert_rowid()?;
    info!(bill_id, student_id, %month, "Opened bill");

    let bill: Bill = queries::billing::get_bill(conn, bill_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("Bill {bill_id}")))?;
    Ok((bill, true))
}

/// Inserts a line into a bill and returns the stored item.
///
/// # Errors
///
/// Returns `IntegrityViolation` if the bill is missing or the line bills a
/// work session that is already billed.
pub fn insert_bill_item(
    conn: &mut SqliteConnection,
    bill_id: i64,
    line: &BillLine,
    now: DateTime<Utc>,
) -> Result<BillItem, PersistenceError> {
    diesel::insert_into(bill_items::table)
        .values(NewBillItemRow::from_line(bill_id, line, &encode_instant(now)))
        .execute(conn)?;

    let bill_item_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        bill_item_id,
        bill_id,
        amount = %line.amount(),
        work_session_id = ?line.work_session_id(),
        "Added bill item"
    );

    Ok(BillItem {
        bill_item_id,
        bill_id,
        line: line.clone(),
    })
}

/// Replaces the quantity, description and amount of an item.
///
/// # Errors
///
/// Returns `NotFound` if the item does not exist.
pub fn update_bill_item(
    conn: &mut SqliteConnection,
    bill_item_id: i64,
    line: &BillLine,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::update(bill_items::table)
        .filter(bill_items::bill_item_id.eq(bill_item_id))
        .set((
            bill_items::service_description.eq(line.service_description()),
            bill_items::quantity.eq(encode_decimal(line.quantity())),
            bill_items::amount.eq(encode_decimal(line.amount())),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Bill item {bill_item_id}"
        )));
    }

    info!(bill_item_id, amount = %line.amount(), "Updated bill item");
    Ok(())
}

/// Deletes an item.
///
/// # Errors
///
/// Returns `NotFound` if the item does not exist.
pub fn delete_bill_item(
    conn: &mut SqliteConnection,
    bill_item_id: i64,
) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(bill_items::table)
        .filter(bill_items::bill_item_id.eq(bill_item_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Bill item {bill_item_id}"
        )));
    }

    info!(bill_item_id, "Deleted bill item");
    Ok(())
}

/// Recomputes a bill's total from its billable items and stores it.
///
/// # Errors
///
/// Returns an error if the items cannot be loaded or the bill is missing.
pub fn resum_bill_total(
    conn: &mut SqliteConnection,
    bill_id: i64,
    now: DateTime<Utc>,
) -> Result<Decimal, PersistenceError> {
    let items: Vec<BillItem> = queries::billing::list_bill_items(conn, bill_id)?;
    let total: Decimal = billable_total(items.iter().map(|item| &item.line));

    let rows_affected: usize = diesel::update(bills::table)
        .filter(bills::bill_id.eq(bill_id))
        .set((
            bills::total_amount.eq(Some(encode_decimal(total))),
            bills::updated_at.eq(encode_instant(now)),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("Bill {bill_id}")));
    }

    debug!(bill_id, %total, items = items.len(), "Re-summed bill total");
    Ok(total)
}

/// Marks a bill paid at `paid_at`.
///
/// # Errors
///
/// Returns `NotFound` if the bill does not exist.
pub fn mark_bill_paid(
    conn: &mut SqliteConnection,
    bill_id: i64,
    paid_at: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    let paid_text: String = encode_instant(paid_at);
    let rows_affected: usize = diesel::update(bills::table)
        .filter(bills::bill_id.eq(bill_id))
        .set((
            bills::is_paid.eq(1),
            bills::payment_date.eq(Some(paid_text.clone())),
            bills::updated_at.eq(&paid_text),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("Bill {bill_id}")));
    }

    info!(bill_id, "Marked bill paid");
    Ok(())
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tutor_ledger_domain::{
    Bill, BillItem, BillLine, BillingMonth, NewWorkSession, RateSnapshot, SessionAmounts,
    StoredWorkSession, TaskTemplate, WorkEntry, WorkSession,
};

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap()
}

pub fn create_test_task(task_id: i64, hourly_rate: &str, price: &str) -> TaskTemplate {
    TaskTemplate {
        task_id,
        name: format!("Task {task_id}"),
        description: None,
        hourly_rate: dec(hourly_rate),
        price: dec(price),
        is_active: true,
    }
}

/// A manual session logged against task 1 at 15.00/15.00.
pub fn create_test_session(
    work_session_id: i64,
    teacher_id: i64,
    created_at: DateTime<Utc>,
    hours: &str,
) -> WorkSession {
    create_test_session_for_task(
        work_session_id,
        teacher_id,
        created_at,
        hours,
        &create_test_task(1, "15.00", "15.00"),
    )
}

pub fn create_test_session_for_task(
    work_session_id: i64,
    teacher_id: i64,
    created_at: DateTime<Utc>,
    hours: &str,
    task: &TaskTemplate,
) -> WorkSession {
    let draft: NewWorkSession = NewWorkSession {
        teacher_id,
        student_id: Some(3),
        entry: WorkEntry::manual(dec(hours)),
        created_at: Some(created_at),
    };
    WorkSession::log(draft, task, created_at)
        .unwrap()
        .with_id(work_session_id)
}

/// A stored session rehydrated as-is, so tests can model drifted rows.
pub fn create_stored_session(
    work_session_id: i64,
    entry: WorkEntry,
    rates: RateSnapshot,
    stored_hours: Option<Decimal>,
    amounts: SessionAmounts,
) -> WorkSession {
    WorkSession::restore(StoredWorkSession {
        work_session_id,
        teacher_id: 1,
        task_id: 1,
        student_id: Some(3),
        entry,
        rates,
        stored_hours,
        amounts,
        created_at: at(2026, 3, 2, 9, 0),
        deleted_at: None,
    })
}

pub fn create_test_bill(bill_id: i64, student_id: i64, total: Option<&str>) -> Bill {
    Bill {
        bill_id,
        student_id,
        month: BillingMonth::new(2026, 3).unwrap(),
        total_amount: total.map(dec),
        is_paid: false,
        payment_date: None,
        created_at: at(2026, 3, 1, 8, 0),
        updated_at: at(2026, 3, 1, 8, 0),
    }
}

pub fn create_test_item(
    bill_item_id: i64,
    bill_id: i64,
    price: &str,
    quantity: &str,
    amount: &str,
) -> BillItem {
    BillItem {
        bill_item_id,
        bill_id,
        line: BillLine::from_stored(
            String::from("Exam preparation pack"),
            None,
            dec(price),
            dec(quantity),
            dec(amount),
            None,
        ),
    }
}

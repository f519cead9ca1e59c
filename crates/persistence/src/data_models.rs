// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Diesel row types and their conversions into domain records.
//!
//! Rows mirror the tables exactly. Conversions decode text columns and
//! fail with `PersistenceError::CorruptValue` instead of guessing.

use diesel::prelude::*;
use tutor_ledger_domain::{
    Bill, BillItem, BillLine, InspectorProfile, RateSnapshot, SalaryReport, ServiceTemplate,
    SessionAmounts, StoredWorkSession, StudentProfile, TaskTemplate, TeacherProfile, UserAccount,
    WorkEntry, WorkSession,
};

use crate::codec::{
    decode_decimal, decode_flag, decode_instant, decode_month, decode_optional_decimal,
    decode_optional_instant, encode_decimal, encode_instant,
};
use crate::diesel_schema::{
    bill_items, bills, inspectors, salary_reports, services, students, tasks, teachers, users,
    work_sessions,
};
use crate::error::PersistenceError;

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub is_superuser: i32,
    pub is_inspector: i32,
    pub is_teacher: i32,
    pub is_student: i32,
}

impl From<UserRow> for UserAccount {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            display_name: row.display_name,
            is_superuser: decode_flag(row.is_superuser),
            is_inspector: decode_flag(row.is_inspector),
            is_teacher: decode_flag(row.is_teacher),
            is_student: decode_flag(row.is_student),
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = teachers)]
pub struct TeacherRow {
    pub teacher_id: i64,
    pub user_id: i64,
    pub subjects: Option<String>,
}

impl From<TeacherRow> for TeacherProfile {
    fn from(row: TeacherRow) -> Self {
        Self {
            teacher_id: row.teacher_id,
            user_id: row.user_id,
            subjects: row.subjects,
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = students)]
pub struct StudentRow {
    pub student_id: i64,
    pub user_id: i64,
    pub phone: Option<String>,
    pub is_active: i32,
}

impl From<StudentRow> for StudentProfile {
    fn from(row: StudentRow) -> Self {
        Self {
            student_id: row.student_id,
            user_id: row.user_id,
            phone: row.phone,
            is_active: decode_flag(row.is_active),
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = inspectors)]
pub struct InspectorRow {
    pub inspector_id: i64,
    pub user_id: i64,
}

impl From<InspectorRow> for InspectorProfile {
    fn from(row: InspectorRow) -> Self {
        Self {
            inspector_id: row.inspector_id,
            user_id: row.user_id,
        }
    }
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = tasks)]
pub struct TaskRow {
    pub task_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub hourly_rate: String,
    pub price: String,
    pub is_active: i32,
}

impl TryFrom<TaskRow> for TaskTemplate {
    type Error = PersistenceError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Self {
            task_id: row.task_id,
            hourly_rate: decode_decimal("tasks", "hourly_rate", &row.hourly_rate)?,
            price: decode_decimal("tasks", "price", &row.price)?,
            name: row.name,
            description: row.description,
            is_active: decode_flag(row.is_active),
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = services)]
pub struct ServiceRow {
    pub service_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub is_active: i32,
}

impl TryFrom<ServiceRow> for ServiceTemplate {
    type Error = PersistenceError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            service_id: row.service_id,
            price: decode_decimal("services", "price", &row.price)?,
            name: row.name,
            description: row.description,
            is_active: decode_flag(row.is_active),
        })
    }
}

// ============================================================================
// Work sessions
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = work_sessions)]
pub struct WorkSessionRow {
    pub work_session_id: i64,
    pub teacher_id: i64,
    pub task_id: i64,
    pub student_id: Option<i64>,
    pub entry_type: String,
    pub manual_hours: Option<String>,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub hourly_rate: Option<String>,
    pub task_price: Option<String>,
    pub stored_hours: Option<String>,
    pub total_amount: Option<String>,
    pub teacher_payment_amount: Option<String>,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

const WS: &str = "work_sessions";

impl WorkSessionRow {
    fn entry(&self) -> Result<WorkEntry, PersistenceError> {
        match self.entry_type.as_str() {
            "manual" => Ok(WorkEntry::Manual {
                hours: decode_optional_decimal(WS, "manual_hours", self.manual_hours.as_deref())?,
            }),
            "clock" => Ok(WorkEntry::Clock {
                clock_in: decode_optional_instant(WS, "clock_in", self.clock_in.as_deref())?,
                clock_out: decode_optional_instant(WS, "clock_out", self.clock_out.as_deref())?,
            }),
            "time_range" => Ok(WorkEntry::TimeRange {
                start: decode_optional_instant(WS, "start_time", self.start_time.as_deref())?,
                end: decode_optional_instant(WS, "end_time", self.end_time.as_deref())?,
            }),
            other => Err(PersistenceError::CorruptValue {
                table: WS,
                column: "entry_type",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<WorkSessionRow> for WorkSession {
    type Error = PersistenceError;

    fn try_from(row: WorkSessionRow) -> Result<Self, Self::Error> {
        let entry: WorkEntry = row.entry()?;
        let rates: RateSnapshot = RateSnapshot::from_stored(
            decode_optional_decimal(WS, "hourly_rate", row.hourly_rate.as_deref())?,
            decode_optional_decimal(WS, "task_price", row.task_price.as_deref())?,
        );
        let amounts: SessionAmounts = SessionAmounts {
            total_amount: decode_optional_decimal(WS, "total_amount", row.total_amount.as_deref())?,
            teacher_payment_amount: decode_optional_decimal(
                WS,
                "teacher_payment_amount",
                row.teacher_payment_amount.as_deref(),
            )?,
        };

        Ok(Self::restore(StoredWorkSession {
            work_session_id: row.work_session_id,
            teacher_id: row.teacher_id,
            task_id: row.task_id,
            student_id: row.student_id,
            entry,
            rates,
            stored_hours: decode_optional_decimal(WS, "stored_hours", row.stored_hours.as_deref())?,
            amounts,
            created_at: decode_instant(WS, "created_at", &row.created_at)?,
            deleted_at: decode_optional_instant(WS, "deleted_at", row.deleted_at.as_deref())?,
        }))
    }
}

/// The column values a work session writes.
///
/// Used for both inserts and updates, so a session is always written as
/// a whole and its derived columns never drift from its inputs.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = work_sessions)]
#[diesel(treat_none_as_null = true)]
pub struct WorkSessionValues {
    pub teacher_id: i64,
    pub task_id: i64,
    pub student_id: Option<i64>,
    pub entry_type: String,
    pub manual_hours: Option<String>,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub hourly_rate: Option<String>,
    pub task_price: Option<String>,
    pub stored_hours: Option<String>,
    pub total_amount: Option<String>,
    pub teacher_payment_amount: Option<String>,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

impl From<&WorkSession> for WorkSessionValues {
    fn from(session: &WorkSession) -> Self {
        let (manual_hours, clock_in, clock_out, start_time, end_time) = match *session.entry() {
            WorkEntry::Manual { hours } => (hours.map(encode_decimal), None, None, None, None),
            WorkEntry::Clock {
                clock_in,
                clock_out,
            } => (
                None,
                clock_in.map(encode_instant),
                clock_out.map(encode_instant),
                None,
                None,
            ),
            WorkEntry::TimeRange { start, end } => (
                None,
                None,
                None,
                start.map(encode_instant),
                end.map(encode_instant),
            ),
        };
        let amounts: SessionAmounts = session.amounts();

        Self {
            teacher_id: session.teacher_id(),
            task_id: session.task_id(),
            student_id: session.student_id(),
            entry_type: session.entry_type().as_str().to_string(),
            manual_hours,
            clock_in,
            clock_out,
            start_time,
            end_time,
            hourly_rate: session.rates().hourly_rate().map(encode_decimal),
            task_price: session.rates().price().map(encode_decimal),
            stored_hours: session.stored_hours().map(encode_decimal),
            total_amount: amounts.total_amount.map(encode_decimal),
            teacher_payment_amount: amounts.teacher_payment_amount.map(encode_decimal),
            created_at: encode_instant(session.created_at()),
            deleted_at: session.deleted_at().map(encode_instant),
        }
    }
}

// ============================================================================
// Salary reports
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = salary_reports)]
pub struct SalaryReportRow {
    pub salary_report_id: i64,
    pub teacher_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub total_hours: String,
    pub total_amount: String,
    pub created_at: String,
    pub created_by: Option<i64>,
    pub notes: String,
    pub deleted_at: Option<String>,
}

const SR: &str = "salary_reports";

impl TryFrom<SalaryReportRow> for SalaryReport {
    type Error = PersistenceError;

    fn try_from(row: SalaryReportRow) -> Result<Self, Self::Error> {
        Ok(Self {
            salary_report_id: row.salary_report_id,
            teacher_id: row.teacher_id,
            start_date: decode_instant(SR, "start_date", &row.start_date)?,
            end_date: decode_instant(SR, "end_date", &row.end_date)?,
            total_hours: decode_decimal(SR, "total_hours", &row.total_hours)?,
            total_amount: decode_decimal(SR, "total_amount", &row.total_amount)?,
            created_at: decode_instant(SR, "created_at", &row.created_at)?,
            created_by: row.created_by,
            notes: row.notes,
            deleted_at: decode_optional_instant(SR, "deleted_at", row.deleted_at.as_deref())?,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = salary_reports)]
pub struct NewSalaryReportRow {
    pub teacher_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub total_hours: String,
    pub total_amount: String,
    pub created_at: String,
    pub created_by: Option<i64>,
    pub notes: String,
}

// ============================================================================
// Billing
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bills)]
pub struct BillRow {
    pub bill_id: i64,
    pub student_id: i64,
    pub month: String,
    pub total_amount: Option<String>,
    pub is_paid: i32,
    pub payment_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<BillRow> for Bill {
    type Error = PersistenceError;

    fn try_from(row: BillRow) -> Result<Self, Self::Error> {
        Ok(Self {
            bill_id: row.bill_id,
            student_id: row.student_id,
            month: decode_month(&row.month)?,
            total_amount: decode_optional_decimal(
                "bills",
                "total_amount",
                row.total_amount.as_deref(),
            )?,
            is_paid: decode_flag(row.is_paid),
            payment_date: decode_optional_instant(
                "bills",
                "payment_date",
                row.payment_date.as_deref(),
            )?,
            created_at: decode_instant("bills", "created_at", &row.created_at)?,
            updated_at: decode_instant("bills", "updated_at", &row.updated_at)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bill_items)]
pub struct BillItemRow {
    pub bill_item_id: i64,
    pub bill_id: i64,
    pub service_name: String,
    pub service_description: Option<String>,
    pub price_at_billing: String,
    pub quantity: String,
    pub amount: String,
    pub work_session_id: Option<i64>,
}

const BI: &str = "bill_items";

impl TryFrom<BillItemRow> for BillItem {
    type Error = PersistenceError;

    fn try_from(row: BillItemRow) -> Result<Self, Self::Error> {
        let line: BillLine = BillLine::from_stored(
            row.service_name,
            row.service_description,
            decode_decimal(BI, "price_at_billing", &row.price_at_billing)?,
            decode_decimal(BI, "quantity", &row.quantity)?,
            decode_decimal(BI, "amount", &row.amount)?,
            row.work_session_id,
        );
        Ok(Self {
            bill_item_id: row.bill_item_id,
            bill_id: row.bill_id,
            line,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = bill_items)]
pub struct NewBillItemRow {
    pub bill_id: i64,
    pub service_name: String,
    pub service_description: Option<String>,
    pub price_at_billing: String,
    pub quantity: String,
    pub amount: String,
    pub work_session_id: Option<i64>,
    pub created_at: String,
}

impl NewBillItemRow {
    #[must_use]
    pub fn from_line(bill_id: i64, line: &BillLine, created_at: &str) -> Self {
        Self {
            bill_id,
            service_name: line.service_name().to_string(),
            service_description: line.service_description().map(str::to_string),
            price_at_billing: encode_decimal(line.price_at_billing()),
            quantity: encode_decimal(line.quantity()),
            amount: encode_decimal(line.amount()),
            work_session_id: line.work_session_id(),
            created_at: created_at.to_string(),
        }
    }
}

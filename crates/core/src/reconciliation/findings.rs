// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tutor_ledger_domain::{BillingMonth, DomainError};

use super::Severity;
use crate::error::CoreError;

/// Which frozen amount of a session disagrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountField {
    /// The student-facing `total_amount`.
    Customer,
    /// The teacher-facing `teacher_payment_amount`.
    Worker,
}

impl std::fmt::Display for AmountField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "total_amount"),
            Self::Worker => write!(f, "teacher_payment_amount"),
        }
    }
}

/// The profile tables attached to user accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProfileKind {
    Teacher,
    Student,
    Inspector,
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Teacher => write!(f, "teacher"),
            Self::Student => write!(f, "student"),
            Self::Inspector => write!(f, "inspector"),
        }
    }
}

/// A row pointing at a parent row that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingReference {
    pub table: &'static str,
    pub row_id: i64,
    pub column: &'static str,
    pub target_id: i64,
}

/// A single verification finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// A salary report's frozen totals differ from its sessions.
    SalaryReportDrift {
        salary_report_id: i64,
        teacher_id: i64,
        stored_hours: Decimal,
        expected_hours: Decimal,
        stored_amount: Decimal,
        expected_amount: Decimal,
    },
    /// A salary report's sessions could not be summed.
    UncomputableSalaryReport {
        salary_report_id: i64,
        teacher_id: i64,
        error: CoreError,
    },
    /// A stored row could not be decoded and was left out of the checks.
    CorruptRow {
        table: &'static str,
        row_id: i64,
        error: String,
    },
    /// A bill total differs from the sum of its billable lines.
    BillTotalMismatch {
        bill_id: i64,
        stored: Option<Decimal>,
        expected: Decimal,
    },
    /// A bill line amount differs from quantity times frozen price.
    BillItemAmountMismatch {
        bill_id: i64,
        bill_item_id: i64,
        stored: Decimal,
        expected: Option<Decimal>,
    },
    /// A bill is flagged paid without a payment timestamp.
    PaidWithoutPaymentDate { bill_id: i64 },
    /// More than one bill exists for a student and month.
    DuplicateBill {
        student_id: i64,
        month: BillingMonth,
        bill_ids: Vec<i64>,
    },
    /// A bill has no lines.
    EmptyBill { bill_id: i64 },
    /// An active student has never been billed.
    StudentWithoutBill { student_id: i64 },
    /// A bill has no total written.
    BillWithoutTotal { bill_id: i64 },
    /// Stored entry inputs are not valid for their entry type.
    InvalidEntry {
        work_session_id: i64,
        error: DomainError,
    },
    /// Stored hours differ from a recomputation from the inputs.
    HoursMismatch {
        work_session_id: i64,
        stored: Option<Decimal>,
        expected: Option<Decimal>,
    },
    /// A frozen amount differs from the calculator applied to the snapshot.
    AmountMismatch {
        work_session_id: i64,
        field: AmountField,
        stored: Option<Decimal>,
        expected: Option<Decimal>,
    },
    /// A session has no frozen hourly rate or price.
    MissingRateSnapshot { work_session_id: i64 },
    /// A closed or non-clock session has no stored hours.
    MissingStoredHours { work_session_id: i64 },
    /// A clock session has not been closed.
    OpenClockSession {
        work_session_id: i64,
        teacher_id: i64,
        clock_in: DateTime<Utc>,
    },
    /// Two sessions of one teacher occupy intersecting windows.
    OverlappingSessions {
        teacher_id: i64,
        first: i64,
        second: i64,
        first_window: (DateTime<Utc>, DateTime<Utc>),
        second_window: (DateTime<Utc>, DateTime<Utc>),
    },
    /// A row references a missing parent.
    Dangling(DanglingReference),
    /// A user has more than one profile of one kind.
    DuplicateProfile {
        kind: ProfileKind,
        user_id: i64,
        count: i64,
    },
    /// A user holds more than one of the inspector, teacher and student flags.
    MultipleRoles { user_id: i64, username: String },
    /// A non-owner user holds no role flag.
    NoRole { user_id: i64, username: String },
    /// A role flag is set but the matching profile is missing.
    RoleWithoutProfile {
        user_id: i64,
        username: String,
        kind: ProfileKind,
    },
    /// A profile exists but the matching role flag is not set.
    ProfileWithoutRole {
        user_id: i64,
        username: String,
        kind: ProfileKind,
    },
}

impl Finding {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::EmptyBill { .. }
            | Self::StudentWithoutBill { .. }
            | Self::OpenClockSession { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

fn show(value: Option<Decimal>) -> String {
    value.map_or_else(|| String::from("none"), |v| v.to_string())
}

impl std::fmt::Display for Finding {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] ", self.severity())?;
        match self {
            Self::SalaryReportDrift {
                salary_report_id,
                teacher_id,
                stored_hours,
                expected_hours,
                stored_amount,
                expected_amount,
            } => write!(
                f,
                "salary report {salary_report_id} (teacher {teacher_id}): stored {stored_hours} h / {stored_amount}, sessions give {expected_hours} h / {expected_amount}"
            ),
            Self::UncomputableSalaryReport {
                salary_report_id,
                teacher_id,
                error,
            } => write!(
                f,
                "salary report {salary_report_id} (teacher {teacher_id}): cannot recompute: {error}"
            ),
            Self::CorruptRow {
                table,
                row_id,
                error,
            } => write!(f, "{table} {row_id}: unreadable row: {error}"),
            Self::BillTotalMismatch {
                bill_id,
                stored,
                expected,
            } => write!(
                f,
                "bill {bill_id}: total {} does not match billable sum {expected}",
                show(*stored)
            ),
            Self::BillItemAmountMismatch {
                bill_id,
                bill_item_id,
                stored,
                expected,
            } => write!(
                f,
                "bill {bill_id} item {bill_item_id}: amount {stored} != quantity x price {}",
                show(*expected)
            ),
            Self::PaidWithoutPaymentDate { bill_id } => {
                write!(f, "bill {bill_id}: marked paid but has no payment date")
            }
            Self::DuplicateBill {
                student_id,
                month,
                bill_ids,
            } => write!(
                f,
                "student {student_id}: {} bills for {month} ({bill_ids:?})",
                bill_ids.len()
            ),
            Self::EmptyBill { bill_id } => write!(f, "bill {bill_id}: has no items"),
            Self::StudentWithoutBill { student_id } => {
                write!(f, "student {student_id}: active but has no bills")
            }
            Self::BillWithoutTotal { bill_id } => {
                write!(f, "bill {bill_id}: has no total amount")
            }
            Self::InvalidEntry {
                work_session_id,
                error,
            } => write!(f, "work session {work_session_id}: {error}"),
            Self::HoursMismatch {
                work_session_id,
                stored,
                expected,
            } => write!(
                f,
                "work session {work_session_id}: stored hours {} but inputs give {}",
                show(*stored),
                show(*expected)
            ),
            Self::AmountMismatch {
                work_session_id,
                field,
                stored,
                expected,
            } => write!(
                f,
                "work session {work_session_id}: {field} {} but snapshot gives {}",
                show(*stored),
                show(*expected)
            ),
            Self::MissingRateSnapshot { work_session_id } => {
                write!(f, "work session {work_session_id}: no frozen rate snapshot")
            }
            Self::MissingStoredHours { work_session_id } => {
                write!(f, "work session {work_session_id}: no stored hours")
            }
            Self::OpenClockSession {
                work_session_id,
                teacher_id,
                clock_in,
            } => write!(
                f,
                "work session {work_session_id} (teacher {teacher_id}): clocked in at {clock_in}, not closed"
            ),
            Self::OverlappingSessions {
                teacher_id,
                first,
                second,
                first_window,
                second_window,
            } => write!(
                f,
                "teacher {teacher_id}: session {first} [{} - {}) overlaps session {second} [{} - {})",
                first_window.0, first_window.1, second_window.0, second_window.1
            ),
            Self::Dangling(reference) => write!(
                f,
                "{} {}: {} references missing row {}",
                reference.table, reference.row_id, reference.column, reference.target_id
            ),
            Self::DuplicateProfile {
                kind,
                user_id,
                count,
            } => write!(f, "user {user_id}: {count} {kind} profiles"),
            Self::MultipleRoles { user_id, username } => {
                write!(f, "user {username} ({user_id}): has multiple roles")
            }
            Self::NoRole { user_id, username } => {
                write!(f, "user {username} ({user_id}): has no role")
            }
            Self::RoleWithoutProfile {
                user_id,
                username,
                kind,
            } => write!(
                f,
                "user {username} ({user_id}): flagged {kind} but has no {kind} profile"
            ),
            Self::ProfileWithoutRole {
                user_id,
                username,
                kind,
            } => write!(
                f,
                "user {username} ({user_id}): has a {kind} profile but is not flagged {kind}"
            ),
        }
    }
}

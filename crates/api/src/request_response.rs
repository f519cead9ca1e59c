// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tutor_ledger::{Severity, VerificationReport};
use tutor_ledger_domain::{Bill, BillItem, SalaryReport, WorkEntry, WorkSession};
use tutor_ledger_persistence::{BillOpening, ReportRunOutcome};

use crate::auth::Role;
use crate::capabilities::RoleCapabilities;

// ============================================================================
// Work sessions
// ============================================================================

/// API request to log a work session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogWorkRequest {
    /// The teacher who did the work.
    pub teacher_id: i64,
    /// The task template whose rates are frozen onto the session.
    pub task_id: i64,
    /// The student taught, if any.
    pub student_id: Option<i64>,
    /// How the time was recorded.
    pub entry: WorkEntry,
    /// Creation instant; defaults to the request time.
    pub created_at: Option<DateTime<Utc>>,
}

/// API request to close an open clock session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseWorkSessionRequest {
    pub work_session_id: i64,
    pub clock_out: DateTime<Utc>,
}

/// API response for a logged or closed work session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSessionResponse {
    pub session: WorkSession,
    /// The bill line produced for the session, if it was billable.
    pub bill_item: Option<BillItem>,
    /// A success message.
    pub message: String,
}

/// API response listing sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListWorkSessionsResponse {
    pub sessions: Vec<WorkSession>,
}

// ============================================================================
// Salary reports
// ============================================================================

/// API request to create a salary report for one teacher and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSalaryReportRequest {
    pub teacher_id: i64,
    pub year: i32,
    /// Calendar month, 1 to 12.
    pub month: u32,
    /// Free-text notes stored on the report.
    pub notes: Option<String>,
}

/// API request to create the month's report for every teacher lacking one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSalaryReportsRequest {
    pub year: i32,
    pub month: u32,
}

/// API response for a single salary report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryReportResponse {
    pub report: SalaryReport,
    /// A success message.
    pub message: String,
}

/// API response for a bulk salary run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSalaryReportsResponse {
    /// The month, as `YYYY-MM`.
    pub month: String,
    pub outcomes: Vec<ReportRunOutcome>,
    pub created: usize,
    pub skipped: usize,
}

// ============================================================================
// Billing
// ============================================================================

/// API request to add a service line to a student's monthly bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeServiceRequest {
    pub student_id: i64,
    pub service_id: i64,
    pub year: i32,
    pub month: u32,
    /// Must be positive.
    pub quantity: Decimal,
    /// Replaces the catalog description on the line.
    pub description: Option<String>,
}

/// API request to change a bill line.
///
/// Fields left as `None` are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditBillItemRequest {
    pub bill_item_id: i64,
    pub quantity: Option<Decimal>,
    pub description: Option<String>,
}

/// API response for a changed bill line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillItemResponse {
    pub item: BillItem,
    /// The bill's total after re-summing.
    pub bill_total: Decimal,
}

/// API response for a deleted bill line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteBillItemResponse {
    pub bill_item_id: i64,
    pub bill_id: i64,
    pub bill_total: Decimal,
}

/// API response for a bill-a-session request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillWorkSessionResponse {
    pub work_session_id: i64,
    /// `None` when the session is not billable.
    pub bill_item: Option<BillItem>,
}

/// API response for opening a month's bills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenBillsResponse {
    pub month: String,
    pub openings: Vec<BillOpening>,
}

/// API response listing a student's bills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBillsResponse {
    pub student_id: i64,
    pub bills: Vec<Bill>,
}

/// API response for a student's outstanding balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub student_id: i64,
    /// Sum of the totals of unpaid bills.
    pub balance: Decimal,
}

// ============================================================================
// Catalog and accounts
// ============================================================================

/// API request to add a task template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    pub description: Option<String>,
    /// What the teacher earns per hour.
    pub hourly_rate: Decimal,
    /// What the student is charged per hour. Zero marks a free task.
    pub price: Decimal,
}

/// API request to change a task's current rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskRatesRequest {
    pub task_id: i64,
    pub hourly_rate: Decimal,
    pub price: Decimal,
}

/// API request to add a service template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

/// API request to create a teacher or student account with its profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterAccountRequest {
    pub username: String,
    pub display_name: String,
    /// Subjects for a teacher, phone number for a student.
    pub detail: Option<String>,
}

// ============================================================================
// Identity and verification
// ============================================================================

/// API response describing the acting account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub capabilities: RoleCapabilities,
}

/// One finding, rendered for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingInfo {
    pub severity: Severity,
    pub message: String,
}

/// The result of one verification check, rendered for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub check: String,
    pub examined: usize,
    pub errors: usize,
    pub warnings: usize,
    pub findings: Vec<FindingInfo>,
}

impl From<&VerificationReport> for CheckSummary {
    fn from(report: &VerificationReport) -> Self {
        Self {
            check: report.check.to_string(),
            examined: report.examined,
            errors: report.error_count(),
            warnings: report.warning_count(),
            findings: report
                .findings
                .iter()
                .map(|finding| FindingInfo {
                    severity: finding.severity(),
                    message: finding.to_string(),
                })
                .collect(),
        }
    }
}

/// API response for a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub checks: Vec<CheckSummary>,
    /// True when no check produced an error finding.
    pub passed: bool,
}

impl VerificationResponse {
    #[must_use]
    pub fn from_reports(reports: &[VerificationReport]) -> Self {
        Self {
            checks: reports.iter().map(CheckSummary::from).collect(),
            passed: reports.iter().all(VerificationReport::is_clean),
        }
    }
}

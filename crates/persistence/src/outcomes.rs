// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Results returned by composite persistence operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tutor_ledger_domain::{Bill, BillItem, SalaryReport, WorkSession};

/// A session after it was saved, with the bill line it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedSession {
    pub session: WorkSession,
    /// The line billing this session, when it is billable.
    pub bill_item: Option<BillItem>,
}

/// A bill line after a change, with the re-summed bill total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargedLine {
    pub item: BillItem,
    pub bill_total: Decimal,
}

/// A salary report together with the sessions it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryReportDetail {
    pub report: SalaryReport,
    pub sessions: Vec<WorkSession>,
}

/// Per-teacher result of a bulk monthly salary run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReportRunOutcome {
    Created {
        teacher_id: i64,
        report: SalaryReport,
    },
    /// A live report for the month already existed.
    Skipped { teacher_id: i64 },
}

impl ReportRunOutcome {
    #[must_use]
    pub const fn teacher_id(&self) -> i64 {
        match self {
            Self::Created { teacher_id, .. } | Self::Skipped { teacher_id } => *teacher_id,
        }
    }

    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

/// Per-student result of opening the bills of a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BillOpening {
    Created { bill: Bill },
    Existing { bill: Bill },
}

impl BillOpening {
    #[must_use]
    pub const fn bill(&self) -> &Bill {
        match self {
            Self::Created { bill } | Self::Existing { bill } => bill,
        }
    }
}

/// A bill with its lines and the student's sessions of that month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillStatement {
    pub bill: Bill,
    pub items: Vec<BillItem>,
    pub sessions: Vec<WorkSession>,
    /// Sum of stored hours over `sessions`.
    pub total_hours: Decimal,
    /// Sum of customer amounts over `sessions`.
    pub session_amount_total: Decimal,
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A frozen snapshot of one teacher's pay for a month.
///
/// Totals are written once at creation and never recomputed. Several
/// reports may exist for the same teacher and month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryReport {
    pub salary_report_id: i64,
    pub teacher_id: i64,
    /// Inclusive start of the covered interval.
    pub start_date: DateTime<Utc>,
    /// Exclusive end of the covered interval.
    pub end_date: DateTime<Utc>,
    pub total_hours: Decimal,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    /// The user who requested the report, if still known.
    pub created_by: Option<i64>,
    pub notes: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SalaryReport {
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether `instant` falls in `[start_date, end_date)`.
    #[must_use]
    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        self.start_date <= instant && instant < self.end_date
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tracing::warn;
use tutor_ledger_domain::{SalaryReport, WorkSession};

use super::{CheckKind, Finding, VerificationReport};
use crate::error::CoreError;
use crate::salary::SalaryTotals;

/// Recomputes each live salary report from its teacher's sessions.
///
/// Deleted reports are skipped. A report whose interval is empty is
/// reported with zero expected totals; one whose sessions cannot be summed
/// is reported as uncomputable.
#[must_use]
pub fn check_salary_reports(
    reports: &[SalaryReport],
    sessions: &[WorkSession],
) -> VerificationReport {
    let mut report: VerificationReport = VerificationReport::new(CheckKind::Salary);

    for salary_report in reports.iter().filter(|r| !r.is_deleted()) {
        report.examined += 1;

        let expected: SalaryTotals = match SalaryTotals::for_interval(
            sessions,
            salary_report.teacher_id,
            salary_report.start_date,
            salary_report.end_date,
        ) {
            Ok(totals) => totals,
            Err(CoreError::EmptyInterval { .. }) => SalaryTotals::default(),
            Err(error) => {
                report.push(Finding::UncomputableSalaryReport {
                    salary_report_id: salary_report.salary_report_id,
                    teacher_id: salary_report.teacher_id,
                    error,
                });
                continue;
            }
        };

        if expected.total_hours != salary_report.total_hours
            || expected.total_amount != salary_report.total_amount
        {
            warn!(
                salary_report_id = salary_report.salary_report_id,
                "Salary report totals drifted"
            );
            report.push(Finding::SalaryReportDrift {
                salary_report_id: salary_report.salary_report_id,
                teacher_id: salary_report.teacher_id,
                stored_hours: salary_report.total_hours,
                expected_hours: expected.total_hours,
                stored_amount: salary_report.total_amount,
                expected_amount: expected.total_amount,
            });
        }
    }

    report
}

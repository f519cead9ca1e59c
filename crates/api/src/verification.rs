// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Runs the reconciliation checks against the stored ledger.
//!
//! Data is loaded without locks; a check may see a slightly stale view of
//! rows written while it runs. Only the tables a requested check reads are
//! loaded. A row that cannot be decoded becomes a `CorruptRow` finding in
//! every check that reads its table, and the remaining rows are checked.

use tracing::{debug, info, warn};
use tutor_ledger::{
    CheckKind, Finding, IntegrityFacts, VerificationReport, check_bills, check_integrity,
    check_overlaps, check_roles, check_salary_reports, check_work_sessions,
};
use tutor_ledger_domain::{Bill, BillItem, SalaryReport, WorkSession};
use tutor_ledger_persistence::{Scanned, SqlitePersistence, UnreadableRow};

use crate::auth::{AuthenticatedActor, AuthorizationService, Operation};
use crate::error::ApiError;
use crate::request_response::VerificationResponse;

/// Runs the given checks in order and returns one report per check.
///
/// Duplicate kinds are run once. This entry point performs no
/// authorization; it is meant for operator tooling with direct database
/// access.
///
/// # Errors
///
/// Returns an error if the data a check needs cannot be loaded.
pub fn run_checks(
    persistence: &mut SqlitePersistence,
    checks: &[CheckKind],
) -> Result<Vec<VerificationReport>, ApiError> {
    let mut sessions: Option<Scanned<WorkSession>> = None;
    let mut reports: Vec<VerificationReport> = Vec::with_capacity(checks.len());
    let mut seen: Vec<CheckKind> = Vec::with_capacity(checks.len());

    for &check in checks {
        if seen.contains(&check) {
            continue;
        }
        seen.push(check);

        let report: VerificationReport = match check {
            CheckKind::Integrity => {
                let facts: IntegrityFacts = persistence.gather_integrity_facts()?;
                check_integrity(&facts)
            }
            CheckKind::Roles => check_roles(
                &persistence.list_users()?,
                &persistence.list_teachers()?,
                &persistence.list_students()?,
                &persistence.list_inspectors()?,
            ),
            CheckKind::Sessions => {
                let scanned = cached_sessions(persistence, &mut sessions)?;
                let mut report = check_work_sessions(&scanned.records);
                report_unreadable(&mut report, &scanned.unreadable);
                report
            }
            CheckKind::Overlap => {
                let scanned = cached_sessions(persistence, &mut sessions)?;
                let mut report = check_overlaps(&scanned.records);
                report_unreadable(&mut report, &scanned.unreadable);
                report
            }
            CheckKind::Salary => {
                let salary_reports: Scanned<SalaryReport> = persistence.scan_salary_reports()?;
                let scanned = cached_sessions(persistence, &mut sessions)?;
                let mut report = check_salary_reports(&salary_reports.records, &scanned.records);
                report_unreadable(&mut report, &salary_reports.unreadable);
                report_unreadable(&mut report, &scanned.unreadable);
                report
            }
            CheckKind::Billing => {
                let bills: Scanned<Bill> = persistence.scan_bills()?;
                let items: Scanned<BillItem> = persistence.scan_bill_items()?;
                let mut report =
                    check_bills(&bills.records, &items.records, &persistence.list_students()?);
                report_unreadable(&mut report, &bills.unreadable);
                report_unreadable(&mut report, &items.unreadable);
                report
            }
        };

        for finding in &report.findings {
            debug!(check = %check, "{finding}");
        }
        if report.is_clean() {
            info!(
                check = %check,
                examined = report.examined,
                warnings = report.warning_count(),
                "Check passed"
            );
        } else {
            warn!(
                check = %check,
                examined = report.examined,
                errors = report.error_count(),
                warnings = report.warning_count(),
                "Check found inconsistencies"
            );
        }
        reports.push(report);
    }

    Ok(reports)
}

fn cached_sessions<'a>(
    persistence: &mut SqlitePersistence,
    cache: &'a mut Option<Scanned<WorkSession>>,
) -> Result<&'a Scanned<WorkSession>, ApiError> {
    let scanned: Scanned<WorkSession> = match cache.take() {
        Some(scanned) => scanned,
        None => persistence.scan_work_sessions()?,
    };
    let cached: &Scanned<WorkSession> = cache.insert(scanned);
    Ok(cached)
}

fn report_unreadable(report: &mut VerificationReport, rows: &[UnreadableRow]) {
    for row in rows {
        report.examined += 1;
        report.push(Finding::CorruptRow {
            table: row.table,
            row_id: row.row_id,
            error: row.error.clone(),
        });
    }
}

/// Runs the given checks on behalf of an actor.
///
/// # Errors
///
/// Returns an error if the actor may not run verification or the data
/// cannot be loaded.
pub fn run_verification(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    checks: &[CheckKind],
) -> Result<VerificationResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::RunVerification)?;
    let reports: Vec<VerificationReport> = run_checks(persistence, checks)?;
    Ok(VerificationResponse::from_reports(&reports))
}

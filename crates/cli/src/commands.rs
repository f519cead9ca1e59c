// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::path::Path;

use chrono::{DateTime, Utc};
use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use serde::Serialize;
use tracing::info;
use tutor_ledger::VerificationReport;
use tutor_ledger_api::{
    AuthenticatedActor, AuthenticationService, BulkSalaryReportsRequest, CloseWorkSessionRequest,
    CreateSalaryReportRequest,
};
use tutor_ledger_domain::{Tz, parse_time_zone};
use tutor_ledger_persistence::SqlitePersistence;

use crate::{Args, BillCommand, Command, ReportCommand, SessionCommand};

/// Runs the parsed command and returns the process exit status.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, the actor cannot be
/// resolved, or the command itself fails.
pub fn run(args: &Args) -> Result<u8> {
    let tz: Tz = parse_time_zone(&args.timezone)?;
    let path = args
        .database
        .as_ref()
        .ok_or_else(|| eyre!("No database given; pass --database or set TUTOR_LEDGER_DATABASE"))?;
    let creates_database: bool = matches!(args.command, Command::Migrate);
    let mut persistence: SqlitePersistence = open_database(path, creates_database)?;
    let now: DateTime<Utc> = Utc::now();

    match &args.command {
        Command::Verify { target } => {
            let reports: Vec<VerificationReport> =
                tutor_ledger_api::run_checks(&mut persistence, &target.checks())?;
            print_findings(&reports);
            Ok(verification_status(&reports))
        }
        Command::Migrate => {
            info!(database = %path.display(), "Database schema is up to date");
            Ok(0)
        }
        Command::Report(command) => {
            let actor = resolve_actor(&mut persistence, args)?;
            run_report(&mut persistence, &actor, command, tz, now)?;
            Ok(0)
        }
        Command::Bill(command) => {
            let actor = resolve_actor(&mut persistence, args)?;
            run_bill(&mut persistence, &actor, command, tz, now)?;
            Ok(0)
        }
        Command::Session(SessionCommand::Close {
            work_session_id,
            clock_out,
        }) => {
            let actor = resolve_actor(&mut persistence, args)?;
            let request = CloseWorkSessionRequest {
                work_session_id: *work_session_id,
                clock_out: clock_out.unwrap_or(now),
            };
            let response =
                tutor_ledger_api::close_work_session(&mut persistence, &actor, request, tz, now)?;
            print_json(&response)?;
            Ok(0)
        }
    }
}

/// Opens the ledger database, migrating it forward.
///
/// Only `migrate` may create a database file; every other command refuses
/// a path that does not exist yet.
///
/// # Errors
///
/// Returns an error if the file is missing and `create` is false, or if the
/// database cannot be opened or migrated.
pub fn open_database(path: &Path, create: bool) -> Result<SqlitePersistence> {
    if !create && !path.exists() {
        return Err(eyre!(
            "Database {} does not exist; run `tutor-ledger migrate` to create it",
            path.display()
        ));
    }
    SqlitePersistence::new_with_file(path)
        .wrap_err_with(|| format!("Failed to open database {}", path.display()))
}

fn resolve_actor(persistence: &mut SqlitePersistence, args: &Args) -> Result<AuthenticatedActor> {
    let username: &str = args
        .actor
        .as_deref()
        .ok_or_else(|| eyre!("This command requires --actor or TUTOR_LEDGER_ACTOR"))?;
    Ok(AuthenticationService::resolve_actor(persistence, username)?)
}

fn run_report(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    command: &ReportCommand,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        ReportCommand::Create {
            teacher,
            month,
            notes,
        } => {
            let request = CreateSalaryReportRequest {
                teacher_id: *teacher,
                year: month.year(),
                month: month.month(),
                notes: notes.clone(),
            };
            let response =
                tutor_ledger_api::create_salary_report(persistence, actor, request, tz, now)?;
            print_json(&response)
        }
        ReportCommand::Bulk { month } => {
            let request = BulkSalaryReportsRequest {
                year: month.year(),
                month: month.month(),
            };
            let response =
                tutor_ledger_api::bulk_create_salary_reports(persistence, actor, request, tz, now)?;
            print_json(&response)
        }
        ReportCommand::Show { salary_report_id } => {
            let detail = tutor_ledger_api::get_salary_report(persistence, actor, *salary_report_id)?;
            print_json(&detail)
        }
    }
}

fn run_bill(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    command: &BillCommand,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<()> {
    match command {
        BillCommand::OpenMonth { month } => {
            let response = tutor_ledger_api::open_bills_for_month(
                persistence,
                actor,
                month.year(),
                month.month(),
                now,
            )?;
            print_json(&response)
        }
        BillCommand::Show { bill_id } => {
            let statement = tutor_ledger_api::get_bill_statement(persistence, actor, *bill_id, tz)?;
            print_json(&statement)
        }
        BillCommand::Balance { student_id } => {
            let balance = tutor_ledger_api::student_balance(persistence, actor, *student_id)?;
            print_json(&balance)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered: String =
        serde_json::to_string_pretty(value).wrap_err("Failed to render output as JSON")?;
    println!("{rendered}");
    Ok(())
}

/// One line per finding, then one summary line per check.
fn print_findings(reports: &[VerificationReport]) {
    for report in reports {
        for finding in &report.findings {
            println!("{}: {finding}", report.check);
        }
    }
    for report in reports {
        println!(
            "{}: examined {}, {} error(s), {} warning(s)",
            report.check,
            report.examined,
            report.error_count(),
            report.warning_count()
        );
    }
}

/// `0` when every check is clean, `1` otherwise.
#[must_use]
pub fn verification_status(reports: &[VerificationReport]) -> u8 {
    if reports.iter().all(VerificationReport::is_clean) {
        0
    } else {
        1
    }
}

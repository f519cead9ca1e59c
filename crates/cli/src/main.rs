// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! `tutor-ledger`: back-office command line for the tutoring ledger.
//!
//! Diagnostics and JSON go to stdout; logs go to stderr.
//!
//! ## Exit status
//!
//! - `0`: the command succeeded; for `verify`, no check found an error
//! - `1`: `verify` found at least one error finding
//! - `2`: the command could not run

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use color_eyre::Result;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;
use tracing_subscriber::EnvFilter;
use tutor_ledger::CheckKind;
use tutor_ledger_domain::BillingMonth;

/// Exit status when the command could not run.
pub const EXIT_UNAVAILABLE: u8 = 2;

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let args = Args::parse();

    let filter: EnvFilter = EnvFilter::builder()
        .with_default_directive(args.log_level().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    match commands::run(&args) {
        Ok(status) => Ok(ExitCode::from(status)),
        Err(err) => {
            tracing::error!("{err:#}");
            Ok(ExitCode::from(EXIT_UNAVAILABLE))
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tutor-ledger", author, version, about, long_about = None)]
pub struct Args {
    /// Path to the `SQLite` database file.
    #[arg(long, env = "TUTOR_LEDGER_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// IANA time zone that month boundaries are computed in.
    #[arg(long, env = "TUTOR_LEDGER_TIMEZONE", default_value = "UTC", global = true)]
    pub timezone: String,

    /// Username the command acts as. Required for everything but
    /// `verify` and `migrate`.
    #[arg(long, env = "TUTOR_LEDGER_ACTOR", global = true)]
    pub actor: Option<String>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Reconcile stored totals against their sources
    #[command(visible_alias = "v")]
    Verify {
        #[arg(value_enum, default_value_t = VerifyTarget::All)]
        target: VerifyTarget,
    },

    /// Apply pending schema migrations
    Migrate,

    /// Salary reports
    #[command(subcommand)]
    Report(ReportCommand),

    /// Monthly bills
    #[command(subcommand)]
    Bill(BillCommand),

    /// Work sessions
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VerifyTarget {
    All,
    Salary,
    Billing,
    Sessions,
    Overlap,
    Integrity,
    Roles,
}

impl VerifyTarget {
    #[must_use]
    pub fn checks(self) -> Vec<CheckKind> {
        match self {
            Self::All => CheckKind::ALL.to_vec(),
            Self::Salary => vec![CheckKind::Salary],
            Self::Billing => vec![CheckKind::Billing],
            Self::Sessions => vec![CheckKind::Sessions],
            Self::Overlap => vec![CheckKind::Overlap],
            Self::Integrity => vec![CheckKind::Integrity],
            Self::Roles => vec![CheckKind::Roles],
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum ReportCommand {
    /// Create a frozen salary report for one teacher
    Create {
        #[arg(long)]
        teacher: i64,
        /// Month as YYYY-MM
        #[arg(long)]
        month: BillingMonth,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Create the month's report for every teacher without one
    Bulk {
        /// Month as YYYY-MM
        #[arg(long)]
        month: BillingMonth,
    },
    /// Print a report and the sessions it covers as JSON
    Show { salary_report_id: i64 },
}

#[derive(Debug, Clone, Subcommand)]
pub enum BillCommand {
    /// Find or create the month's bill for every active student
    OpenMonth {
        /// Month as YYYY-MM
        #[arg(long)]
        month: BillingMonth,
    },
    /// Print a bill statement as JSON
    Show { bill_id: i64 },
    /// Print a student's outstanding balance as JSON
    Balance { student_id: i64 },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SessionCommand {
    /// Close an open clock session
    Close {
        work_session_id: i64,
        /// RFC 3339 instant; defaults to now
        #[arg(long)]
        clock_out: Option<DateTime<Utc>>,
    },
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

//! Aggregation and reconciliation over tutoring ledger records.
//!
//! Everything here is pure: callers load records, these functions sum
//! and compare them, and callers persist whatever comes back.

mod billing;
mod error;
pub mod reconciliation;
mod salary;

#[cfg(test)]
mod tests;

pub use billing::{billable_total, outstanding_balance};
pub use error::CoreError;
pub use reconciliation::{
    AmountField, CheckKind, DanglingReference, Finding, IntegrityFacts, ProfileKind, Severity,
    VerificationReport, check_bills, check_integrity, check_overlaps, check_roles,
    check_salary_reports, check_work_sessions,
};
pub use salary::{
    SalaryBreakdown, SalaryLine, SalaryTotals, TaskSummary, salary_breakdown, session_in_interval,
};

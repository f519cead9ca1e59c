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

mod bill;
mod calculator;
mod error;
mod period;
mod salary_report;
mod templates;
mod types;
mod work_session;

#[cfg(test)]
mod tests;

pub use bill::{Bill, BillItem, BillLine};
pub use calculator::{
    SessionAmounts, WorkEntry, compute_amounts, compute_stored_hours, customer_amount,
    priced_amount, round_money, whole_hours_between, worker_amount,
};
pub use error::DomainError;
pub use period::{BillingMonth, parse_time_zone};
pub use salary_report::SalaryReport;
pub use templates::{RateSnapshot, ServicePriceSnapshot, ServiceTemplate, TaskTemplate};
pub use types::{
    EntryType, InspectorProfile, StudentProfile, TeacherProfile, UserAccount,
};
pub use work_session::{NewWorkSession, StoredWorkSession, WorkSession};

// Re-exported so downstream crates name the same zone type.
pub use chrono_tz::Tz;

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only reconciliation of stored aggregates against their facts.
//!
//! Every check walks its whole input and collects every finding; none
//! stops at the first problem. Checks never modify records.
//!
//! ## Severity
//!
//! - `Error` findings mean stored data disagrees with a recomputation
//!   or breaks a structural rule. Any error fails the verification run.
//! - `Warning` findings are reported but do not fail the run.

mod billing;
mod findings;
mod integrity;
mod roles;
mod salary;
mod sessions;

pub use billing::check_bills;
pub use findings::{AmountField, DanglingReference, Finding, ProfileKind};
pub use integrity::{IntegrityFacts, check_integrity};
pub use roles::check_roles;
pub use salary::check_salary_reports;
pub use sessions::{check_overlaps, check_work_sessions};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// The verification jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Salary,
    Billing,
    Sessions,
    Overlap,
    Integrity,
    Roles,
}

impl CheckKind {
    /// Every check, in the order a full run executes them.
    pub const ALL: [Self; 6] = [
        Self::Integrity,
        Self::Roles,
        Self::Sessions,
        Self::Overlap,
        Self::Salary,
        Self::Billing,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Billing => "billing",
            Self::Sessions => "sessions",
            Self::Overlap => "overlap",
            Self::Integrity => "integrity",
            Self::Roles => "roles",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown check: {s}"))
    }
}

/// The outcome of one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub check: CheckKind,
    /// How many records the check looked at.
    pub examined: usize,
    pub findings: Vec<Finding>,
}

impl VerificationReport {
    #[must_use]
    pub const fn new(check: CheckKind) -> Self {
        Self {
            check,
            examined: 0,
            findings: Vec::new(),
        }
    }

    /// Records a finding.
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// `true` when there are no error findings. Warnings are allowed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity() == severity)
            .count()
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{CheckKind, DanglingReference, Finding, ProfileKind, VerificationReport};

/// Structural facts gathered from storage for the integrity check.
///
/// Storage answers the questions; this module only turns the answers
/// into findings so the rules live in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityFacts {
    pub dangling_references: Vec<DanglingReference>,
    /// `(kind, user_id, count)` for every user with more than one profile
    /// of a kind.
    pub duplicate_profiles: Vec<(ProfileKind, i64, i64)>,
    /// Live sessions missing a frozen hourly rate or price.
    pub sessions_without_rate: Vec<i64>,
    /// Live sessions that are closed (or not clock sessions) yet have no
    /// stored hours.
    pub closed_sessions_without_hours: Vec<i64>,
    pub bills_without_total: Vec<i64>,
    pub rows_examined: usize,
}

/// Turns integrity facts into findings. All of them are errors.
#[must_use]
pub fn check_integrity(facts: &IntegrityFacts) -> VerificationReport {
    let mut report: VerificationReport = VerificationReport::new(CheckKind::Integrity);
    report.examined = facts.rows_examined;

    for reference in &facts.dangling_references {
        report.push(Finding::Dangling(*reference));
    }
    for &(kind, user_id, count) in &facts.duplicate_profiles {
        if count > 1 {
            report.push(Finding::DuplicateProfile {
                kind,
                user_id,
                count,
            });
        }
    }
    for &work_session_id in &facts.sessions_without_rate {
        report.push(Finding::MissingRateSnapshot { work_session_id });
    }
    for &work_session_id in &facts.closed_sessions_without_hours {
        report.push(Finding::MissingStoredHours { work_session_id });
    }
    for &bill_id in &facts.bills_without_total {
        report.push(Finding::BillWithoutTotal { bill_id });
    }

    report
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tutor_ledger_domain::{
    SessionAmounts, WorkEntry, WorkSession, compute_amounts, compute_stored_hours,
};

use super::{AmountField, CheckKind, Finding, VerificationReport};

type Window = (DateTime<Utc>, DateTime<Utc>);

/// Checks each live session against a recomputation from its own inputs
/// and frozen snapshot.
#[must_use]
pub fn check_work_sessions(sessions: &[WorkSession]) -> VerificationReport {
    let mut report: VerificationReport = VerificationReport::new(CheckKind::Sessions);

    for session in sessions.iter().filter(|s| !s.is_deleted()) {
        report.examined += 1;
        let Some(work_session_id) = session.work_session_id() else {
            continue;
        };

        let expected_hours: Option<Decimal> = match compute_stored_hours(session.entry()) {
            Ok(hours) => hours,
            Err(error) => {
                report.push(Finding::InvalidEntry {
                    work_session_id,
                    error,
                });
                continue;
            }
        };

        if let WorkEntry::Clock {
            clock_in: Some(clock_in),
            clock_out: None,
        } = *session.entry()
        {
            report.push(Finding::OpenClockSession {
                work_session_id,
                teacher_id: session.teacher_id(),
                clock_in,
            });
        }

        if session.stored_hours() != expected_hours {
            report.push(Finding::HoursMismatch {
                work_session_id,
                stored: session.stored_hours(),
                expected: expected_hours,
            });
        }

        let rates = session.rates();
        if rates.hourly_rate().is_none() || rates.price().is_none() {
            report.push(Finding::MissingRateSnapshot { work_session_id });
        }

        let expected: SessionAmounts = match compute_amounts(session.stored_hours(), rates) {
            Ok(amounts) => amounts,
            Err(error) => {
                report.push(Finding::InvalidEntry {
                    work_session_id,
                    error,
                });
                continue;
            }
        };
        let stored: SessionAmounts = session.amounts();
        if rates.price().is_some() && stored.total_amount != expected.total_amount {
            report.push(Finding::AmountMismatch {
                work_session_id,
                field: AmountField::Customer,
                stored: stored.total_amount,
                expected: expected.total_amount,
            });
        }
        if rates.hourly_rate().is_some()
            && stored.teacher_payment_amount != expected.teacher_payment_amount
        {
            report.push(Finding::AmountMismatch {
                work_session_id,
                field: AmountField::Worker,
                stored: stored.teacher_payment_amount,
                expected: expected.teacher_payment_amount,
            });
        }
    }

    report
}

/// Reports every pair of live sessions of one teacher whose implied
/// windows `[created_at, created_at + hours)` intersect.
///
/// Each pair is reported once. Sessions without positive hours have no
/// window.
#[must_use]
pub fn check_overlaps(sessions: &[WorkSession]) -> VerificationReport {
    let mut report: VerificationReport = VerificationReport::new(CheckKind::Overlap);

    let mut by_teacher: BTreeMap<i64, Vec<(i64, Window)>> = BTreeMap::new();
    for session in sessions.iter().filter(|s| !s.is_deleted()) {
        report.examined += 1;
        if let (Some(id), Some(window)) = (session.work_session_id(), session.implied_window())
            && window.1 > window.0
        {
            by_teacher
                .entry(session.teacher_id())
                .or_default()
                .push((id, window));
        }
    }

    for (teacher_id, mut windows) in by_teacher {
        windows.sort_by_key(|&(id, (start, _))| (start, id));

        for (index, &(first, first_window)) in windows.iter().enumerate() {
            for &(second, second_window) in &windows[index + 1..] {
                // Sorted by start: once a later session starts at or after
                // this one ends, no further session can overlap it.
                if second_window.0 >= first_window.1 {
                    break;
                }
                if second_window.1 > first_window.0 {
                    report.push(Finding::OverlappingSessions {
                        teacher_id,
                        first,
                        second,
                        first_window,
                        second_window,
                    });
                }
            }
        }
    }

    report
}

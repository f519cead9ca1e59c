// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Monthly salary aggregation.
//!
//! Aggregates only ever read the frozen hours and hourly rate of each
//! session. Task templates are consulted for display names, never for
//! amounts.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use tutor_ledger_domain::{DomainError, EntryType, Tz, WorkSession, round_money, worker_amount};

use crate::error::CoreError;

/// Summed hours and pay over a set of sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SalaryTotals {
    pub total_hours: Decimal,
    pub total_amount: Decimal,
    pub session_count: usize,
}

impl SalaryTotals {
    /// Adds one session: hours count as zero when unset, pay only when
    /// both hours and rate are present.
    fn add(&mut self, session: &WorkSession) -> Result<(), DomainError> {
        let hours: Decimal = session.stored_hours().unwrap_or(Decimal::ZERO);
        self.total_hours = checked_total(self.total_hours, hours, "salary hours")?;
        if let (Some(hours), Some(rate)) =
            (session.stored_hours(), session.rates().hourly_rate())
        {
            let amount: Decimal = worker_amount(hours, rate)?;
            self.total_amount = checked_total(self.total_amount, amount, "salary amount")?;
        }
        self.session_count += 1;
        Ok(())
    }

    /// Totals for one teacher over `[start, end)`, skipping deleted sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the interval is empty or a total overflows.
    pub fn for_interval<'a, I>(
        sessions: I,
        teacher_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = &'a WorkSession>,
    {
        if end <= start {
            return Err(CoreError::EmptyInterval { start, end });
        }

        let mut totals: Self = Self::default();
        for session in sessions {
            if session_in_interval(session, teacher_id, start, end) {
                totals.add(session)?;
            }
        }

        debug!(
            teacher_id,
            total_hours = %totals.total_hours,
            total_amount = %totals.total_amount,
            sessions = totals.session_count,
            "Aggregated salary totals"
        );
        Ok(totals)
    }
}

fn checked_total(total: Decimal, value: Decimal, operation: &str) -> Result<Decimal, DomainError> {
    total
        .checked_add(value)
        .ok_or_else(|| DomainError::AmountOverflow {
            operation: operation.to_string(),
        })
}

/// Whether a session counts toward a teacher's interval.
#[must_use]
pub fn session_in_interval(
    session: &WorkSession,
    teacher_id: i64,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    !session.is_deleted()
        && session.teacher_id() == teacher_id
        && start <= session.created_at()
        && session.created_at() < end
}

/// One session as it appears on a salary breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryLine {
    pub work_session_id: Option<i64>,
    /// The local calendar date the session was logged on.
    pub date: NaiveDate,
    pub task_id: i64,
    pub task_name: String,
    pub entry_type: EntryType,
    /// Hours rounded to two decimal places.
    pub hours: Decimal,
    pub hourly_rate: Decimal,
    pub amount: Decimal,
}

/// Hours and pay grouped by task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub task_id: i64,
    pub task_name: String,
    pub hours: Decimal,
    pub amount: Decimal,
    pub session_count: usize,
}

/// A live, itemized view of a teacher's pay for an interval.
///
/// Unlike a salary report this is not frozen; it is recomputed on demand
/// from the frozen session values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub teacher_id: i64,
    pub lines: Vec<SalaryLine>,
    pub task_summaries: Vec<TaskSummary>,
    pub total_hours: Decimal,
    pub total_amount: Decimal,
}

/// Builds an itemized breakdown for one teacher over `[start, end)`.
///
/// Sessions without hours or rate contribute zero. Lines are ordered by
/// creation instant.
///
/// # Arguments
///
/// * `sessions` - Candidate sessions; others' and deleted ones are skipped
/// * `task_names` - Display names keyed by task id
/// * `tz` - Zone used to label each line with a local date
///
/// # Errors
///
/// Returns an error if the interval is empty or an amount overflows.
pub fn salary_breakdown<'a, I>(
    sessions: I,
    teacher_id: i64,
    (start, end): (DateTime<Utc>, DateTime<Utc>),
    task_names: &BTreeMap<i64, String>,
    tz: Tz,
) -> Result<SalaryBreakdown, CoreError>
where
    I: IntoIterator<Item = &'a WorkSession>,
{
    if end <= start {
        return Err(CoreError::EmptyInterval { start, end });
    }

    let mut selected: Vec<&WorkSession> = sessions
        .into_iter()
        .filter(|s| session_in_interval(s, teacher_id, start, end))
        .collect();
    selected.sort_by_key(|s| (s.created_at(), s.work_session_id()));

    let mut lines: Vec<SalaryLine> = Vec::with_capacity(selected.len());
    let mut summaries: BTreeMap<i64, TaskSummary> = BTreeMap::new();
    let mut total_hours: Decimal = Decimal::ZERO;
    let mut total_amount: Decimal = Decimal::ZERO;

    for session in selected {
        let hours: Decimal = session.stored_hours().unwrap_or(Decimal::ZERO);
        let rate: Decimal = session.rates().hourly_rate().unwrap_or(Decimal::ZERO);
        let amount: Decimal = worker_amount(hours, rate)?;
        let task_name: String = task_names
            .get(&session.task_id())
            .cloned()
            .unwrap_or_else(|| format!("Task {}", session.task_id()));

        total_hours = checked_total(total_hours, hours, "salary hours")?;
        total_amount = checked_total(total_amount, amount, "salary amount")?;

        let summary: &mut TaskSummary =
            summaries
                .entry(session.task_id())
                .or_insert_with(|| TaskSummary {
                    task_id: session.task_id(),
                    task_name: task_name.clone(),
                    hours: Decimal::ZERO,
                    amount: Decimal::ZERO,
                    session_count: 0,
                });
        summary.hours = checked_total(summary.hours, hours, "task hours")?;
        summary.amount = checked_total(summary.amount, amount, "task amount")?;
        summary.session_count += 1;

        lines.push(SalaryLine {
            work_session_id: session.work_session_id(),
            date: session.created_at().with_timezone(&tz).date_naive(),
            task_id: session.task_id(),
            task_name,
            entry_type: session.entry_type(),
            hours: round_money(hours),
            hourly_rate: rate,
            amount,
        });
    }

    Ok(SalaryBreakdown {
        teacher_id,
        lines,
        task_summaries: summaries.into_values().collect(),
        total_hours,
        total_amount,
    })
}

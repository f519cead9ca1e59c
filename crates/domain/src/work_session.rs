// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The work session entity.
//!
//! ## Invariants
//!
//! - The rate snapshot is captured once, in `WorkSession::log`
//! - Once hours are set, amounts always equal the calculator applied to
//!   the frozen hours and snapshot
//! - A clock session starts open and is closed at most once
//! - After soft deletion nothing else changes

use chrono::{DateTime, Duration, Utc};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{SessionAmounts, WorkEntry, compute_amounts, compute_stored_hours};
use crate::error::DomainError;
use crate::templates::{RateSnapshot, TaskTemplate};
use crate::types::EntryType;

/// Caller-supplied inputs for logging work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkSession {
    pub teacher_id: i64,
    pub student_id: Option<i64>,
    pub entry: WorkEntry,
    /// Back-dates the session. Defaults to the logging instant.
    pub created_at: Option<DateTime<Utc>>,
}

/// Every stored column of a work session, without validation.
///
/// Used to rehydrate rows, including inconsistent ones that verification
/// must be able to inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredWorkSession {
    pub work_session_id: i64,
    pub teacher_id: i64,
    pub task_id: i64,
    pub student_id: Option<i64>,
    pub entry: WorkEntry,
    pub rates: RateSnapshot,
    pub stored_hours: Option<Decimal>,
    pub amounts: SessionAmounts,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A unit of teacher work with frozen rates, hours and amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSession {
    work_session_id: Option<i64>,
    teacher_id: i64,
    task_id: i64,
    student_id: Option<i64>,
    entry: WorkEntry,
    rates: RateSnapshot,
    stored_hours: Option<Decimal>,
    amounts: SessionAmounts,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl WorkSession {
    /// Creates a new session, capturing the task's current rates.
    ///
    /// # Arguments
    ///
    /// * `draft` - The submitted inputs
    /// * `task` - The task template, read only here
    /// * `now` - The logging instant, used when the draft is not back-dated
    ///
    /// # Errors
    ///
    /// Returns an error if the entry inputs are invalid for their type or
    /// an amount does not fit a `Decimal`.
    pub fn log(
        draft: NewWorkSession,
        task: &TaskTemplate,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let stored_hours: Option<Decimal> = compute_stored_hours(&draft.entry)?;
        let rates: RateSnapshot = task.capture();
        let amounts: SessionAmounts = compute_amounts(stored_hours, &rates)?;

        Ok(Self {
            work_session_id: None,
            teacher_id: draft.teacher_id,
            task_id: task.task_id,
            student_id: draft.student_id,
            entry: draft.entry,
            rates,
            stored_hours,
            amounts,
            created_at: draft.created_at.unwrap_or(now),
            deleted_at: None,
        })
    }

    /// Rehydrates a session exactly as stored.
    #[must_use]
    pub const fn restore(stored: StoredWorkSession) -> Self {
        Self {
            work_session_id: Some(stored.work_session_id),
            teacher_id: stored.teacher_id,
            task_id: stored.task_id,
            student_id: stored.student_id,
            entry: stored.entry,
            rates: stored.rates,
            stored_hours: stored.stored_hours,
            amounts: stored.amounts,
            created_at: stored.created_at,
            deleted_at: stored.deleted_at,
        }
    }

    /// Assigns the identifier given by the database.
    #[must_use]
    pub const fn with_id(mut self, work_session_id: i64) -> Self {
        self.work_session_id = Some(work_session_id);
        self
    }

    /// Closes an open clock session and freezes its hours and amounts.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The session is not a clock session
    /// - The session is already closed or deleted
    /// - `clock_out` is not after the clock-in instant
    pub fn close(&mut self, clock_out: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_not_deleted()?;
        let WorkEntry::Clock {
            clock_in,
            clock_out: None,
        } = self.entry
        else {
            if self.entry.entry_type() == EntryType::Clock {
                return Err(DomainError::SessionAlreadyClosed {
                    work_session_id: self.work_session_id,
                });
            }
            return Err(DomainError::NotClockSession {
                entry_type: self.entry.entry_type(),
            });
        };

        let closed: WorkEntry = WorkEntry::Clock {
            clock_in,
            clock_out: Some(clock_out),
        };
        let stored_hours: Option<Decimal> = compute_stored_hours(&closed)?;
        let amounts: SessionAmounts = compute_amounts(stored_hours, &self.rates)?;

        self.entry = closed;
        self.stored_hours = stored_hours;
        self.amounts = amounts;
        Ok(())
    }

    /// Recomputes hours and amounts from the inputs and frozen snapshot.
    ///
    /// Calling this on a consistent session changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored inputs are invalid for their type.
    pub fn recompute(&mut self) -> Result<(), DomainError> {
        let stored_hours: Option<Decimal> = compute_stored_hours(&self.entry)?;
        let amounts: SessionAmounts = compute_amounts(stored_hours, &self.rates)?;
        self.stored_hours = stored_hours;
        self.amounts = amounts;
        Ok(())
    }

    /// Soft-deletes the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is already deleted.
    pub fn soft_delete(&mut self, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.ensure_not_deleted()?;
        self.deleted_at = Some(at);
        Ok(())
    }

    /// The interval `[created_at, created_at + hours)` the session is
    /// assumed to occupy. `None` until hours are known, or when the hours
    /// reach past the representable calendar.
    #[must_use]
    pub fn implied_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let hours: Decimal = self.stored_hours?;
        let millis: i64 = hours
            .checked_mul(Decimal::from(3_600_000))?
            .trunc()
            .to_i64()?;
        let end: DateTime<Utc> = self
            .created_at
            .checked_add_signed(Duration::try_milliseconds(millis)?)?;
        Some((self.created_at, end))
    }

    const fn ensure_not_deleted(&self) -> Result<(), DomainError> {
        if self.deleted_at.is_some() {
            return Err(DomainError::SessionDeleted {
                work_session_id: self.work_session_id,
            });
        }
        Ok(())
    }

    #[must_use]
    pub const fn work_session_id(&self) -> Option<i64> {
        self.work_session_id
    }

    #[must_use]
    pub const fn teacher_id(&self) -> i64 {
        self.teacher_id
    }

    #[must_use]
    pub const fn task_id(&self) -> i64 {
        self.task_id
    }

    #[must_use]
    pub const fn student_id(&self) -> Option<i64> {
        self.student_id
    }

    #[must_use]
    pub const fn entry(&self) -> &WorkEntry {
        &self.entry
    }

    #[must_use]
    pub const fn entry_type(&self) -> EntryType {
        self.entry.entry_type()
    }

    #[must_use]
    pub const fn rates(&self) -> &RateSnapshot {
        &self.rates
    }

    #[must_use]
    pub const fn stored_hours(&self) -> Option<Decimal> {
        self.stored_hours
    }

    #[must_use]
    pub const fn amounts(&self) -> SessionAmounts {
        self.amounts
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// An open clock session has no clock-out yet.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(
            self.entry,
            WorkEntry::Clock {
                clock_in: Some(_),
                clock_out: None
            }
        )
    }
}

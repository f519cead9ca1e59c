// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Hour and amount calculation for work sessions.
//!
//! All functions here are pure. They never read a template; rates come
//! from a `RateSnapshot` that was frozen when the session was logged.
//!
//! ## Rounding
//!
//! - Clock and time-range durations are rounded half-up to whole hours
//! - Manual hours are kept exactly as entered
//! - Money is rounded half-up to cents when it is frozen

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::templates::RateSnapshot;
use crate::types::EntryType;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// The raw inputs of a work session, by entry type.
///
/// Fields are optional so that incomplete submissions (and incomplete
/// stored rows) can be represented and rejected or reported explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entry_type", rename_all = "snake_case")]
pub enum WorkEntry {
    Manual {
        hours: Option<Decimal>,
    },
    Clock {
        clock_in: Option<DateTime<Utc>>,
        clock_out: Option<DateTime<Utc>>,
    },
    TimeRange {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
}

impl WorkEntry {
    /// A manual entry with the given hours.
    #[must_use]
    pub const fn manual(hours: Decimal) -> Self {
        Self::Manual { hours: Some(hours) }
    }

    /// An open clock entry.
    #[must_use]
    pub const fn clock_in(at: DateTime<Utc>) -> Self {
        Self::Clock {
            clock_in: Some(at),
            clock_out: None,
        }
    }

    /// A complete time-range entry.
    #[must_use]
    pub const fn time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::TimeRange {
            start: Some(start),
            end: Some(end),
        }
    }

    #[must_use]
    pub const fn entry_type(&self) -> EntryType {
        match self {
            Self::Manual { .. } => EntryType::Manual,
            Self::Clock { .. } => EntryType::Clock,
            Self::TimeRange { .. } => EntryType::TimeRange,
        }
    }
}

/// Frozen customer and worker amounts of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionAmounts {
    /// What the student is charged.
    pub total_amount: Option<Decimal>,
    /// What the teacher is paid.
    pub teacher_payment_amount: Option<Decimal>,
}

/// Rounds a money value half-up to cents.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the whole hours between two instants, rounding half-up.
///
/// # Errors
///
/// Returns an error if `end` is not strictly after `start`.
pub fn whole_hours_between(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Decimal, DomainError> {
    if end <= start {
        return Err(DomainError::EndNotAfterStart { start, end });
    }
    let millis: i64 = (end - start).num_milliseconds();
    let hours: Decimal = Decimal::from(millis) / Decimal::from(MILLIS_PER_HOUR);
    Ok(hours.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// Derives the stored hours of an entry.
///
/// # Returns
///
/// * `Ok(Some(hours))` for a complete entry
/// * `Ok(None)` for a clock entry that has not been closed yet
///
/// # Errors
///
/// Returns an error if:
/// - A manual entry has no hours, or negative hours
/// - A clock entry has no clock-in
/// - A time-range entry is missing a bound
/// - An interval end is not after its start
pub fn compute_stored_hours(entry: &WorkEntry) -> Result<Option<Decimal>, DomainError> {
    match *entry {
        WorkEntry::Manual { hours: None } => Err(DomainError::MissingManualHours),
        WorkEntry::Manual { hours: Some(hours) } => {
            if hours < Decimal::ZERO {
                return Err(DomainError::NegativeManualHours { hours });
            }
            Ok(Some(hours))
        }
        WorkEntry::Clock { clock_in: None, .. } => Err(DomainError::MissingClockIn),
        WorkEntry::Clock {
            clock_in: Some(_),
            clock_out: None,
        } => Ok(None),
        WorkEntry::Clock {
            clock_in: Some(start),
            clock_out: Some(end),
        }
        | WorkEntry::TimeRange {
            start: Some(start),
            end: Some(end),
        } => whole_hours_between(start, end).map(Some),
        WorkEntry::TimeRange { .. } => Err(DomainError::MissingTimeRangeBound),
    }
}

/// `quantity × unit_price`, rounded to cents.
///
/// # Errors
///
/// Returns `AmountOverflow` if the product does not fit a `Decimal`.
pub fn priced_amount(quantity: Decimal, unit_price: Decimal) -> Result<Decimal, DomainError> {
    quantity
        .checked_mul(unit_price)
        .map(round_money)
        .ok_or_else(|| DomainError::AmountOverflow {
            operation: format!("{quantity} x {unit_price}"),
        })
}

/// The amount charged to the student for `hours` at `price`.
///
/// Free tasks (price zero) always charge zero.
///
/// # Errors
///
/// Returns `AmountOverflow` if the amount does not fit a `Decimal`.
pub fn customer_amount(hours: Decimal, price: Decimal) -> Result<Decimal, DomainError> {
    if price.is_zero() {
        return Ok(Decimal::ZERO);
    }
    priced_amount(hours, price)
}

/// The amount paid to the teacher for `hours` at `hourly_rate`.
///
/// # Errors
///
/// Returns `AmountOverflow` if the amount does not fit a `Decimal`.
pub fn worker_amount(hours: Decimal, hourly_rate: Decimal) -> Result<Decimal, DomainError> {
    priced_amount(hours, hourly_rate)
}

/// Computes both amounts from frozen hours and a frozen snapshot.
///
/// Amounts exist only when hours are present and positive. Otherwise
/// both are cleared. A missing rate or price leaves that amount unset.
///
/// # Errors
///
/// Returns `AmountOverflow` if either amount does not fit a `Decimal`.
pub fn compute_amounts(
    stored_hours: Option<Decimal>,
    rates: &RateSnapshot,
) -> Result<SessionAmounts, DomainError> {
    match stored_hours {
        Some(hours) if hours > Decimal::ZERO => Ok(SessionAmounts {
            total_amount: rates
                .price()
                .map(|price| customer_amount(hours, price))
                .transpose()?,
            teacher_payment_amount: rates
                .hourly_rate()
                .map(|rate| worker_amount(hours, rate))
                .transpose()?,
        }),
        _ => Ok(SessionAmounts::default()),
    }
}

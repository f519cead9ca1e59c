// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::types::EntryType;

/// Errors that can occur during domain validation.
///
/// Every variant describes an input that cannot be turned into a frozen
/// record. A record that fails validation is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A manual entry was submitted without hours.
    MissingManualHours,
    /// A manual entry carried a negative hour count.
    NegativeManualHours {
        /// The rejected value.
        hours: Decimal,
    },
    /// A clock entry was submitted without a clock-in instant.
    MissingClockIn,
    /// A time-range entry is missing one or both bounds.
    MissingTimeRangeBound,
    /// An interval end is not strictly after its start.
    EndNotAfterStart {
        /// The interval start.
        start: DateTime<Utc>,
        /// The interval end.
        end: DateTime<Utc>,
    },
    /// The entry type string is not recognized.
    InvalidEntryType(String),
    /// Only clock sessions can be closed.
    NotClockSession {
        /// The entry type of the session.
        entry_type: EntryType,
    },
    /// The clock session already has a clock-out instant.
    SessionAlreadyClosed {
        /// The session identifier, when persisted.
        work_session_id: Option<i64>,
    },
    /// The session was soft-deleted and can no longer change.
    SessionDeleted {
        /// The session identifier, when persisted.
        work_session_id: Option<i64>,
    },
    /// Month must be within 1..=12.
    InvalidMonth(u32),
    /// A month label is not in `YYYY-MM` form.
    InvalidMonthLabel(String),
    /// Year is outside the supported calendar range.
    InvalidYear(i32),
    /// The time zone name is not a known IANA zone.
    InvalidTimeZone(String),
    /// A month boundary could not be resolved in the configured zone.
    UnresolvableMonthBoundary {
        /// The calendar year.
        year: i32,
        /// The calendar month.
        month: u32,
    },
    /// Bill item quantity must be positive.
    NonPositiveQuantity {
        /// The rejected quantity.
        quantity: Decimal,
    },
    /// Prices may not be negative.
    NegativePrice {
        /// The rejected price.
        price: Decimal,
    },
    /// A decimal value could not be parsed.
    InvalidDecimal {
        /// The field being parsed.
        field: String,
        /// The raw input.
        value: String,
    },
    /// A money amount does not fit the decimal range.
    AmountOverflow {
        /// Description of the computation that overflowed.
        operation: String,
    },
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingManualHours => write!(f, "Manual entry requires manual hours"),
            Self::NegativeManualHours { hours } => {
                write!(f, "Manual hours must not be negative, got {hours}")
            }
            Self::MissingClockIn => write!(f, "Clock entry requires a clock-in time"),
            Self::MissingTimeRangeBound => {
                write!(f, "Time range entry requires both start and end time")
            }
            Self::EndNotAfterStart { start, end } => {
                write!(f, "End time {end} must be after start time {start}")
            }
            Self::InvalidEntryType(value) => write!(f, "Invalid entry type: {value}"),
            Self::NotClockSession { entry_type } => {
                write!(f, "Only clock sessions can be closed, session is {entry_type}")
            }
            Self::SessionAlreadyClosed { work_session_id } => match work_session_id {
                Some(id) => write!(f, "Work session {id} is already closed"),
                None => write!(f, "Work session is already closed"),
            },
            Self::SessionDeleted { work_session_id } => match work_session_id {
                Some(id) => write!(f, "Work session {id} has been deleted"),
                None => write!(f, "Work session has been deleted"),
            },
            Self::InvalidMonth(month) => {
                write!(f, "Invalid month: {month}. Must be between 1 and 12")
            }
            Self::InvalidMonthLabel(label) => {
                write!(f, "Invalid month '{label}': expected YYYY-MM")
            }
            Self::InvalidYear(year) => write!(f, "Invalid year: {year}"),
            Self::InvalidTimeZone(name) => write!(f, "Invalid time zone: {name}"),
            Self::UnresolvableMonthBoundary { year, month } => {
                write!(
                    f,
                    "Could not resolve the start of {year}-{month:02} in the configured time zone"
                )
            }
            Self::NonPositiveQuantity { quantity } => {
                write!(f, "Quantity must be positive, got {quantity}")
            }
            Self::NegativePrice { price } => {
                write!(f, "Price must not be negative, got {price}")
            }
            Self::InvalidDecimal { field, value } => {
                write!(f, "Invalid decimal for {field}: '{value}'")
            }
            Self::AmountOverflow { operation } => {
                write!(f, "Amount overflow in operation: {operation}")
            }
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow in operation: {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}

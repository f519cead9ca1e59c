// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Calendar months as half-open instant intervals.
//!
//! Month boundaries are wall-clock midnights in a declared time zone,
//! converted to UTC for storage and comparison. A session created at
//! exactly the first instant of the next month belongs to the next month.

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Parses an IANA time zone name.
///
/// # Errors
///
/// Returns an error if the name is not a known zone.
pub fn parse_time_zone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimeZone(name.to_string()))
}

/// A calendar month, the unit of salary reports and bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    /// Creates a month.
    ///
    /// # Errors
    ///
    /// Returns an error if the month is outside 1..=12 or the year is not
    /// representable.
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::InvalidMonth(month));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(DomainError::InvalidYear(year));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month containing `instant` as observed in `tz`.
    #[must_use]
    pub fn containing(instant: DateTime<Utc>, tz: Tz) -> Self {
        Self::of_date(instant.with_timezone(&tz).date_naive())
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The first calendar day of the month.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is not representable.
    pub fn first_day(&self) -> Result<NaiveDate, DomainError> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or(DomainError::InvalidYear(self.year))
    }

    /// The following month.
    ///
    /// # Errors
    ///
    /// Returns an error if the year overflows.
    pub fn next(&self) -> Result<Self, DomainError> {
        if self.month == 12 {
            let year: i32 =
                self.year
                    .checked_add(1)
                    .ok_or_else(|| DomainError::DateArithmeticOverflow {
                        operation: format!("month after {self}"),
                    })?;
            Self::new(year, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// The half-open interval `[start, end)` covering this month in `tz`.
    ///
    /// # Errors
    ///
    /// Returns an error if either boundary cannot be resolved.
    pub fn bounds(&self, tz: Tz) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
        let start: DateTime<Utc> = self.start_instant(tz)?;
        let end: DateTime<Utc> = self.next()?.start_instant(tz)?;
        Ok((start, end))
    }

    fn start_instant(&self, tz: Tz) -> Result<DateTime<Utc>, DomainError> {
        let midnight = self
            .first_day()?
            .and_hms_opt(0, 0, 0)
            .ok_or(DomainError::UnresolvableMonthBoundary {
                year: self.year,
                month: self.month,
            })?;

        // A midnight skipped by a DST jump resolves to the first instant after the gap.
        let local = match tz.from_local_datetime(&midnight) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earliest, _) => earliest,
            LocalResult::None => tz
                .from_local_datetime(&(midnight + chrono::Duration::hours(1)))
                .earliest()
                .ok_or(DomainError::UnresolvableMonthBoundary {
                    year: self.year,
                    month: self.month,
                })?,
        };
        Ok(local.with_timezone(&Utc))
    }
}

impl std::fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for BillingMonth {
    type Err = DomainError;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidMonthLabel(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Column encodings.
//!
//! - Decimals are stored as their canonical text, keeping scale.
//! - Instants are stored as `YYYY-MM-DDTHH:MM:SS.ffffffZ`; the fixed
//!   width makes lexical order equal time order, so range filters can be
//!   done in SQL.
//! - Bill months are stored as the first day of the month.
//! - Booleans are `INTEGER` 0/1.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tutor_ledger_domain::BillingMonth;

use crate::error::PersistenceError;

#[must_use]
pub fn encode_decimal(value: Decimal) -> String {
    value.to_string()
}

/// # Errors
///
/// Returns an error if the text is not a decimal.
pub fn decode_decimal(
    table: &'static str,
    column: &'static str,
    value: &str,
) -> Result<Decimal, PersistenceError> {
    Decimal::from_str(value).map_err(|_| PersistenceError::CorruptValue {
        table,
        column,
        value: value.to_string(),
    })
}

/// # Errors
///
/// Returns an error if the text is present but not a decimal.
pub fn decode_optional_decimal(
    table: &'static str,
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<Decimal>, PersistenceError> {
    value
        .map(|text| decode_decimal(table, column, text))
        .transpose()
}

#[must_use]
pub fn encode_instant(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// # Errors
///
/// Returns an error if the text is not an RFC 3339 timestamp.
pub fn decode_instant(
    table: &'static str,
    column: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, PersistenceError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| PersistenceError::CorruptValue {
            table,
            column,
            value: value.to_string(),
        })
}

/// # Errors
///
/// Returns an error if the text is present but not a timestamp.
pub fn decode_optional_instant(
    table: &'static str,
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, PersistenceError> {
    value
        .map(|text| decode_instant(table, column, text))
        .transpose()
}

/// # Errors
///
/// Returns an error if the month has no first day (out of range year).
pub fn encode_month(month: BillingMonth) -> Result<String, PersistenceError> {
    Ok(month.first_day()?.format("%Y-%m-%d").to_string())
}

/// # Errors
///
/// Returns an error if the text is not a `YYYY-MM-DD` date.
pub fn decode_month(value: &str) -> Result<BillingMonth, PersistenceError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(BillingMonth::of_date)
        .map_err(|_| PersistenceError::CorruptValue {
            table: "bills",
            column: "month",
            value: value.to_string(),
        })
}

#[must_use]
pub fn encode_flag(value: bool) -> i32 {
    i32::from(value)
}

#[must_use]
pub const fn decode_flag(value: i32) -> bool {
    value != 0
}

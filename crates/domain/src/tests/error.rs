// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::dec;
use crate::{DomainError, EntryType};

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::MissingManualHours;
    assert_eq!(format!("{err}"), "Manual entry requires manual hours");

    let err: DomainError = DomainError::NegativeManualHours { hours: dec("-1.5") };
    assert_eq!(
        format!("{err}"),
        "Manual hours must not be negative, got -1.5"
    );

    let err: DomainError = DomainError::NotClockSession {
        entry_type: EntryType::TimeRange,
    };
    assert_eq!(
        format!("{err}"),
        "Only clock sessions can be closed, session is time_range"
    );

    let err: DomainError = DomainError::SessionAlreadyClosed {
        work_session_id: Some(12),
    };
    assert_eq!(format!("{err}"), "Work session 12 is already closed");

    let err: DomainError = DomainError::InvalidMonth(13);
    assert_eq!(
        format!("{err}"),
        "Invalid month: 13. Must be between 1 and 12"
    );

    let err: DomainError = DomainError::NonPositiveQuantity {
        quantity: dec("0"),
    };
    assert_eq!(format!("{err}"), "Quantity must be positive, got 0");
}

#[test]
fn test_domain_error_is_std_error() {
    let err: Box<dyn std::error::Error> = Box::new(DomainError::MissingClockIn);
    assert_eq!(err.to_string(), "Clock entry requires a clock-in time");
}

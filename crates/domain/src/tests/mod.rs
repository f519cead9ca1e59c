// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod error;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::{NewWorkSession, TaskTemplate, WorkEntry};

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap()
}

pub fn create_test_task(hourly_rate: &str, price: &str) -> TaskTemplate {
    TaskTemplate {
        task_id: 7,
        name: String::from("Math tutoring"),
        description: Some(String::from("One-to-one algebra")),
        hourly_rate: dec(hourly_rate),
        price: dec(price),
        is_active: true,
    }
}

pub fn create_test_draft(entry: WorkEntry) -> NewWorkSession {
    NewWorkSession {
        teacher_id: 1,
        student_id: Some(3),
        entry,
        created_at: None,
    }
}

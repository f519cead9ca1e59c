// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Task and service template mutations.
//!
//! Changing a template never touches sessions or bill items already
//! written; those carry their own frozen copies.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use tracing::info;
use tutor_ledger_domain::DomainError;

use crate::backend::PersistenceBackend;
use crate::codec::{encode_decimal, encode_instant};
use crate::diesel_schema::{services, tasks};
use crate::error::PersistenceError;

fn ensure_not_negative(price: Decimal) -> Result<(), PersistenceError> {
    if price < Decimal::ZERO {
        return Err(PersistenceError::Rejected(DomainError::NegativePrice {
            price,
        }));
    }
    Ok(())
}

/// Creates a task template.
///
/// # Errors
///
/// Returns `Rejected` if the rate or price is negative.
pub fn create_task(
    conn: &mut SqliteConnection,
    name: &str,
    description: Option<&str>,
    hourly_rate: Decimal,
    price: Decimal,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    ensure_not_negative(hourly_rate)?;
    ensure_not_negative(price)?;
    let now_text: String = encode_instant(now);

    diesel::insert_into(tasks::table)
        .values((
            tasks::name.eq(name),
            tasks::description.eq(description),
            tasks::hourly_rate.eq(encode_decimal(hourly_rate)),
            tasks::price.eq(encode_decimal(price)),
            tasks::is_active.eq(1),
            tasks::created_at.eq(&now_text),
            tasks::updated_at.eq(&now_text),
        ))
        .execute(conn)?;

    let task_id: i64 = conn.get_last_insert_rowid()?;
    info!(task_id, name, %hourly_rate, %price, "Created task");
    Ok(task_id)
}

/// Changes a task's current rate and price.
///
/// # Errors
///
/// Returns `Rejected` for negative values, `NotFound` if the task is missing.
pub fn update_task_rates(
    conn: &mut SqliteConnection,
    task_id: i64,
    hourly_rate: Decimal,
    price: Decimal,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    ensure_not_negative(hourly_rate)?;
    ensure_not_negative(price)?;

    let rows_affected: usize = diesel::update(tasks::table)
        .filter(tasks::task_id.eq(task_id))
        .set((
            tasks::hourly_rate.eq(encode_decimal(hourly_rate)),
            tasks::price.eq(encode_decimal(price)),
            tasks::updated_at.eq(encode_instant(now)),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("Task {task_id}")));
    }

    info!(task_id, %hourly_rate, %price, "Updated task rates");
    Ok(())
}

/// Creates a service template.
///
/// # Errors
///
/// Returns `Rejected` if the price is negative.
pub fn create_service(
    conn: &mut SqliteConnection,
    name: &str,
    description: Option<&str>,
    price: Decimal,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    ensure_not_negative(price)?;
    let now_text: String = encode_instant(now);

    diesel::insert_into(services::table)
        .values((
            services::name.eq(name),
            services::description.eq(description),
            services::price.eq(encode_decimal(price)),
            services::is_active.eq(1),
            services::created_at.eq(&now_text),
            services::updated_at.eq(&now_text),
        ))
        .execute(conn)?;

    let service_id: i64 = conn.get_last_insert_rowid()?;
    info!(service_id, name, %price, "Created service");
    Ok(service_id)
}

/// Changes a service's current price.
///
/// # Errors
///
/// Returns `Rejected` for a negative price, `NotFound` if the service is missing.
pub fn update_service_price(
    conn: &mut SqliteConnection,
    service_id: i64,
    price: Decimal,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    ensure_not_negative(price)?;

    let rows_affected: usize = diesel::update(services::table)
        .filter(services::service_id.eq(service_id))
        .set((
            services::price.eq(encode_decimal(price)),
            services::updated_at.eq(encode_instant(now)),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!("Service {service_id}")));
    }

    info!(service_id, %price, "Updated service price");
    Ok(())
}

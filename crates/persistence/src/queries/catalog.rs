// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Task and service template queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use tutor_ledger_domain::{ServiceTemplate, TaskTemplate};

use crate::data_models::{ServiceRow, TaskRow};
use crate::diesel_schema::{services, tasks};
use crate::error::PersistenceError;

/// Retrieves a task template with its current rate and price.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn get_task(
    conn: &mut SqliteConnection,
    task_id: i64,
) -> Result<Option<TaskTemplate>, PersistenceError> {
    tasks::table
        .filter(tasks::task_id.eq(task_id))
        .select(TaskRow::as_select())
        .first::<TaskRow>(conn)
        .optional()?
        .map(TaskTemplate::try_from)
        .transpose()
}

/// Lists all task templates ordered by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn list_tasks(conn: &mut SqliteConnection) -> Result<Vec<TaskTemplate>, PersistenceError> {
    tasks::table
        .order(tasks::task_id.asc())
        .select(TaskRow::as_select())
        .load::<TaskRow>(conn)?
        .into_iter()
        .map(TaskTemplate::try_from)
        .collect()
}

/// Retrieves a service template with its current price.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value is corrupt.
pub fn get_service(
    conn: &mut SqliteConnection,
    service_id: i64,
) -> Result<Option<ServiceTemplate>, PersistenceError> {
    services::table
        .filter(services::service_id.eq(service_id))
        .select(ServiceRow::as_select())
        .first::<ServiceRow>(conn)
        .optional()?
        .map(ServiceTemplate::try_from)
        .transpose()
}

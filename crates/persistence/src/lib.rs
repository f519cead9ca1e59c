// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the tutoring ledger.
//!
//! Built on Diesel over `SQLite`. The schema is created by embedded
//! migrations in `migrations/` when a database is opened.
//!
//! ## Write model
//!
//! Every state change goes through [`Persistence`], which composes the
//! single-step functions in `mutations` inside one immediate
//! (`BEGIN IMMEDIATE`) transaction. A failure at any step rolls back the
//! whole sequence, and concurrent writers to the same bill are serialized
//! by the database write lock.
//!
//! ## Frozen values
//!
//! Work sessions, salary reports and bill lines are written with their
//! derived values already computed by the domain layer. Nothing here
//! reads a task or service template to price an existing record.
//!
//! ## Testing
//!
//! Tests open a fresh shared-cache in-memory database per adapter, so they
//! are isolated from each other and need no external infrastructure.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use chrono::{DateTime, Utc};
use diesel::SqliteConnection;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};
use tutor_ledger::{IntegrityFacts, SalaryBreakdown, SalaryTotals, outstanding_balance};
use tutor_ledger_domain::{
    Bill, BillItem, BillLine, BillingMonth, InspectorProfile, NewWorkSession, SalaryReport,
    ServicePriceSnapshot, ServiceTemplate, StudentProfile, TaskTemplate, TeacherProfile, Tz,
    UserAccount, WorkSession,
};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod codec;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod outcomes;
mod queries;

#[cfg(test)]
mod tests;

use backend::PersistenceBackend;

pub use backend::sqlite::MIGRATIONS;
pub use error::PersistenceError;
pub use mutations::accounts::RoleFlags;
pub use outcomes::{
    BillOpening, BillStatement, ChargedLine, LoggedSession, ReportRunOutcome, SalaryReportDetail,
};
pub use queries::scan::{Scanned, UnreadableRow};

/// Type alias kept for callers that name the backend explicitly.
pub type SqlitePersistence = Persistence;

/// Persistence adapter for the tutoring ledger.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with a unique in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// Pending migrations are applied on open.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled on this connection.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// Creates a user account without any profile.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` if the username is taken.
    pub fn create_user(
        &mut self,
        username: &str,
        display_name: &str,
        flags: RoleFlags,
        now: DateTime<Utc>,
    ) -> Result<UserAccount, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let user_id: i64 =
                mutations::accounts::create_user(conn, username, display_name, flags, now)?;
            queries::accounts::get_user(conn, user_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("user {user_id}")))
        })
    }

    /// Creates a teacher account and its profile together.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` if the username is taken.
    pub fn register_teacher(
        &mut self,
        username: &str,
        display_name: &str,
        subjects: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TeacherProfile, PersistenceError> {
        let flags = RoleFlags {
            is_teacher: true,
            ..RoleFlags::default()
        };
        self.conn.immediate_transaction(|conn| {
            let user_id: i64 =
                mutations::accounts::create_user(conn, username, display_name, flags, now)?;
            let teacher_id: i64 =
                mutations::accounts::create_teacher_profile(conn, user_id, subjects)?;
            queries::accounts::get_teacher(conn, teacher_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("teacher {teacher_id}")))
        })
    }

    /// Creates a student account and its profile together.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` if the username is taken.
    pub fn register_student(
        &mut self,
        username: &str,
        display_name: &str,
        phone: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<StudentProfile, PersistenceError> {
        let flags = RoleFlags {
            is_student: true,
            ..RoleFlags::default()
        };
        self.conn.immediate_transaction(|conn| {
            let user_id: i64 =
                mutations::accounts::create_user(conn, username, display_name, flags, now)?;
            let student_id: i64 =
                mutations::accounts::create_student_profile(conn, user_id, phone)?;
            queries::accounts::get_student(conn, student_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("student {student_id}")))
        })
    }

    /// Creates an inspector account and its profile together.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` if the username is taken.
    pub fn register_inspector(
        &mut self,
        username: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<InspectorProfile, PersistenceError> {
        let flags = RoleFlags {
            is_inspector: true,
            ..RoleFlags::default()
        };
        self.conn.immediate_transaction(|conn| {
            let user_id: i64 =
                mutations::accounts::create_user(conn, username, display_name, flags, now)?;
            mutations::accounts::create_inspector_profile(conn, user_id)?;
            queries::accounts::get_inspector_for_user(conn, user_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("inspector for user {user_id}")))
        })
    }

    /// Adds a teacher profile to an existing account.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` if the user is unknown or already has one.
    pub fn add_teacher_profile(
        &mut self,
        user_id: i64,
        subjects: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::accounts::create_teacher_profile(conn, user_id, subjects)
        })
    }

    /// Adds a student profile to an existing account.
    ///
    /// # Errors
    ///
    /// Returns `IntegrityViolation` if the user is unknown or already has one.
    pub fn add_student_profile(
        &mut self,
        user_id: i64,
        phone: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::accounts::create_student_profile(conn, user_id, phone)
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the student does not exist.
    pub fn set_student_active(
        &mut self,
        student_id: i64,
        is_active: bool,
    ) -> Result<(), PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::accounts::set_student_active(conn, student_id, is_active)
        })
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<UserAccount>, PersistenceError> {
        queries::accounts::get_user_by_username(&mut self.conn, username)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_users(&mut self) -> Result<Vec<UserAccount>, PersistenceError> {
        queries::accounts::list_users(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_teacher(
        &mut self,
        teacher_id: i64,
    ) -> Result<Option<TeacherProfile>, PersistenceError> {
        queries::accounts::get_teacher(&mut self.conn, teacher_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_teacher_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Option<TeacherProfile>, PersistenceError> {
        queries::accounts::get_teacher_for_user(&mut self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_teachers(&mut self) -> Result<Vec<TeacherProfile>, PersistenceError> {
        queries::accounts::list_teachers(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_student(
        &mut self,
        student_id: i64,
    ) -> Result<Option<StudentProfile>, PersistenceError> {
        queries::accounts::get_student(&mut self.conn, student_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_student_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Option<StudentProfile>, PersistenceError> {
        queries::accounts::get_student_for_user(&mut self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_students(&mut self) -> Result<Vec<StudentProfile>, PersistenceError> {
        queries::accounts::list_students(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_inspector_for_user(
        &mut self,
        user_id: i64,
    ) -> Result<Option<InspectorProfile>, PersistenceError> {
        queries::accounts::get_inspector_for_user(&mut self.conn, user_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_inspectors(&mut self) -> Result<Vec<InspectorProfile>, PersistenceError> {
        queries::accounts::list_inspectors(&mut self.conn)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Creates a task template.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the rate or price is negative.
    pub fn create_task(
        &mut self,
        name: &str,
        description: Option<&str>,
        hourly_rate: Decimal,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<TaskTemplate, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let task_id: i64 =
                mutations::catalog::create_task(conn, name, description, hourly_rate, price, now)?;
            queries::catalog::get_task(conn, task_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("task {task_id}")))
        })
    }

    /// Changes a task's current rates.
    ///
    /// Sessions already logged keep the rates they captured.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the task does not exist, or `Rejected` if a
    /// value is negative.
    pub fn update_task_rates(
        &mut self,
        task_id: i64,
        hourly_rate: Decimal,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::catalog::update_task_rates(conn, task_id, hourly_rate, price, now)
        })
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_task(&mut self, task_id: i64) -> Result<Option<TaskTemplate>, PersistenceError> {
        queries::catalog::get_task(&mut self.conn, task_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_tasks(&mut self) -> Result<Vec<TaskTemplate>, PersistenceError> {
        queries::catalog::list_tasks(&mut self.conn)
    }

    /// Creates a service template.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the price is negative.
    pub fn create_service(
        &mut self,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<ServiceTemplate, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let service_id: i64 =
                mutations::catalog::create_service(conn, name, description, price, now)?;
            queries::catalog::get_service(conn, service_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("service {service_id}")))
        })
    }

    /// Changes a service's current price. Existing bill lines keep theirs.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the service does not exist, or `Rejected` if
    /// the price is negative.
    pub fn update_service_price(
        &mut self,
        service_id: i64,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> Result<(), PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::catalog::update_service_price(conn, service_id, price, now)
        })
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_service(
        &mut self,
        service_id: i64,
    ) -> Result<Option<ServiceTemplate>, PersistenceError> {
        queries::catalog::get_service(&mut self.conn, service_id)
    }

    // ========================================================================
    // Work sessions
    // ========================================================================

    /// Logs a work session and bills it when it is billable.
    ///
    /// The task's rates are captured once, here. A session whose hours are
    /// known at logging time is billed to the month of its creation in
    /// `tz` within the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The task does not exist
    /// - The entry inputs are invalid (`Rejected`; nothing is written)
    /// - The teacher or student does not exist (`IntegrityViolation`)
    pub fn log_work_session(
        &mut self,
        draft: NewWorkSession,
        task_id: i64,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<LoggedSession, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let task: TaskTemplate = queries::catalog::get_task(conn, task_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("task {task_id}")))?;
            let session: WorkSession = WorkSession::log(draft, &task, now)?;
            let work_session_id: i64 = mutations::work_sessions::insert_work_session(conn, &session)?;
            let session: WorkSession = session.with_id(work_session_id);

            let bill_item: Option<BillItem> = bill_session(conn, &session, tz, now)?;
            info!(
                work_session_id,
                teacher_id = session.teacher_id(),
                entry_type = %session.entry_type(),
                billed = bill_item.is_some(),
                "Logged work session"
            );
            Ok(LoggedSession { session, bill_item })
        })
    }

    /// Closes an open clock session and bills it when it is billable.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session does not exist, or `Rejected` if
    /// it is not an open clock session or `clock_out` is not after clock-in.
    pub fn close_work_session(
        &mut self,
        work_session_id: i64,
        clock_out: DateTime<Utc>,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<LoggedSession, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let mut session: WorkSession = load_session(conn, work_session_id)?;
            session.close(clock_out)?;
            mutations::work_sessions::rewrite_work_session(conn, work_session_id, &session)?;

            let bill_item: Option<BillItem> = bill_session(conn, &session, tz, now)?;
            info!(
                work_session_id,
                stored_hours = ?session.stored_hours(),
                billed = bill_item.is_some(),
                "Closed work session"
            );
            Ok(LoggedSession { session, bill_item })
        })
    }

    /// Soft-deletes a work session.
    ///
    /// A bill line already created for the session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session does not exist, or `Rejected` if
    /// it is already deleted.
    pub fn delete_work_session(
        &mut self,
        work_session_id: i64,
        now: DateTime<Utc>,
    ) -> Result<WorkSession, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let mut session: WorkSession = load_session(conn, work_session_id)?;
            session.soft_delete(now)?;
            mutations::work_sessions::rewrite_work_session(conn, work_session_id, &session)?;
            info!(work_session_id, "Soft-deleted work session");
            Ok(session)
        })
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn get_work_session(
        &mut self,
        work_session_id: i64,
    ) -> Result<Option<WorkSession>, PersistenceError> {
        queries::work_sessions::get_work_session(&mut self.conn, work_session_id)
    }

    /// Lists every session, deleted ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_work_sessions(&mut self) -> Result<Vec<WorkSession>, PersistenceError> {
        queries::work_sessions::list_work_sessions(&mut self.conn)
    }

    /// A teacher's live sessions created in the given month.
    ///
    /// # Errors
    ///
    /// Returns an error if the month bounds cannot be resolved or the
    /// query fails.
    pub fn list_teacher_sessions_for_month(
        &mut self,
        teacher_id: i64,
        month: BillingMonth,
        tz: Tz,
    ) -> Result<Vec<WorkSession>, PersistenceError> {
        let (start, end) = month.bounds(tz)?;
        queries::work_sessions::list_teacher_sessions_in_interval(
            &mut self.conn,
            teacher_id,
            start,
            end,
        )
    }

    /// A student's live sessions created in the given month.
    ///
    /// # Errors
    ///
    /// Returns an error if the month bounds cannot be resolved or the
    /// query fails.
    pub fn list_student_sessions_for_month(
        &mut self,
        student_id: i64,
        month: BillingMonth,
        tz: Tz,
    ) -> Result<Vec<WorkSession>, PersistenceError> {
        let (start, end) = month.bounds(tz)?;
        queries::work_sessions::list_student_sessions_in_interval(
            &mut self.conn,
            student_id,
            start,
            end,
        )
    }

    // ========================================================================
    // Salary reports
    // ========================================================================

    /// Computes and stores a frozen salary report for one teacher and month.
    ///
    /// Duplicates are allowed; each call stores a new report.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the teacher does not exist, or an error if the
    /// month bounds cannot be resolved in `tz`.
    pub fn create_salary_report(
        &mut self,
        teacher_id: i64,
        month: BillingMonth,
        tz: Tz,
        created_by: Option<i64>,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Result<SalaryReport, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            if queries::accounts::get_teacher(conn, teacher_id)?.is_none() {
                return Err(PersistenceError::NotFound(format!("teacher {teacher_id}")));
            }
            insert_report(conn, teacher_id, month, tz, created_by, notes, now)
        })
    }

    /// Creates the month's report for every teacher that lacks a live one.
    ///
    /// # Errors
    ///
    /// Returns an error if any report cannot be created; nothing is stored
    /// in that case.
    pub fn bulk_create_salary_reports(
        &mut self,
        month: BillingMonth,
        tz: Tz,
        created_by: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReportRunOutcome>, PersistenceError> {
        let (start, end) = month.bounds(tz)?;
        self.conn.immediate_transaction(|conn| {
            let teachers: Vec<TeacherProfile> = queries::accounts::list_teachers(conn)?;
            let mut outcomes: Vec<ReportRunOutcome> = Vec::with_capacity(teachers.len());

            for teacher in teachers {
                let teacher_id: i64 = teacher.teacher_id;
                if queries::salary_reports::live_report_exists(conn, teacher_id, start, end)? {
                    debug!(teacher_id, %month, "Skipping teacher with a live report");
                    outcomes.push(ReportRunOutcome::Skipped { teacher_id });
                    continue;
                }
                let report: SalaryReport =
                    insert_report(conn, teacher_id, month, tz, created_by, "", now)?;
                outcomes.push(ReportRunOutcome::Created { teacher_id, report });
            }

            info!(
                %month,
                created = outcomes.iter().filter(|o| o.is_created()).count(),
                skipped = outcomes.iter().filter(|o| !o.is_created()).count(),
                "Completed bulk salary run"
            );
            Ok(outcomes)
        })
    }

    /// Soft-deletes a salary report. Its totals are not touched.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the report does not exist.
    pub fn delete_salary_report(
        &mut self,
        salary_report_id: i64,
        now: DateTime<Utc>,
    ) -> Result<SalaryReport, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::salary_reports::soft_delete_salary_report(conn, salary_report_id, now)?;
            queries::salary_reports::get_salary_report(conn, salary_report_id)?.ok_or_else(|| {
                PersistenceError::NotFound(format!("salary report {salary_report_id}"))
            })
        })
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn get_salary_report(
        &mut self,
        salary_report_id: i64,
    ) -> Result<Option<SalaryReport>, PersistenceError> {
        queries::salary_reports::get_salary_report(&mut self.conn, salary_report_id)
    }

    /// A report with the live sessions of its interval.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn get_salary_report_detail(
        &mut self,
        salary_report_id: i64,
    ) -> Result<Option<SalaryReportDetail>, PersistenceError> {
        let Some(report) =
            queries::salary_reports::get_salary_report(&mut self.conn, salary_report_id)?
        else {
            return Ok(None);
        };
        let sessions: Vec<WorkSession> = queries::work_sessions::list_teacher_sessions_in_interval(
            &mut self.conn,
            report.teacher_id,
            report.start_date,
            report.end_date,
        )?;
        Ok(Some(SalaryReportDetail { report, sessions }))
    }

    /// Lists every report, deleted ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_salary_reports(&mut self) -> Result<Vec<SalaryReport>, PersistenceError> {
        queries::salary_reports::list_salary_reports(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_teacher_salary_reports(
        &mut self,
        teacher_id: i64,
    ) -> Result<Vec<SalaryReport>, PersistenceError> {
        queries::salary_reports::list_teacher_salary_reports(&mut self.conn, teacher_id)
    }

    /// An itemized, live breakdown of a teacher's pay for a month.
    ///
    /// # Errors
    ///
    /// Returns an error if the month bounds cannot be resolved or a query
    /// fails.
    pub fn salary_breakdown(
        &mut self,
        teacher_id: i64,
        month: BillingMonth,
        tz: Tz,
    ) -> Result<SalaryBreakdown, PersistenceError> {
        let (start, end) = month.bounds(tz)?;
        let sessions: Vec<WorkSession> = queries::work_sessions::list_teacher_sessions_in_interval(
            &mut self.conn,
            teacher_id,
            start,
            end,
        )?;
        let task_names: BTreeMap<i64, String> = queries::catalog::list_tasks(&mut self.conn)?
            .into_iter()
            .map(|task| (task.task_id, task.name))
            .collect();

        Ok(tutor_ledger::salary_breakdown(
            &sessions,
            teacher_id,
            (start, end),
            &task_names,
            tz,
        )?)
    }

    // ========================================================================
    // Billing
    // ========================================================================

    /// Adds a service line to the student's bill for `month`.
    ///
    /// The bill is created if needed. The service's current name,
    /// description and price are frozen onto the line.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The student or service does not exist (`NotFound`)
    /// - The quantity is not positive or the price negative (`Rejected`)
    pub fn charge_service(
        &mut self,
        student_id: i64,
        service_id: i64,
        month: BillingMonth,
        quantity: Decimal,
        description_override: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ChargedLine, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            if queries::accounts::get_student(conn, student_id)?.is_none() {
                return Err(PersistenceError::NotFound(format!("student {student_id}")));
            }
            let service: ServiceTemplate = queries::catalog::get_service(conn, service_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("service {service_id}")))?;
            let snapshot: ServicePriceSnapshot = service.capture(description_override)?;
            let line: BillLine = BillLine::from_service(&snapshot, quantity)?;

            let (bill, _) = mutations::billing::find_or_create_bill(conn, student_id, month, now)?;
            let item: BillItem = mutations::billing::insert_bill_item(conn, bill.bill_id, &line, now)?;
            let bill_total: Decimal = mutations::billing::resum_bill_total(conn, bill.bill_id, now)?;

            info!(
                student_id,
                service_id,
                bill_id = bill.bill_id,
                %bill_total,
                "Charged service"
            );
            Ok(ChargedLine { item, bill_total })
        })
    }

    /// Bills a work session to its student.
    ///
    /// Billing the same session twice returns the existing line.
    ///
    /// # Returns
    ///
    /// `None` when the session produces no line: no student, no hours
    /// yet, a free task or deleted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the session does not exist.
    pub fn bill_work_session(
        &mut self,
        work_session_id: i64,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<Option<BillItem>, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let session: WorkSession = load_session(conn, work_session_id)?;
            bill_session(conn, &session, tz, now)
        })
    }

    /// Changes a line's quantity and/or description and re-sums its bill.
    ///
    /// The frozen price is kept; the amount is recomputed from it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the line does not exist, or `Rejected` if the
    /// new quantity is not positive.
    pub fn edit_bill_item(
        &mut self,
        bill_item_id: i64,
        quantity: Option<Decimal>,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<ChargedLine, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let mut item: BillItem = queries::billing::get_bill_item(conn, bill_item_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("bill item {bill_item_id}")))?;

            if let Some(quantity) = quantity {
                item.line = item.line.with_quantity(quantity)?;
            }
            if description.is_some() {
                item.line = item.line.with_description(description);
            }

            mutations::billing::update_bill_item(conn, bill_item_id, &item.line)?;
            let bill_total: Decimal = mutations::billing::resum_bill_total(conn, item.bill_id, now)?;
            info!(bill_item_id, bill_id = item.bill_id, %bill_total, "Edited bill item");
            Ok(ChargedLine { item, bill_total })
        })
    }

    /// Deletes a line and re-sums its bill.
    ///
    /// # Returns
    ///
    /// The bill's new total.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the line does not exist.
    pub fn delete_bill_item(
        &mut self,
        bill_item_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Decimal, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let item: BillItem = queries::billing::get_bill_item(conn, bill_item_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("bill item {bill_item_id}")))?;
            mutations::billing::delete_bill_item(conn, bill_item_id)?;
            let bill_total: Decimal = mutations::billing::resum_bill_total(conn, item.bill_id, now)?;
            info!(bill_item_id, bill_id = item.bill_id, %bill_total, "Deleted bill item");
            Ok(bill_total)
        })
    }

    /// Marks a bill paid at `paid_at`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the bill does not exist.
    pub fn mark_bill_paid(
        &mut self,
        bill_id: i64,
        paid_at: DateTime<Utc>,
    ) -> Result<Bill, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            mutations::billing::mark_bill_paid(conn, bill_id, paid_at)?;
            queries::billing::get_bill(conn, bill_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("bill {bill_id}")))
        })
    }

    /// Finds or creates the month's bill for every active student.
    ///
    /// # Errors
    ///
    /// Returns an error if any bill cannot be created; nothing is stored in
    /// that case.
    pub fn open_bills_for_month(
        &mut self,
        month: BillingMonth,
        now: DateTime<Utc>,
    ) -> Result<Vec<BillOpening>, PersistenceError> {
        self.conn.immediate_transaction(|conn| {
            let students: Vec<StudentProfile> = queries::accounts::list_students(conn)?;
            let mut openings: Vec<BillOpening> = Vec::new();

            for student in students.into_iter().filter(|s| s.is_active) {
                let (bill, created) =
                    mutations::billing::find_or_create_bill(conn, student.student_id, month, now)?;
                openings.push(if created {
                    BillOpening::Created { bill }
                } else {
                    BillOpening::Existing { bill }
                });
            }

            info!(%month, students = openings.len(), "Opened monthly bills");
            Ok(openings)
        })
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn get_bill(&mut self, bill_id: i64) -> Result<Option<Bill>, PersistenceError> {
        queries::billing::get_bill(&mut self.conn, bill_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn get_bill_for_month(
        &mut self,
        student_id: i64,
        month: BillingMonth,
    ) -> Result<Option<Bill>, PersistenceError> {
        queries::billing::get_bill_for_month(&mut self.conn, student_id, month)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn get_bill_item(
        &mut self,
        bill_item_id: i64,
    ) -> Result<Option<BillItem>, PersistenceError> {
        queries::billing::get_bill_item(&mut self.conn, bill_item_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_bills(&mut self) -> Result<Vec<Bill>, PersistenceError> {
        queries::billing::list_bills(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_student_bills(&mut self, student_id: i64) -> Result<Vec<Bill>, PersistenceError> {
        queries::billing::list_student_bills(&mut self.conn, student_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_bill_items(&mut self, bill_id: i64) -> Result<Vec<BillItem>, PersistenceError> {
        queries::billing::list_bill_items(&mut self.conn, bill_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_all_bill_items(&mut self) -> Result<Vec<BillItem>, PersistenceError> {
        queries::billing::list_all_bill_items(&mut self.conn)
    }

    // ========================================================================
    // Verification scans
    // ========================================================================

    /// Every work session that decodes, with the rows that do not.
    ///
    /// # Errors
    ///
    /// Returns an error only if the query fails.
    pub fn scan_work_sessions(&mut self) -> Result<Scanned<WorkSession>, PersistenceError> {
        queries::scan::scan_work_sessions(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error only if the query fails.
    pub fn scan_salary_reports(&mut self) -> Result<Scanned<SalaryReport>, PersistenceError> {
        queries::scan::scan_salary_reports(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error only if the query fails.
    pub fn scan_bills(&mut self) -> Result<Scanned<Bill>, PersistenceError> {
        queries::scan::scan_bills(&mut self.conn)
    }

    /// # Errors
    ///
    /// Returns an error only if the query fails.
    pub fn scan_bill_items(&mut self) -> Result<Scanned<BillItem>, PersistenceError> {
        queries::scan::scan_bill_items(&mut self.conn)
    }

    /// A bill with its items and the student's sessions of that month.
    ///
    /// # Errors
    ///
    /// Returns an error if the month bounds cannot be resolved or a query
    /// fails.
    pub fn bill_statement(
        &mut self,
        bill_id: i64,
        tz: Tz,
    ) -> Result<Option<BillStatement>, PersistenceError> {
        let Some(bill) = queries::billing::get_bill(&mut self.conn, bill_id)? else {
            return Ok(None);
        };
        let items: Vec<BillItem> = queries::billing::list_bill_items(&mut self.conn, bill_id)?;
        let (start, end) = bill.month.bounds(tz)?;
        let sessions: Vec<WorkSession> = queries::work_sessions::list_student_sessions_in_interval(
            &mut self.conn,
            bill.student_id,
            start,
            end,
        )?;

        let total_hours: Decimal = sessions.iter().filter_map(WorkSession::stored_hours).sum();
        let session_amount_total: Decimal = sessions
            .iter()
            .filter_map(|s| s.amounts().total_amount)
            .sum();

        Ok(Some(BillStatement {
            bill,
            items,
            sessions,
            total_hours,
            session_amount_total,
        }))
    }

    /// Sum of the totals of a student's unpaid bills.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn student_balance(&mut self, student_id: i64) -> Result<Decimal, PersistenceError> {
        let bills: Vec<Bill> = queries::billing::list_student_bills(&mut self.conn, student_id)?;
        Ok(outstanding_balance(&bills))
    }

    // ========================================================================
    // Verification support
    // ========================================================================

    /// Structural facts for the integrity check.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub fn gather_integrity_facts(&mut self) -> Result<IntegrityFacts, PersistenceError> {
        queries::integrity::gather_integrity_facts(&mut self.conn)
    }
}

// ============================================================================
// Transaction-scoped helpers
// ============================================================================

fn load_session(
    conn: &mut SqliteConnection,
    work_session_id: i64,
) -> Result<WorkSession, PersistenceError> {
    queries::work_sessions::get_work_session(conn, work_session_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("work session {work_session_id}")))
}

/// Creates the bill line for a session, or returns the one it already has.
///
/// Must run inside the caller's transaction.
fn bill_session(
    conn: &mut SqliteConnection,
    session: &WorkSession,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Option<BillItem>, PersistenceError> {
    let Some(work_session_id) = session.work_session_id() else {
        return Ok(None);
    };
    if let Some(existing) = queries::billing::get_bill_item_for_session(conn, work_session_id)? {
        debug!(work_session_id, "Session already billed");
        return Ok(Some(existing));
    }

    let task: TaskTemplate = queries::catalog::get_task(conn, session.task_id())?
        .ok_or_else(|| PersistenceError::NotFound(format!("task {}", session.task_id())))?;
    let Some(line) = BillLine::from_work_session(session, &task.name, task.description.as_deref())
    else {
        return Ok(None);
    };
    let Some(student_id) = session.student_id() else {
        return Ok(None);
    };

    let month: BillingMonth = BillingMonth::containing(session.created_at(), tz);
    let (bill, _) = mutations::billing::find_or_create_bill(conn, student_id, month, now)?;
    let item: BillItem = mutations::billing::insert_bill_item(conn, bill.bill_id, &line, now)?;
    let bill_total: Decimal = mutations::billing::resum_bill_total(conn, bill.bill_id, now)?;

    info!(
        work_session_id,
        bill_id = bill.bill_id,
        %bill_total,
        "Billed work session"
    );
    Ok(Some(item))
}

/// Sums the teacher's frozen session values for the month and stores them.
fn insert_report(
    conn: &mut SqliteConnection,
    teacher_id: i64,
    month: BillingMonth,
    tz: Tz,
    created_by: Option<i64>,
    notes: &str,
    now: DateTime<Utc>,
) -> Result<SalaryReport, PersistenceError> {
    let (start, end) = month.bounds(tz)?;
    let sessions: Vec<WorkSession> =
        queries::work_sessions::list_teacher_sessions_in_interval(conn, teacher_id, start, end)?;
    let totals: SalaryTotals = SalaryTotals::for_interval(&sessions, teacher_id, start, end)?;

    let row = data_models::NewSalaryReportRow {
        teacher_id,
        start_date: codec::encode_instant(start),
        end_date: codec::encode_instant(end),
        total_hours: codec::encode_decimal(totals.total_hours),
        total_amount: codec::encode_decimal(totals.total_amount),
        created_at: codec::encode_instant(now),
        created_by,
        notes: notes.to_string(),
    };
    let salary_report_id: i64 = mutations::salary_reports::insert_salary_report(conn, &row)?;

    info!(
        salary_report_id,
        teacher_id,
        %month,
        total_hours = %totals.total_hours,
        total_amount = %totals.total_amount,
        "Created salary report"
    );
    queries::salary_reports::get_salary_report(conn, salary_report_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("salary report {salary_report_id}")))
}

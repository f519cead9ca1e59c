// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every handler authorizes the actor before it changes anything. Handlers
//! whose permission depends on who owns the target load that record first,
//! then authorize against its owner.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tutor_ledger::SalaryBreakdown;
use tutor_ledger_domain::{
    Bill, BillItem, BillingMonth, NewWorkSession, SalaryReport, ServiceTemplate, StudentProfile,
    TaskTemplate, TeacherProfile, Tz, WorkSession,
};
use tutor_ledger_persistence::{
    BillOpening, BillStatement, ChargedLine, LoggedSession, ReportRunOutcome, SalaryReportDetail,
    SqlitePersistence,
};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService, Operation};
use crate::capabilities::compute_capabilities;
use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{
    BalanceResponse, BillItemResponse, BillWorkSessionResponse, BulkSalaryReportsRequest,
    BulkSalaryReportsResponse, ChargeServiceRequest, CloseWorkSessionRequest,
    CreateSalaryReportRequest, CreateServiceRequest, CreateTaskRequest, DeleteBillItemResponse,
    EditBillItemRequest, ListBillsResponse, ListWorkSessionsResponse, LogWorkRequest,
    OpenBillsResponse, RegisterAccountRequest, SalaryReportResponse, UpdateTaskRatesRequest,
    WhoAmIResponse, WorkSessionResponse,
};

fn not_found(resource_type: &str, id: i64) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message: format!("{resource_type} with ID {id} does not exist"),
    }
}

fn resolve_month(year: i32, month: u32) -> Result<BillingMonth, ApiError> {
    BillingMonth::new(year, month).map_err(translate_domain_error)
}

fn load_work_session(
    persistence: &mut SqlitePersistence,
    work_session_id: i64,
) -> Result<WorkSession, ApiError> {
    persistence
        .get_work_session(work_session_id)?
        .ok_or_else(|| not_found("Work session", work_session_id))
}

fn session_response(logged: LoggedSession, message: String) -> WorkSessionResponse {
    WorkSessionResponse {
        session: logged.session,
        bill_item: logged.bill_item,
        message,
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Describes the acting account and what it may do.
#[must_use]
pub fn whoami(actor: &AuthenticatedActor) -> WhoAmIResponse {
    WhoAmIResponse {
        user_id: actor.user_id,
        username: actor.username.clone(),
        role: actor.role,
        capabilities: compute_capabilities(actor.role),
    }
}

// ============================================================================
// Work sessions
// ============================================================================

/// Logs a work session for a teacher.
///
/// The task's current hourly rate and price are frozen onto the session.
/// Sessions with known hours, a student and a priced task are billed to the
/// student's bill for the month of creation in `tz`.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `actor` - The authenticated actor performing this action
/// * `request` - The log work request
/// * `tz` - The center's time zone
/// * `now` - The request time
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not log work for this teacher
/// - The entry inputs are invalid
/// - The task, teacher or student does not exist
pub fn log_work(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: LogWorkRequest,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<WorkSessionResponse, ApiError> {
    AuthorizationService::authorize(
        actor,
        Operation::LogWork {
            teacher_id: request.teacher_id,
        },
    )?;

    let draft: NewWorkSession = NewWorkSession {
        teacher_id: request.teacher_id,
        student_id: request.student_id,
        entry: request.entry,
        created_at: request.created_at,
    };
    let logged: LoggedSession = persistence.log_work_session(draft, request.task_id, tz, now)?;

    let message: String = match logged.session.stored_hours() {
        Some(hours) => format!("Logged {hours} hours"),
        None => String::from("Clocked in"),
    };
    Ok(session_response(logged, message))
}

/// Closes an open clock session.
///
/// # Errors
///
/// Returns an error if:
/// - The session does not exist
/// - The actor may not close sessions of the session's teacher
/// - The session is not an open clock session or `clock_out` is not after
///   clock-in
pub fn close_work_session(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: CloseWorkSessionRequest,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<WorkSessionResponse, ApiError> {
    let session: WorkSession = load_work_session(persistence, request.work_session_id)?;
    AuthorizationService::authorize(
        actor,
        Operation::CloseWorkSession {
            teacher_id: session.teacher_id(),
        },
    )?;

    let logged: LoggedSession =
        persistence.close_work_session(request.work_session_id, request.clock_out, tz, now)?;
    let message: String = logged.session.stored_hours().map_or_else(
        || String::from("Closed session"),
        |hours| format!("Closed session with {hours} hours"),
    );
    Ok(session_response(logged, message))
}

/// Soft-deletes a work session.
///
/// # Errors
///
/// Returns an error if the actor is not the owner, the session does not
/// exist or it is already deleted.
pub fn delete_work_session(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    work_session_id: i64,
    now: DateTime<Utc>,
) -> Result<WorkSession, ApiError> {
    AuthorizationService::authorize(actor, Operation::DeleteWorkSession)?;
    Ok(persistence.delete_work_session(work_session_id, now)?)
}

/// Returns one work session.
///
/// # Errors
///
/// Returns an error if the session does not exist or the actor is neither
/// its teacher, its student, nor a reviewer.
pub fn get_work_session(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    work_session_id: i64,
) -> Result<WorkSession, ApiError> {
    let session: WorkSession = load_work_session(persistence, work_session_id)?;
    AuthorizationService::authorize(
        actor,
        Operation::ViewWorkSession {
            teacher_id: session.teacher_id(),
            student_id: session.student_id(),
        },
    )?;
    Ok(session)
}

/// Lists a student's live sessions created in a month.
///
/// # Errors
///
/// Returns an error if the actor may not view the student's sessions, the
/// month is invalid, or the query fails.
pub fn list_student_sessions(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    student_id: i64,
    year: i32,
    month: u32,
    tz: Tz,
) -> Result<ListWorkSessionsResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::ViewStudentSessions { student_id })?;
    let month: BillingMonth = resolve_month(year, month)?;
    let sessions: Vec<WorkSession> =
        persistence.list_student_sessions_for_month(student_id, month, tz)?;
    Ok(ListWorkSessionsResponse { sessions })
}

/// Lists a teacher's live sessions created in a month.
///
/// # Errors
///
/// Returns an error if the actor may not view the teacher's sessions, the
/// month is invalid, or the query fails.
pub fn list_teacher_sessions(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    teacher_id: i64,
    year: i32,
    month: u32,
    tz: Tz,
) -> Result<ListWorkSessionsResponse, ApiError> {
    AuthorizationService::authorize(
        actor,
        Operation::ViewWorkSession {
            teacher_id,
            student_id: None,
        },
    )?;
    let month: BillingMonth = resolve_month(year, month)?;
    let sessions: Vec<WorkSession> =
        persistence.list_teacher_sessions_for_month(teacher_id, month, tz)?;
    Ok(ListWorkSessionsResponse { sessions })
}

// ============================================================================
// Salary reports
// ============================================================================

/// Creates a frozen salary report for one teacher and month.
///
/// The report's interval is the month in `tz`. Its totals are computed
/// once and never change afterwards.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not create salary reports
/// - The month or year is invalid
/// - The teacher does not exist
pub fn create_salary_report(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: CreateSalaryReportRequest,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<SalaryReportResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::CreateSalaryReport)?;
    let month: BillingMonth = resolve_month(request.year, request.month)?;

    let report: SalaryReport = persistence.create_salary_report(
        request.teacher_id,
        month,
        tz,
        Some(actor.user_id),
        request.notes.as_deref().unwrap_or_default(),
        now,
    )?;

    let message: String = format!(
        "Created salary report for teacher {} ({month}): {} hours, {}",
        request.teacher_id, report.total_hours, report.total_amount
    );
    Ok(SalaryReportResponse { report, message })
}

/// Creates the month's salary report for every teacher without a live one.
///
/// # Errors
///
/// Returns an error if the actor may not create salary reports, the month
/// is invalid, or any report cannot be stored (nothing is stored then).
pub fn bulk_create_salary_reports(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: BulkSalaryReportsRequest,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<BulkSalaryReportsResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::BulkCreateSalaryReports)?;
    let month: BillingMonth = resolve_month(request.year, request.month)?;

    let outcomes: Vec<ReportRunOutcome> =
        persistence.bulk_create_salary_reports(month, tz, Some(actor.user_id), now)?;
    let created: usize = outcomes.iter().filter(|o| o.is_created()).count();

    Ok(BulkSalaryReportsResponse {
        month: month.to_string(),
        skipped: outcomes.len() - created,
        created,
        outcomes,
    })
}

/// Soft-deletes a salary report.
///
/// # Errors
///
/// Returns an error if the actor is not the owner or the report does not
/// exist.
pub fn delete_salary_report(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    salary_report_id: i64,
    now: DateTime<Utc>,
) -> Result<SalaryReport, ApiError> {
    AuthorizationService::authorize(actor, Operation::DeleteSalaryReport)?;
    let report: SalaryReport = persistence.delete_salary_report(salary_report_id, now)?;
    info!(
        salary_report_id,
        deleted_by = %actor.username,
        "Deleted salary report"
    );
    Ok(report)
}

/// Returns a salary report with the sessions it covers.
///
/// # Errors
///
/// Returns an error if the report does not exist or the actor may not view
/// its teacher's salary.
pub fn get_salary_report(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    salary_report_id: i64,
) -> Result<SalaryReportDetail, ApiError> {
    let detail: SalaryReportDetail = persistence
        .get_salary_report_detail(salary_report_id)?
        .ok_or_else(|| not_found("Salary report", salary_report_id))?;
    AuthorizationService::authorize(
        actor,
        Operation::ViewSalary {
            teacher_id: detail.report.teacher_id,
        },
    )?;
    Ok(detail)
}

/// Lists a teacher's salary reports, deleted ones included.
///
/// # Errors
///
/// Returns an error if the actor may not view the teacher's salary.
pub fn list_teacher_salary_reports(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    teacher_id: i64,
) -> Result<Vec<SalaryReport>, ApiError> {
    AuthorizationService::authorize(actor, Operation::ViewSalary { teacher_id })?;
    Ok(persistence.list_teacher_salary_reports(teacher_id)?)
}

/// Computes a live, itemized breakdown of a teacher's pay for a month.
///
/// # Errors
///
/// Returns an error if the actor may not view the teacher's salary or the
/// month is invalid.
pub fn salary_breakdown(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    teacher_id: i64,
    year: i32,
    month: u32,
    tz: Tz,
) -> Result<SalaryBreakdown, ApiError> {
    AuthorizationService::authorize(actor, Operation::ViewSalary { teacher_id })?;
    let month: BillingMonth = resolve_month(year, month)?;
    Ok(persistence.salary_breakdown(teacher_id, month, tz)?)
}

// ============================================================================
// Billing
// ============================================================================

/// Adds a service line to a student's monthly bill.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not manage bills
/// - The month is invalid or the quantity is not positive
/// - The student or service does not exist
pub fn charge_service(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: ChargeServiceRequest,
    now: DateTime<Utc>,
) -> Result<BillItemResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::ChargeService)?;
    let month: BillingMonth = resolve_month(request.year, request.month)?;

    let charged: ChargedLine = persistence.charge_service(
        request.student_id,
        request.service_id,
        month,
        request.quantity,
        request.description,
        now,
    )?;
    Ok(BillItemResponse {
        item: charged.item,
        bill_total: charged.bill_total,
    })
}

/// Bills a work session to its student.
///
/// Billing a session that already has a line returns that line.
///
/// # Errors
///
/// Returns an error if the actor may not manage bills or the session does
/// not exist.
pub fn bill_work_session(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    work_session_id: i64,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<BillWorkSessionResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::BillWorkSession)?;
    let bill_item: Option<BillItem> = persistence.bill_work_session(work_session_id, tz, now)?;
    Ok(BillWorkSessionResponse {
        work_session_id,
        bill_item,
    })
}

/// Changes the quantity and/or description of a bill line.
///
/// # Errors
///
/// Returns an error if the actor may not manage bills, the line does not
/// exist or the new quantity is not positive.
pub fn edit_bill_item(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: EditBillItemRequest,
    now: DateTime<Utc>,
) -> Result<BillItemResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::EditBillItem)?;
    if request.quantity.is_none() && request.description.is_none() {
        return Err(ApiError::InvalidInput {
            field: String::from("quantity"),
            message: String::from("Nothing to change: give a quantity or a description"),
        });
    }

    let charged: ChargedLine = persistence.edit_bill_item(
        request.bill_item_id,
        request.quantity,
        request.description,
        now,
    )?;
    Ok(BillItemResponse {
        item: charged.item,
        bill_total: charged.bill_total,
    })
}

/// Deletes a bill line and re-sums its bill.
///
/// # Errors
///
/// Returns an error if the actor may not manage bills or the line does not
/// exist.
pub fn delete_bill_item(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    bill_item_id: i64,
    now: DateTime<Utc>,
) -> Result<DeleteBillItemResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::DeleteBillItem)?;
    let item: BillItem = persistence
        .get_bill_item(bill_item_id)?
        .ok_or_else(|| not_found("Bill item", bill_item_id))?;

    let bill_total: Decimal = persistence.delete_bill_item(bill_item_id, now)?;
    Ok(DeleteBillItemResponse {
        bill_item_id,
        bill_id: item.bill_id,
        bill_total,
    })
}

/// Marks a bill paid at `now`.
///
/// # Errors
///
/// Returns an error if the actor may not manage bills or the bill does not
/// exist.
pub fn mark_bill_paid(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    bill_id: i64,
    now: DateTime<Utc>,
) -> Result<Bill, ApiError> {
    AuthorizationService::authorize(actor, Operation::MarkBillPaid)?;
    Ok(persistence.mark_bill_paid(bill_id, now)?)
}

/// Finds or creates the month's bill for every active student.
///
/// # Errors
///
/// Returns an error if the actor may not open bills or the month is
/// invalid.
pub fn open_bills_for_month(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    year: i32,
    month: u32,
    now: DateTime<Utc>,
) -> Result<OpenBillsResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::OpenMonthlyBills)?;
    let month: BillingMonth = resolve_month(year, month)?;
    let openings: Vec<BillOpening> = persistence.open_bills_for_month(month, now)?;
    Ok(OpenBillsResponse {
        month: month.to_string(),
        openings,
    })
}

/// Returns a bill with its lines and the student's sessions of that month.
///
/// # Errors
///
/// Returns an error if the bill does not exist or the actor may not view
/// the student's bills.
pub fn get_bill_statement(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    bill_id: i64,
    tz: Tz,
) -> Result<BillStatement, ApiError> {
    let bill: Bill = persistence
        .get_bill(bill_id)?
        .ok_or_else(|| not_found("Bill", bill_id))?;
    AuthorizationService::authorize(
        actor,
        Operation::ViewBill {
            student_id: bill.student_id,
        },
    )?;
    persistence
        .bill_statement(bill_id, tz)?
        .ok_or_else(|| not_found("Bill", bill_id))
}

/// Lists a student's bills.
///
/// # Errors
///
/// Returns an error if the actor may not view the student's bills.
pub fn list_student_bills(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    student_id: i64,
) -> Result<ListBillsResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::ViewBill { student_id })?;
    let bills: Vec<Bill> = persistence.list_student_bills(student_id)?;
    Ok(ListBillsResponse { student_id, bills })
}

/// Returns a student's outstanding balance.
///
/// # Errors
///
/// Returns an error if the actor may not view the student's balance or the
/// student does not exist.
pub fn student_balance(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    student_id: i64,
) -> Result<BalanceResponse, ApiError> {
    AuthorizationService::authorize(actor, Operation::ViewBalance { student_id })?;
    if persistence.get_student(student_id)?.is_none() {
        return Err(not_found("Student", student_id));
    }
    let balance: Decimal = persistence.student_balance(student_id)?;
    Ok(BalanceResponse {
        student_id,
        balance,
    })
}

// ============================================================================
// Catalog
// ============================================================================

/// Adds a task template.
///
/// # Errors
///
/// Returns an error if the actor may not manage the catalog or the rate or
/// price is negative.
pub fn create_task(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: CreateTaskRequest,
    now: DateTime<Utc>,
) -> Result<TaskTemplate, ApiError> {
    AuthorizationService::authorize(actor, Operation::ManageCatalog)?;
    let task: TaskTemplate = persistence.create_task(
        &request.name,
        request.description.as_deref(),
        request.hourly_rate,
        request.price,
        now,
    )?;
    Ok(task)
}

/// Changes a task's current rates and returns the updated template.
///
/// Sessions already logged keep the rates they captured.
///
/// # Errors
///
/// Returns an error if the actor may not manage the catalog, the task does
/// not exist, or a value is negative.
pub fn update_task_rates(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: UpdateTaskRatesRequest,
    now: DateTime<Utc>,
) -> Result<TaskTemplate, ApiError> {
    AuthorizationService::authorize(actor, Operation::ManageCatalog)?;
    persistence.update_task_rates(request.task_id, request.hourly_rate, request.price, now)?;
    persistence
        .get_task(request.task_id)?
        .ok_or_else(|| not_found("Task", request.task_id))
}

/// Adds a service template.
///
/// # Errors
///
/// Returns an error if the actor may not manage the catalog or the price is
/// negative.
pub fn create_service(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: CreateServiceRequest,
    now: DateTime<Utc>,
) -> Result<ServiceTemplate, ApiError> {
    AuthorizationService::authorize(actor, Operation::ManageCatalog)?;
    let service: ServiceTemplate = persistence.create_service(
        &request.name,
        request.description.as_deref(),
        request.price,
        now,
    )?;
    Ok(service)
}

// ============================================================================
// Accounts
// ============================================================================

/// Creates a teacher account and profile.
///
/// # Errors
///
/// Returns an error if the actor may not manage accounts or the username
/// is taken.
pub fn register_teacher(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: RegisterAccountRequest,
    now: DateTime<Utc>,
) -> Result<TeacherProfile, ApiError> {
    AuthorizationService::authorize(actor, Operation::ManageAccounts)?;
    let teacher: TeacherProfile = persistence.register_teacher(
        &request.username,
        &request.display_name,
        request.detail.as_deref(),
        now,
    )?;
    Ok(teacher)
}

/// Creates a student account and profile.
///
/// # Errors
///
/// Returns an error if the actor may not manage accounts or the username
/// is taken.
pub fn register_student(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: RegisterAccountRequest,
    now: DateTime<Utc>,
) -> Result<StudentProfile, ApiError> {
    AuthorizationService::authorize(actor, Operation::ManageAccounts)?;
    let student: StudentProfile = persistence.register_student(
        &request.username,
        &request.display_name,
        request.detail.as_deref(),
        now,
    )?;
    Ok(student)
}

/// Marks a student active or inactive. Monthly bill runs skip inactive
/// students.
///
/// # Errors
///
/// Returns an error if the actor may not manage accounts or the student
/// does not exist.
pub fn set_student_active(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    student_id: i64,
    is_active: bool,
) -> Result<StudentProfile, ApiError> {
    AuthorizationService::authorize(actor, Operation::ManageAccounts)?;
    persistence.set_student_active(student_id, is_active)?;
    persistence
        .get_student(student_id)?
        .ok_or_else(|| not_found("Student", student_id))
}

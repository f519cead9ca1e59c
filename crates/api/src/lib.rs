// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the tutoring ledger.
//!
//! Handlers take an [`AuthenticatedActor`], authorize the requested
//! [`Operation`] through [`AuthorizationService`], then delegate to the
//! persistence adapter. Errors from lower layers are translated into
//! [`ApiError`] so no domain or storage error crosses this boundary.

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

mod auth;
mod capabilities;
mod error;
mod handlers;
mod request_response;
mod verification;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Operation, Role};
pub use capabilities::{Capability, RoleCapabilities, compute_capabilities};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    bill_work_session, bulk_create_salary_reports, charge_service, close_work_session,
    create_salary_report, create_service, create_task, delete_bill_item, delete_salary_report,
    delete_work_session, edit_bill_item, get_bill_statement, get_salary_report, get_work_session,
    list_student_bills, list_student_sessions, list_teacher_salary_reports, list_teacher_sessions,
    log_work, mark_bill_paid, open_bills_for_month, register_student, register_teacher,
    salary_breakdown, set_student_active, student_balance, update_task_rates, whoami,
};
pub use request_response::{
    BalanceResponse, BillItemResponse, BillWorkSessionResponse, BulkSalaryReportsRequest,
    BulkSalaryReportsResponse, ChargeServiceRequest, CheckSummary, CloseWorkSessionRequest,
    CreateSalaryReportRequest, CreateServiceRequest, CreateTaskRequest, DeleteBillItemResponse,
    EditBillItemRequest, FindingInfo, ListBillsResponse, ListWorkSessionsResponse, LogWorkRequest,
    OpenBillsResponse, RegisterAccountRequest, SalaryReportResponse, UpdateTaskRatesRequest,
    VerificationResponse, WhoAmIResponse, WorkSessionResponse,
};
pub use verification::{run_checks, run_verification};

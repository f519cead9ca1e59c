// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tutor_ledger_domain::Tz;

use super::helpers::{at, create_manual_request, create_test_seed, dec, setup_test_persistence};
use crate::{
    ApiError, CreateServiceRequest, CreateTaskRequest, LogWorkRequest, RegisterAccountRequest,
    UpdateTaskRatesRequest, create_service, create_task, log_work, register_student,
    register_teacher, set_student_active, update_task_rates,
};

fn create_tutoring_request() -> CreateTaskRequest {
    CreateTaskRequest {
        name: String::from("Exam prep"),
        description: Some(String::from("Two-student group")),
        hourly_rate: dec("18.00"),
        price: dec("25.00"),
    }
}

fn create_account_request(username: &str) -> RegisterAccountRequest {
    RegisterAccountRequest {
        username: username.to_string(),
        display_name: String::from("New Account"),
        detail: None,
    }
}

#[test]
fn test_owner_creates_task() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let task = create_task(
        &mut persistence,
        &seed.owner,
        create_tutoring_request(),
        at(2026, 2, 1, 9, 0),
    )
    .unwrap();

    assert_eq!(task.name, "Exam prep");
    assert_eq!(task.hourly_rate, dec("18.00"));
    assert_eq!(task.price, dec("25.00"));
    assert!(task.is_active);
}

#[test]
fn test_only_owner_manages_catalog() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 2, 1, 9, 0);

    for actor in [&seed.inspector, &seed.teacher, &seed.student] {
        let err = create_task(&mut persistence, actor, create_tutoring_request(), now).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));

        let err = create_service(
            &mut persistence,
            actor,
            CreateServiceRequest {
                name: String::from("Flashcards"),
                description: None,
                price: dec("4.50"),
            },
            now,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { .. }));
    }
}

#[test]
fn test_negative_task_price_is_rejected() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let mut request = create_tutoring_request();
    request.price = dec("-1");

    let err = create_task(&mut persistence, &seed.owner, request, at(2026, 2, 1, 9, 0))
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { .. }));
}

#[test]
fn test_rate_change_applies_to_new_sessions_only() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let before = log_work(
        &mut persistence,
        &seed.teacher,
        create_manual_request(&seed, "2", at(2026, 3, 2, 10, 0)),
        Tz::UTC,
        at(2026, 3, 2, 10, 0),
    )
    .unwrap();

    let task = update_task_rates(
        &mut persistence,
        &seed.owner,
        UpdateTaskRatesRequest {
            task_id: seed.task_id,
            hourly_rate: dec("20.00"),
            price: dec("30.00"),
        },
        at(2026, 3, 3, 9, 0),
    )
    .unwrap();
    let after = log_work(
        &mut persistence,
        &seed.teacher,
        create_manual_request(&seed, "2", at(2026, 3, 4, 10, 0)),
        Tz::UTC,
        at(2026, 3, 4, 10, 0),
    )
    .unwrap();

    assert_eq!(task.price, dec("30.00"));
    assert_eq!(before.session.amounts().total_amount, Some(dec("30.00")));
    assert_eq!(after.session.amounts().total_amount, Some(dec("60.00")));
}

#[test]
fn test_updating_unknown_task_is_not_found() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let err = update_task_rates(
        &mut persistence,
        &seed.owner,
        UpdateTaskRatesRequest {
            task_id: 999,
            hourly_rate: dec("1"),
            price: dec("1"),
        },
        at(2026, 3, 3, 9, 0),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_owner_registers_teacher_who_can_log_work() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 2, 1, 9, 0);

    let teacher = register_teacher(
        &mut persistence,
        &seed.owner,
        RegisterAccountRequest {
            detail: Some(String::from("Physics")),
            ..create_account_request("teacher3")
        },
        now,
    )
    .unwrap();
    let actor = crate::AuthenticationService::resolve_actor(&mut persistence, "teacher3").unwrap();
    let logged = log_work(
        &mut persistence,
        &actor,
        LogWorkRequest {
            teacher_id: teacher.teacher_id,
            ..create_manual_request(&seed, "1", at(2026, 3, 2, 10, 0))
        },
        Tz::UTC,
        at(2026, 3, 2, 10, 0),
    )
    .unwrap();

    assert_eq!(teacher.subjects.as_deref(), Some("Physics"));
    assert_eq!(logged.session.teacher_id(), teacher.teacher_id);
}

#[test]
fn test_inspector_cannot_manage_accounts() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 2, 1, 9, 0);

    let err = register_student(
        &mut persistence,
        &seed.inspector,
        create_account_request("student3"),
        now,
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));

    let err = set_student_active(&mut persistence, &seed.inspector, seed.student_id, false)
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_taken_username_is_an_integrity_violation() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let err = register_student(
        &mut persistence,
        &seed.owner,
        create_account_request("teacher1"),
        at(2026, 2, 1, 9, 0),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::IntegrityViolation { .. }));
}

#[test]
fn test_owner_deactivates_student() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let student = set_student_active(&mut persistence, &seed.owner, seed.student_id, false).unwrap();

    assert_eq!(student.student_id, seed.student_id);
    assert!(!student.is_active);
}

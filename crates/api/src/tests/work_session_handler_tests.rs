// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tutor_ledger_domain::{Tz, WorkEntry};

use super::helpers::{at, create_manual_request, create_test_seed, dec, setup_test_persistence};
use crate::{
    ApiError, CloseWorkSessionRequest, LogWorkRequest, close_work_session, delete_work_session,
    get_work_session, list_student_sessions, list_teacher_sessions, log_work,
};

#[test]
fn test_teacher_logs_own_manual_session() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 3, 2, 10, 0);

    let response = log_work(
        &mut persistence,
        &seed.teacher,
        create_manual_request(&seed, "2.00", now),
        Tz::UTC,
        now,
    )
    .unwrap();

    assert_eq!(response.session.stored_hours(), Some(dec("2.00")));
    assert_eq!(response.session.amounts().total_amount, Some(dec("30.00")));
    assert_eq!(
        response.session.amounts().teacher_payment_amount,
        Some(dec("30.00"))
    );
    assert_eq!(response.bill_item.unwrap().line.amount(), dec("30.00"));
}

#[test]
fn test_teacher_cannot_log_for_another_teacher() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 3, 2, 10, 0);
    let mut request = create_manual_request(&seed, "2.00", now);
    request.teacher_id = seed.other_teacher_id;

    let err = log_work(&mut persistence, &seed.teacher, request, Tz::UTC, now).unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert!(persistence.list_work_sessions().unwrap().is_empty());
}

#[test]
fn test_inspector_cannot_log_work() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 3, 2, 10, 0);

    let err = log_work(
        &mut persistence,
        &seed.inspector,
        create_manual_request(&seed, "1.00", now),
        Tz::UTC,
        now,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_negative_manual_hours_map_to_invalid_input() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 3, 2, 10, 0);

    let err = log_work(
        &mut persistence,
        &seed.teacher,
        create_manual_request(&seed, "-1.00", now),
        Tz::UTC,
        now,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "manual_hours"));
    assert!(persistence.list_work_sessions().unwrap().is_empty());
}

#[test]
fn test_unknown_task_maps_to_not_found() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 3, 2, 10, 0);
    let mut request = create_manual_request(&seed, "1.00", now);
    request.task_id = 999;

    let err = log_work(&mut persistence, &seed.teacher, request, Tz::UTC, now).unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_clock_session_is_closed_by_its_teacher() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let clock_in = at(2026, 3, 5, 14, 0);
    let request = LogWorkRequest {
        teacher_id: seed.teacher_id,
        task_id: seed.task_id,
        student_id: Some(seed.student_id),
        entry: WorkEntry::clock_in(clock_in),
        created_at: Some(clock_in),
    };
    let opened = log_work(&mut persistence, &seed.teacher, request, Tz::UTC, clock_in).unwrap();
    assert_eq!(opened.message, "Clocked in");
    assert!(opened.bill_item.is_none());
    let work_session_id = opened.session.work_session_id().unwrap();

    let close = CloseWorkSessionRequest {
        work_session_id,
        clock_out: at(2026, 3, 5, 15, 30),
    };
    let denied = close_work_session(
        &mut persistence,
        &seed.other_teacher,
        close,
        Tz::UTC,
        at(2026, 3, 5, 15, 30),
    )
    .unwrap_err();
    assert!(matches!(denied, ApiError::Unauthorized { .. }));

    let closed = close_work_session(
        &mut persistence,
        &seed.teacher,
        close,
        Tz::UTC,
        at(2026, 3, 5, 15, 30),
    )
    .unwrap();
    assert_eq!(closed.session.stored_hours(), Some(dec("2")));
    assert!(closed.bill_item.is_some());

    let again = close_work_session(
        &mut persistence,
        &seed.teacher,
        close,
        Tz::UTC,
        at(2026, 3, 5, 16, 0),
    )
    .unwrap_err();
    assert!(matches!(again, ApiError::DomainRuleViolation { .. }));
}

#[test]
fn test_closing_unknown_session_is_not_found() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let close = CloseWorkSessionRequest {
        work_session_id: 42,
        clock_out: at(2026, 3, 5, 15, 30),
    };

    let err = close_work_session(
        &mut persistence,
        &seed.owner,
        close,
        Tz::UTC,
        at(2026, 3, 5, 15, 30),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_only_owner_deletes_sessions() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 3, 2, 10, 0);
    let logged = log_work(
        &mut persistence,
        &seed.teacher,
        create_manual_request(&seed, "1.00", now),
        Tz::UTC,
        now,
    )
    .unwrap();
    let id = logged.session.work_session_id().unwrap();

    let denied = delete_work_session(&mut persistence, &seed.teacher, id, now).unwrap_err();
    assert!(matches!(denied, ApiError::Unauthorized { .. }));

    let deleted = delete_work_session(&mut persistence, &seed.owner, id, now).unwrap();
    assert!(deleted.is_deleted());
    assert_eq!(deleted.stored_hours(), Some(dec("1.00")));
}

#[test]
fn test_session_visibility_follows_ownership() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 3, 2, 10, 0);
    let logged = log_work(
        &mut persistence,
        &seed.teacher,
        create_manual_request(&seed, "1.00", now),
        Tz::UTC,
        now,
    )
    .unwrap();
    let id = logged.session.work_session_id().unwrap();

    assert!(get_work_session(&mut persistence, &seed.teacher, id).is_ok());
    assert!(get_work_session(&mut persistence, &seed.student, id).is_ok());
    assert!(get_work_session(&mut persistence, &seed.inspector, id).is_ok());
    assert!(matches!(
        get_work_session(&mut persistence, &seed.other_teacher, id),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        get_work_session(&mut persistence, &seed.other_student, id),
        Err(ApiError::Unauthorized { .. })
    ));
}

#[test]
fn test_month_listings_are_scoped_and_authorized() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    for (day, hours) in [(2, "1.00"), (9, "2.00")] {
        let now = at(2026, 3, day, 10, 0);
        log_work(
            &mut persistence,
            &seed.teacher,
            create_manual_request(&seed, hours, now),
            Tz::UTC,
            now,
        )
        .unwrap();
    }
    let april = at(2026, 4, 1, 10, 0);
    log_work(
        &mut persistence,
        &seed.teacher,
        create_manual_request(&seed, "3.00", april),
        Tz::UTC,
        april,
    )
    .unwrap();

    let student_view = list_student_sessions(
        &mut persistence,
        &seed.student,
        seed.student_id,
        2026,
        3,
        Tz::UTC,
    )
    .unwrap();
    assert_eq!(student_view.sessions.len(), 2);

    let teacher_view = list_teacher_sessions(
        &mut persistence,
        &seed.teacher,
        seed.teacher_id,
        2026,
        4,
        Tz::UTC,
    )
    .unwrap();
    assert_eq!(teacher_view.sessions.len(), 1);

    let denied = list_student_sessions(
        &mut persistence,
        &seed.other_student,
        seed.student_id,
        2026,
        3,
        Tz::UTC,
    )
    .unwrap_err();
    assert!(matches!(denied, ApiError::Unauthorized { .. }));
}

#[test]
fn test_invalid_month_is_rejected() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let err = list_teacher_sessions(
        &mut persistence,
        &seed.owner,
        seed.teacher_id,
        2026,
        13,
        Tz::UTC,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "month"));
}

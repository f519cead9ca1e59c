// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tutor_ledger_domain::{DomainError, NewWorkSession, Tz, WorkEntry};

use super::{
    at, create_test_draft, create_test_fixture, create_test_persistence, dec, march_2026,
};
use crate::{BillOpening, PersistenceError};

#[test]
fn test_zero_priced_line_does_not_count_toward_total() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let now = at(2026, 3, 10, 9, 0);
    let paid = persistence
        .create_service("Workbook", None, dec("21.00"), now)
        .unwrap();
    let free = persistence
        .create_service("Trial", None, dec("0"), now)
        .unwrap();

    persistence
        .charge_service(fixture.student_id, paid.service_id, march_2026(), dec("1"), None, now)
        .unwrap();
    let charged = persistence
        .charge_service(fixture.student_id, free.service_id, march_2026(), dec("1"), None, now)
        .unwrap();

    assert_eq!(charged.bill_total, dec("21.00"));
    assert_eq!(persistence.list_bills().unwrap().len(), 1);
    assert_eq!(
        persistence
            .list_bill_items(charged.item.bill_id)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn test_service_line_keeps_its_price_after_catalog_change() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let now = at(2026, 3, 10, 9, 0);
    let service = persistence
        .create_service("Workbook", Some("Printed"), dec("10.00"), now)
        .unwrap();
    let charged = persistence
        .charge_service(
            fixture.student_id,
            service.service_id,
            march_2026(),
            dec("2"),
            Some(String::from("Two copies")),
            now,
        )
        .unwrap();

    persistence
        .update_service_price(service.service_id, dec("12.00"), now)
        .unwrap();

    let item = persistence
        .get_bill_item(charged.item.bill_item_id)
        .unwrap()
        .unwrap();
    assert_eq!(item.line.price_at_billing(), dec("10.00"));
    assert_eq!(item.line.amount(), dec("20.00"));
    assert_eq!(item.line.service_description(), Some("Two copies"));
}

#[test]
fn test_non_positive_quantity_is_rejected() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let now = at(2026, 3, 10, 9, 0);
    let service = persistence
        .create_service("Workbook", None, dec("10.00"), now)
        .unwrap();

    let err = persistence
        .charge_service(fixture.student_id, service.service_id, march_2026(), dec("0"), None, now)
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Rejected(DomainError::NonPositiveQuantity { .. })
    ));
    assert!(persistence.list_bills().unwrap().is_empty());
}

#[test]
fn test_negative_service_price_is_rejected() {
    let mut persistence = create_test_persistence();

    let err = persistence
        .create_service("Credit", None, dec("-5.00"), at(2026, 3, 1, 0, 0))
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Rejected(DomainError::NegativePrice { .. })
    ));
}

#[test]
fn test_edit_and_delete_resum_the_bill() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let now = at(2026, 3, 10, 9, 0);
    let service = persistence
        .create_service("Workbook", None, dec("10.00"), now)
        .unwrap();
    let first = persistence
        .charge_service(fixture.student_id, service.service_id, march_2026(), dec("1"), None, now)
        .unwrap();
    let second = persistence
        .charge_service(fixture.student_id, service.service_id, march_2026(), dec("1"), None, now)
        .unwrap();
    assert_eq!(second.bill_total, dec("20.00"));

    let edited = persistence
        .edit_bill_item(first.item.bill_item_id, Some(dec("3")), None, now)
        .unwrap();
    assert_eq!(edited.item.line.amount(), dec("30.00"));
    assert_eq!(edited.bill_total, dec("40.00"));

    let total = persistence
        .delete_bill_item(second.item.bill_item_id, now)
        .unwrap();
    assert_eq!(total, dec("30.00"));

    let bill = persistence.get_bill(first.item.bill_id).unwrap().unwrap();
    assert_eq!(bill.total_amount, Some(dec("30.00")));
}

#[test]
fn test_billing_a_session_twice_returns_the_same_line() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = create_test_draft(&fixture, WorkEntry::manual(dec("2.00")), at(2026, 3, 2, 9, 0));
    let logged = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, 2, 9, 0))
        .unwrap();
    let id = logged.session.work_session_id().unwrap();

    let again = persistence
        .bill_work_session(id, Tz::UTC, at(2026, 3, 3, 0, 0))
        .unwrap();

    assert_eq!(again, logged.bill_item);
    assert_eq!(persistence.list_all_bill_items().unwrap().len(), 1);
}

#[test]
fn test_free_task_session_produces_no_line() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let free = persistence
        .create_task("Internal", None, dec("15.00"), dec("0"), at(2026, 1, 1, 0, 0))
        .unwrap();
    let draft = create_test_draft(&fixture, WorkEntry::manual(dec("2.00")), at(2026, 3, 2, 9, 0));

    let logged = persistence
        .log_work_session(draft, free.task_id, Tz::UTC, at(2026, 3, 2, 9, 0))
        .unwrap();

    assert!(logged.bill_item.is_none());
    assert_eq!(logged.session.amounts().total_amount, Some(dec("0")));
    assert!(persistence.list_bills().unwrap().is_empty());
}

#[test]
fn test_session_without_student_produces_no_line() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = NewWorkSession {
        teacher_id: fixture.teacher_id,
        student_id: None,
        entry: WorkEntry::manual(dec("2.00")),
        created_at: Some(at(2026, 3, 2, 9, 0)),
    };

    let logged = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, 2, 9, 0))
        .unwrap();

    assert!(logged.bill_item.is_none());
    assert!(persistence.list_bills().unwrap().is_empty());
}

#[test]
fn test_one_bill_per_student_and_month() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    for day in [2, 9, 16] {
        let draft =
            create_test_draft(&fixture, WorkEntry::manual(dec("1.00")), at(2026, 3, day, 9, 0));
        persistence
            .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, day, 9, 0))
            .unwrap();
    }

    let bills = persistence.list_student_bills(fixture.student_id).unwrap();

    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].total_amount, Some(dec("45.00")));
}

#[test]
fn test_session_is_billed_to_its_local_month() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    // Still March 31 in New York.
    let created_at = at(2026, 4, 1, 2, 0);
    let draft = create_test_draft(&fixture, WorkEntry::manual(dec("1.00")), created_at);

    persistence
        .log_work_session(draft, fixture.task_id, Tz::America__New_York, created_at)
        .unwrap();

    let bills = persistence.list_student_bills(fixture.student_id).unwrap();
    assert_eq!(bills[0].month, march_2026());
}

#[test]
fn test_mark_paid_and_balance() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let now = at(2026, 3, 10, 9, 0);
    let service = persistence
        .create_service("Workbook", None, dec("10.00"), now)
        .unwrap();
    let march = persistence
        .charge_service(fixture.student_id, service.service_id, march_2026(), dec("1"), None, now)
        .unwrap();
    let april = tutor_ledger_domain::BillingMonth::new(2026, 4).unwrap();
    persistence
        .charge_service(fixture.student_id, service.service_id, april, dec("2"), None, now)
        .unwrap();
    assert_eq!(
        persistence.student_balance(fixture.student_id).unwrap(),
        dec("30.00")
    );

    let bill = persistence
        .mark_bill_paid(march.item.bill_id, at(2026, 4, 5, 12, 0))
        .unwrap();

    assert!(bill.is_paid);
    assert_eq!(bill.payment_date, Some(at(2026, 4, 5, 12, 0)));
    assert_eq!(
        persistence.student_balance(fixture.student_id).unwrap(),
        dec("20.00")
    );
}

#[test]
fn test_open_bills_for_month_skips_inactive_students() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let inactive = persistence
        .register_student("student2", "Student Two", None, at(2026, 1, 1, 0, 0))
        .unwrap();
    persistence
        .set_student_active(inactive.student_id, false)
        .unwrap();
    let now = at(2026, 3, 1, 0, 0);

    let first = persistence.open_bills_for_month(march_2026(), now).unwrap();
    let second = persistence.open_bills_for_month(march_2026(), now).unwrap();

    assert_eq!(first.len(), 1);
    assert!(matches!(first[0], BillOpening::Created { .. }));
    assert!(matches!(second[0], BillOpening::Existing { .. }));
    assert_eq!(first[0].bill().student_id, fixture.student_id);
    assert_eq!(first[0].bill().total_amount, Some(dec("0")));
}

#[test]
fn test_statement_lists_month_sessions() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = create_test_draft(&fixture, WorkEntry::manual(dec("2.00")), at(2026, 3, 2, 9, 0));
    let logged = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, 2, 9, 0))
        .unwrap();
    let bill_id = logged.bill_item.unwrap().bill_id;

    let statement = persistence
        .bill_statement(bill_id, Tz::UTC)
        .unwrap()
        .unwrap();

    assert_eq!(statement.items.len(), 1);
    assert_eq!(statement.sessions.len(), 1);
    assert_eq!(statement.total_hours, dec("2.00"));
    assert_eq!(statement.session_amount_total, dec("30.00"));
    assert!(persistence.bill_statement(999, Tz::UTC).unwrap().is_none());
}

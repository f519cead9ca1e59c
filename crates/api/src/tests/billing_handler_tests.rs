// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tutor_ledger_domain::Tz;
use tutor_ledger_persistence::{BillOpening, SqlitePersistence};

use super::helpers::{
    Seeded, at, create_manual_request, create_test_seed, dec, setup_test_persistence,
};
use crate::{
    ApiError, BillItemResponse, ChargeServiceRequest, EditBillItemRequest, bill_work_session,
    charge_service, delete_bill_item, edit_bill_item, get_bill_statement, list_student_bills,
    log_work, mark_bill_paid, open_bills_for_month, student_balance,
};

fn charge_workbook(
    persistence: &mut SqlitePersistence,
    seed: &Seeded,
    quantity: &str,
) -> Result<BillItemResponse, ApiError> {
    charge_service(
        persistence,
        &seed.owner,
        ChargeServiceRequest {
            student_id: seed.student_id,
            service_id: seed.service_id,
            year: 2026,
            month: 3,
            quantity: dec(quantity),
            description: None,
        },
        at(2026, 3, 10, 9, 0),
    )
}

#[test]
fn test_owner_charges_service_to_monthly_bill() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let response = charge_workbook(&mut persistence, &seed, "1").unwrap();

    assert_eq!(response.item.line.amount(), dec("21.00"));
    assert_eq!(response.item.line.service_name(), "Workbook");
    assert_eq!(response.bill_total, dec("21.00"));
}

#[test]
fn test_inspector_cannot_charge_services() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let err = charge_service(
        &mut persistence,
        &seed.inspector,
        ChargeServiceRequest {
            student_id: seed.student_id,
            service_id: seed.service_id,
            year: 2026,
            month: 3,
            quantity: dec("1"),
            description: None,
        },
        at(2026, 3, 10, 9, 0),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert!(persistence.list_bills().unwrap().is_empty());
}

#[test]
fn test_zero_quantity_is_invalid_input() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let err = charge_workbook(&mut persistence, &seed, "0").unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "quantity"));
}

#[test]
fn test_edit_and_delete_keep_total_in_step() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let first = charge_workbook(&mut persistence, &seed, "1").unwrap();
    let second = charge_workbook(&mut persistence, &seed, "1").unwrap();
    let now = at(2026, 3, 11, 9, 0);

    let edited = edit_bill_item(
        &mut persistence,
        &seed.owner,
        EditBillItemRequest {
            bill_item_id: first.item.bill_item_id,
            quantity: Some(dec("2")),
            description: Some(String::from("Two workbooks")),
        },
        now,
    )
    .unwrap();
    assert_eq!(edited.bill_total, dec("63.00"));
    assert_eq!(edited.item.line.service_description(), Some("Two workbooks"));

    let deleted =
        delete_bill_item(&mut persistence, &seed.owner, second.item.bill_item_id, now).unwrap();
    assert_eq!(deleted.bill_id, first.item.bill_id);
    assert_eq!(deleted.bill_total, dec("42.00"));
}

#[test]
fn test_edit_without_changes_is_rejected() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let charged = charge_workbook(&mut persistence, &seed, "1").unwrap();

    let err = edit_bill_item(
        &mut persistence,
        &seed.owner,
        EditBillItemRequest {
            bill_item_id: charged.item.bill_item_id,
            quantity: None,
            description: None,
        },
        at(2026, 3, 11, 9, 0),
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { .. }));
}

#[test]
fn test_deleting_unknown_item_is_not_found() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let err = delete_bill_item(&mut persistence, &seed.owner, 77, at(2026, 3, 11, 9, 0))
        .unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_billing_a_logged_session_returns_its_existing_line() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 3, 2, 10, 0);
    let logged = log_work(
        &mut persistence,
        &seed.teacher,
        create_manual_request(&seed, "2.00", now),
        Tz::UTC,
        now,
    )
    .unwrap();
    let id = logged.session.work_session_id().unwrap();

    let response = bill_work_session(&mut persistence, &seed.owner, id, Tz::UTC, now).unwrap();

    assert_eq!(response.bill_item, logged.bill_item);
    assert!(matches!(
        bill_work_session(&mut persistence, &seed.teacher, id, Tz::UTC, now),
        Err(ApiError::Unauthorized { .. })
    ));
}

#[test]
fn test_student_sees_own_statement_and_balance() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let now = at(2026, 3, 2, 10, 0);
    log_work(
        &mut persistence,
        &seed.teacher,
        create_manual_request(&seed, "2.00", now),
        Tz::UTC,
        now,
    )
    .unwrap();
    let charged = charge_workbook(&mut persistence, &seed, "1").unwrap();
    let bill_id = charged.item.bill_id;

    let statement = get_bill_statement(&mut persistence, &seed.student, bill_id, Tz::UTC).unwrap();
    assert_eq!(statement.items.len(), 2);
    assert_eq!(statement.bill.total_amount, Some(dec("51.00")));
    assert_eq!(statement.total_hours, dec("2.00"));

    let balance = student_balance(&mut persistence, &seed.student, seed.student_id).unwrap();
    assert_eq!(balance.balance, dec("51.00"));

    assert!(matches!(
        get_bill_statement(&mut persistence, &seed.other_student, bill_id, Tz::UTC),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        student_balance(&mut persistence, &seed.other_student, seed.student_id),
        Err(ApiError::Unauthorized { .. })
    ));
}

#[test]
fn test_paid_bill_leaves_the_balance() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    let charged = charge_workbook(&mut persistence, &seed, "1").unwrap();
    let paid_at = at(2026, 4, 3, 12, 0);

    let denied =
        mark_bill_paid(&mut persistence, &seed.student, charged.item.bill_id, paid_at).unwrap_err();
    assert!(matches!(denied, ApiError::Unauthorized { .. }));

    let bill = mark_bill_paid(&mut persistence, &seed.owner, charged.item.bill_id, paid_at).unwrap();
    assert!(bill.is_paid);
    assert_eq!(bill.payment_date, Some(paid_at));

    let balance = student_balance(&mut persistence, &seed.owner, seed.student_id).unwrap();
    assert_eq!(balance.balance, dec("0"));
    let bills = list_student_bills(&mut persistence, &seed.student, seed.student_id).unwrap();
    assert_eq!(bills.bills.len(), 1);
}

#[test]
fn test_balance_of_unknown_student_is_not_found() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);

    let err = student_balance(&mut persistence, &seed.owner, 999).unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_open_month_creates_one_bill_per_active_student() {
    let mut persistence = setup_test_persistence();
    let seed = create_test_seed(&mut persistence);
    charge_workbook(&mut persistence, &seed, "1").unwrap();

    let response =
        open_bills_for_month(&mut persistence, &seed.owner, 2026, 3, at(2026, 3, 1, 0, 0))
            .unwrap();

    assert_eq!(response.month, "2026-03");
    assert_eq!(response.openings.len(), 2);
    let existing = response
        .openings
        .iter()
        .filter(|o| matches!(o, BillOpening::Existing { .. }))
        .count();
    assert_eq!(existing, 1);
    assert_eq!(persistence.list_bills().unwrap().len(), 2);
}

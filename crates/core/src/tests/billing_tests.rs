// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{at, create_test_bill, create_test_item, dec};
use crate::{billable_total, outstanding_balance};

#[test]
fn test_billable_total_skips_free_lines() {
    let items = [
        create_test_item(1, 1, "21.00", "1", "21.00"),
        create_test_item(2, 1, "0", "1", "0"),
    ];

    let total = billable_total(items.iter().map(|item| &item.line));

    assert_eq!(total, dec("21.00"));
}

#[test]
fn test_billable_total_of_no_lines_is_zero() {
    assert_eq!(billable_total(std::iter::empty()), dec("0"));
}

#[test]
fn test_outstanding_balance_sums_unpaid_bills() {
    let unpaid = create_test_bill(1, 3, Some("40.00"));
    let mut paid = create_test_bill(2, 3, Some("25.00"));
    paid.is_paid = true;
    paid.payment_date = Some(at(2026, 3, 28, 12, 0));
    let untotalled = create_test_bill(3, 3, None);

    let balance = outstanding_balance([&unpaid, &paid, &untotalled]);

    assert_eq!(balance, dec("40.00"));
}

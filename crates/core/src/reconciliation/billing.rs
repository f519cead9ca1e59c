// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tutor_ledger_domain::{Bill, BillItem, BillingMonth, StudentProfile};

use super::{CheckKind, Finding, VerificationReport};
use crate::billing::billable_total;

/// Checks bill totals, line arithmetic, payment flags and uniqueness.
///
/// Active students that have never been billed are reported as warnings.
#[must_use]
pub fn check_bills(
    bills: &[Bill],
    items: &[BillItem],
    students: &[StudentProfile],
) -> VerificationReport {
    let mut report: VerificationReport = VerificationReport::new(CheckKind::Billing);

    let mut items_by_bill: BTreeMap<i64, Vec<&BillItem>> = BTreeMap::new();
    for item in items {
        items_by_bill.entry(item.bill_id).or_default().push(item);
    }

    let mut bills_by_key: BTreeMap<(i64, BillingMonth), Vec<i64>> = BTreeMap::new();
    let mut billed_students: BTreeSet<i64> = BTreeSet::new();

    for bill in bills {
        report.examined += 1;
        bills_by_key
            .entry((bill.student_id, bill.month))
            .or_default()
            .push(bill.bill_id);
        billed_students.insert(bill.student_id);

        let bill_items: &[&BillItem] = items_by_bill
            .get(&bill.bill_id)
            .map_or(&[][..], Vec::as_slice);

        if bill_items.is_empty() {
            report.push(Finding::EmptyBill {
                bill_id: bill.bill_id,
            });
        }

        for item in bill_items {
            let expected: Option<Decimal> = item.line.expected_amount();
            if Some(item.line.amount()) != expected {
                report.push(Finding::BillItemAmountMismatch {
                    bill_id: bill.bill_id,
                    bill_item_id: item.bill_item_id,
                    stored: item.line.amount(),
                    expected,
                });
            }
        }

        let expected_total: Decimal =
            billable_total(bill_items.iter().map(|item| &item.line));
        if bill.total_amount != Some(expected_total) {
            report.push(Finding::BillTotalMismatch {
                bill_id: bill.bill_id,
                stored: bill.total_amount,
                expected: expected_total,
            });
        }

        if bill.is_paid && bill.payment_date.is_none() {
            report.push(Finding::PaidWithoutPaymentDate {
                bill_id: bill.bill_id,
            });
        }
    }

    for ((student_id, month), bill_ids) in bills_by_key {
        if bill_ids.len() > 1 {
            report.push(Finding::DuplicateBill {
                student_id,
                month,
                bill_ids,
            });
        }
    }

    for student in students.iter().filter(|s| s.is_active) {
        if !billed_students.contains(&student.student_id) {
            report.push(Finding::StudentWithoutBill {
                student_id: student.student_id,
            });
        }
    }

    report
}

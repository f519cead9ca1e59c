// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bill totals.
//!
//! There is one total rule, used when writing a bill and when verifying
//! it: the sum of line amounts over lines that are billable (positive
//! frozen price and positive amount).

use rust_decimal::Decimal;
use tutor_ledger_domain::{Bill, BillLine};

/// Sums the billable lines of a bill.
#[must_use]
pub fn billable_total<'a, I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = &'a BillLine>,
{
    lines
        .into_iter()
        .filter(|line| line.is_billable())
        .map(BillLine::amount)
        .sum()
}

/// Sums the totals of unpaid bills.
#[must_use]
pub fn outstanding_balance<'a, I>(bills: I) -> Decimal
where
    I: IntoIterator<Item = &'a Bill>,
{
    bills
        .into_iter()
        .filter(|bill| !bill.is_paid)
        .filter_map(|bill| bill.total_amount)
        .sum()
}

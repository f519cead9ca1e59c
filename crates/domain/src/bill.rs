// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{customer_amount, priced_amount};
use crate::error::DomainError;
use crate::period::BillingMonth;
use crate::templates::ServicePriceSnapshot;
use crate::work_session::WorkSession;

/// A student's bill for one month.
///
/// The total is live: it is re-summed from the bill's items after every
/// item change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub bill_id: i64,
    pub student_id: i64,
    pub month: BillingMonth,
    /// `None` only for rows that never had a total written.
    pub total_amount: Option<Decimal>,
    pub is_paid: bool,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One frozen line of a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillLine {
    service_name: String,
    service_description: Option<String>,
    price_at_billing: Decimal,
    quantity: Decimal,
    amount: Decimal,
    work_session_id: Option<i64>,
}

impl BillLine {
    /// Builds a line from a captured service price.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is not positive, the price is
    /// negative or the amount overflows.
    pub fn from_service(
        snapshot: &ServicePriceSnapshot,
        quantity: Decimal,
    ) -> Result<Self, DomainError> {
        validate_quantity(quantity)?;
        let price: Decimal = snapshot.price();
        if price < Decimal::ZERO {
            return Err(DomainError::NegativePrice { price });
        }

        Ok(Self {
            service_name: snapshot.name().to_string(),
            service_description: snapshot.description().map(str::to_string),
            price_at_billing: price,
            quantity,
            amount: priced_amount(quantity, price)?,
            work_session_id: None,
        })
    }

    /// Builds the line billing a closed work session to its student.
    ///
    /// Uses the session's frozen hours and price; the task name and
    /// description label the line.
    ///
    /// # Returns
    ///
    /// `None` when the session has no student, is deleted, has no hours
    /// or price yet, or would be charged nothing.
    #[must_use]
    pub fn from_work_session(
        session: &WorkSession,
        task_name: &str,
        task_description: Option<&str>,
    ) -> Option<Self> {
        session.student_id()?;
        if session.is_deleted() {
            return None;
        }
        let hours: Decimal = session.stored_hours()?;
        let price: Decimal = session.rates().price()?;
        if hours <= Decimal::ZERO {
            return None;
        }

        let amount: Decimal = customer_amount(hours, price).ok()?;
        if amount.is_zero() {
            return None;
        }

        Some(Self {
            service_name: task_name.to_string(),
            service_description: task_description.map(str::to_string),
            price_at_billing: price,
            quantity: hours,
            amount,
            work_session_id: session.work_session_id(),
        })
    }

    /// Rehydrates a stored line without recomputing anything.
    #[must_use]
    pub const fn from_stored(
        service_name: String,
        service_description: Option<String>,
        price_at_billing: Decimal,
        quantity: Decimal,
        amount: Decimal,
        work_session_id: Option<i64>,
    ) -> Self {
        Self {
            service_name,
            service_description,
            price_at_billing,
            quantity,
            amount,
            work_session_id,
        }
    }

    /// Returns a copy with a new quantity, priced at the frozen price.
    ///
    /// # Errors
    ///
    /// Returns an error if the quantity is not positive or the amount
    /// overflows.
    pub fn with_quantity(&self, quantity: Decimal) -> Result<Self, DomainError> {
        validate_quantity(quantity)?;
        Ok(Self {
            quantity,
            amount: priced_amount(quantity, self.price_at_billing)?,
            ..self.clone()
        })
    }

    /// Returns a copy with a new description.
    #[must_use]
    pub fn with_description(&self, description: Option<String>) -> Self {
        Self {
            service_description: description,
            ..self.clone()
        }
    }

    /// Whether the line counts toward the bill total.
    #[must_use]
    pub fn is_billable(&self) -> bool {
        self.price_at_billing > Decimal::ZERO && self.amount > Decimal::ZERO
    }

    /// The amount this line should carry given its frozen price and
    /// quantity. `None` if that product overflows.
    #[must_use]
    pub fn expected_amount(&self) -> Option<Decimal> {
        priced_amount(self.quantity, self.price_at_billing).ok()
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    #[must_use]
    pub fn service_description(&self) -> Option<&str> {
        self.service_description.as_deref()
    }

    #[must_use]
    pub const fn price_at_billing(&self) -> Decimal {
        self.price_at_billing
    }

    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.quantity
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    #[must_use]
    pub const fn work_session_id(&self) -> Option<i64> {
        self.work_session_id
    }
}

/// A persisted bill line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillItem {
    pub bill_item_id: i64,
    pub bill_id: i64,
    pub line: BillLine,
}

fn validate_quantity(quantity: Decimal) -> Result<(), DomainError> {
    if quantity <= Decimal::ZERO {
        return Err(DomainError::NonPositiveQuantity { quantity });
    }
    Ok(())
}

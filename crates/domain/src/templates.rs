// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live catalog templates and the frozen snapshots taken from them.
//!
//! A template's current values are read at exactly one moment: when a
//! snapshot is captured. Everything downstream (amount calculation,
//! aggregation, verification) works from the snapshot, so later edits to
//! a task or service never reach historical records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A task as currently configured in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub task_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// What the teacher earns per hour.
    pub hourly_rate: Decimal,
    /// What the student is charged per hour. Zero marks a free task.
    pub price: Decimal,
    pub is_active: bool,
}

impl TaskTemplate {
    /// Captures the current rate and price.
    #[must_use]
    pub const fn capture(&self) -> RateSnapshot {
        RateSnapshot {
            hourly_rate: Some(self.hourly_rate),
            price: Some(self.price),
        }
    }

    /// Returns `true` when students are not charged for this task.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }
}

/// Rates frozen onto a work session at creation time.
///
/// Both fields are optional only so that rows written before a snapshot
/// existed can be loaded and flagged by verification. A freshly captured
/// snapshot always carries both values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RateSnapshot {
    hourly_rate: Option<Decimal>,
    price: Option<Decimal>,
}

impl RateSnapshot {
    /// Rehydrates a snapshot from stored values.
    ///
    /// This is not a capture: it restores what was frozen earlier.
    #[must_use]
    pub const fn from_stored(hourly_rate: Option<Decimal>, price: Option<Decimal>) -> Self {
        Self { hourly_rate, price }
    }

    #[must_use]
    pub const fn hourly_rate(&self) -> Option<Decimal> {
        self.hourly_rate
    }

    #[must_use]
    pub const fn price(&self) -> Option<Decimal> {
        self.price
    }
}

/// A one-off billable service as currently configured in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTemplate {
    pub service_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub is_active: bool,
}

impl ServiceTemplate {
    /// Captures name, description and price for a bill line.
    ///
    /// # Arguments
    ///
    /// * `description_override` - Replaces the catalog description when present
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog price is negative.
    pub fn capture(
        &self,
        description_override: Option<String>,
    ) -> Result<ServicePriceSnapshot, DomainError> {
        if self.price < Decimal::ZERO {
            return Err(DomainError::NegativePrice { price: self.price });
        }
        Ok(ServicePriceSnapshot {
            name: self.name.clone(),
            description: description_override.or_else(|| self.description.clone()),
            price: self.price,
        })
    }
}

/// Service details frozen onto a bill line at billing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePriceSnapshot {
    name: String,
    description: Option<String>,
    price: Decimal,
}

impl ServicePriceSnapshot {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }
}

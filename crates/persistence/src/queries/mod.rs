// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `accounts`: users and role profiles
//! - `catalog`: task and service templates
//! - `work_sessions`: sessions by id, teacher or student interval
//! - `salary_reports`: frozen salary reports
//! - `billing`: bills and bill items
//! - `integrity`: structural facts for the integrity check
//! - `scan`: whole-table reads that set unreadable rows aside
//!
//! Single-row lookups return `Ok(None)` when the row does not exist.

pub mod accounts;
pub mod billing;
pub mod catalog;
pub mod integrity;
pub mod salary_reports;
pub mod scan;
pub mod work_sessions;

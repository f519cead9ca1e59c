// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Each function performs one step on an open connection and does not
//! manage transactions. The `Persistence` adapter composes steps inside
//! immediate transactions so that read-modify-write sequences are
//! serialized and roll back as a unit.
//!
//! ## Module Organization
//!
//! - `accounts`: users and role profiles
//! - `catalog`: task and service templates
//! - `work_sessions`: inserting and rewriting sessions
//! - `salary_reports`: frozen report inserts and soft deletes
//! - `billing`: bills, items and total re-summing

pub mod accounts;
pub mod billing;
pub mod catalog;
pub mod salary_reports;
pub mod work_sessions;

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Structural facts for the integrity check.
//!
//! Foreign keys are enforced on connections opened by this crate, but a
//! database may have been written by other tools with enforcement off.
//! References are therefore checked against loaded key sets rather than
//! trusted.

use diesel::SqliteConnection;
use diesel::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use tutor_ledger::{DanglingReference, IntegrityFacts, ProfileKind};

use crate::diesel_schema::{
    bill_items, bills, inspectors, salary_reports, students, tasks, teachers, users,
    work_sessions,
};
use crate::error::PersistenceError;

type SessionFacts = (
    i64,
    i64,
    i64,
    Option<i64>,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn dangling(
    facts: &mut IntegrityFacts,
    keys: &BTreeSet<i64>,
    reference: DanglingReference,
) {
    if !keys.contains(&reference.target_id) {
        facts.dangling_references.push(reference);
    }
}

fn profile_facts(
    facts: &mut IntegrityFacts,
    user_ids: &BTreeSet<i64>,
    kind: ProfileKind,
    table: &'static str,
    rows: &[(i64, i64)],
) {
    let mut per_user: BTreeMap<i64, i64> = BTreeMap::new();
    for &(profile_id, user_id) in rows {
        *per_user.entry(user_id).or_default() += 1;
        dangling(
            facts,
            user_ids,
            DanglingReference {
                table,
                row_id: profile_id,
                column: "user_id",
                target_id: user_id,
            },
        );
    }
    for (user_id, count) in per_user {
        if count > 1 {
            facts.duplicate_profiles.push((kind, user_id, count));
        }
    }
}

/// Gathers every structural fact the integrity check reports on.
///
/// # Errors
///
/// Returns an error if any query fails.
#[allow(clippy::too_many_lines)]
pub fn gather_integrity_facts(
    conn: &mut SqliteConnection,
) -> Result<IntegrityFacts, PersistenceError> {
    let mut facts: IntegrityFacts = IntegrityFacts::default();

    let user_ids: BTreeSet<i64> = users::table
        .select(users::user_id)
        .load::<i64>(conn)?
        .into_iter()
        .collect();
    let task_ids: BTreeSet<i64> = tasks::table
        .select(tasks::task_id)
        .load::<i64>(conn)?
        .into_iter()
        .collect();

    let teacher_rows: Vec<(i64, i64)> = teachers::table
        .select((teachers::teacher_id, teachers::user_id))
        .load(conn)?;
    let student_rows: Vec<(i64, i64)> = students::table
        .select((students::student_id, students::user_id))
        .load(conn)?;
    let inspector_rows: Vec<(i64, i64)> = inspectors::table
        .select((inspectors::inspector_id, inspectors::user_id))
        .load(conn)?;

    profile_facts(&mut facts, &user_ids, ProfileKind::Teacher, "teachers", &teacher_rows);
    profile_facts(&mut facts, &user_ids, ProfileKind::Student, "students", &student_rows);
    profile_facts(
        &mut facts,
        &user_ids,
        ProfileKind::Inspector,
        "inspectors",
        &inspector_rows,
    );

    let teacher_ids: BTreeSet<i64> = teacher_rows.iter().map(|&(id, _)| id).collect();
    let student_ids: BTreeSet<i64> = student_rows.iter().map(|&(id, _)| id).collect();

    let sessions: Vec<SessionFacts> = work_sessions::table
        .select((
            work_sessions::work_session_id,
            work_sessions::teacher_id,
            work_sessions::task_id,
            work_sessions::student_id,
            work_sessions::entry_type,
            work_sessions::clock_out,
            work_sessions::hourly_rate,
            work_sessions::task_price,
            work_sessions::stored_hours,
        ))
        .filter(work_sessions::deleted_at.is_null())
        .load(conn)?;

    for (id, teacher_id, task_id, student_id, entry_type, clock_out, rate, price, hours) in
        &sessions
    {
        let id: i64 = *id;
        dangling(
            &mut facts,
            &teacher_ids,
            DanglingReference {
                table: "work_sessions",
                row_id: id,
                column: "teacher_id",
                target_id: *teacher_id,
            },
        );
        dangling(
            &mut facts,
            &task_ids,
            DanglingReference {
                table: "work_sessions",
                row_id: id,
                column: "task_id",
                target_id: *task_id,
            },
        );
        if let Some(student_id) = student_id {
            dangling(
                &mut facts,
                &student_ids,
                DanglingReference {
                    table: "work_sessions",
                    row_id: id,
                    column: "student_id",
                    target_id: *student_id,
                },
            );
        }
        if rate.is_none() || price.is_none() {
            facts.sessions_without_rate.push(id);
        }
        let complete: bool = entry_type != "clock" || clock_out.is_some();
        if complete && hours.is_none() {
            facts.closed_sessions_without_hours.push(id);
        }
    }

    let reports: Vec<(i64, i64)> = salary_reports::table
        .select((salary_reports::salary_report_id, salary_reports::teacher_id))
        .load(conn)?;
    for &(id, teacher_id) in &reports {
        dangling(
            &mut facts,
            &teacher_ids,
            DanglingReference {
                table: "salary_reports",
                row_id: id,
                column: "teacher_id",
                target_id: teacher_id,
            },
        );
    }

    let bill_rows: Vec<(i64, i64, Option<String>)> = bills::table
        .select((bills::bill_id, bills::student_id, bills::total_amount))
        .load(conn)?;
    for (id, student_id, total) in &bill_rows {
        dangling(
            &mut facts,
            &student_ids,
            DanglingReference {
                table: "bills",
                row_id: *id,
                column: "student_id",
                target_id: *student_id,
            },
        );
        if total.is_none() {
            facts.bills_without_total.push(*id);
        }
    }
    let bill_ids: BTreeSet<i64> = bill_rows.iter().map(|(id, _, _)| *id).collect();

    let item_rows: Vec<(i64, i64)> = bill_items::table
        .select((bill_items::bill_item_id, bill_items::bill_id))
        .load(conn)?;
    for &(id, bill_id) in &item_rows {
        dangling(
            &mut facts,
            &bill_ids,
            DanglingReference {
                table: "bill_items",
                row_id: id,
                column: "bill_id",
                target_id: bill_id,
            },
        );
    }

    facts.rows_examined = user_ids.len()
        + task_ids.len()
        + teacher_rows.len()
        + student_rows.len()
        + inspector_rows.len()
        + sessions.len()
        + reports.len()
        + bill_rows.len()
        + item_rows.len();

    debug!(
        rows = facts.rows_examined,
        dangling = facts.dangling_references.len(),
        "Gathered integrity facts"
    );
    Ok(facts)
}

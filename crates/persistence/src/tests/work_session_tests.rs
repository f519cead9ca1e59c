// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::level_filters::LevelFilter;
use tutor_ledger_domain::{DomainError, NewWorkSession, Tz, WorkEntry};

use super::{
    at, create_test_draft, create_test_fixture, create_test_persistence, dec, march_2026,
};
use crate::PersistenceError;

#[test]
fn test_manual_session_freezes_hours_and_amounts() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = create_test_draft(&fixture, WorkEntry::manual(dec("2.00")), at(2026, 3, 2, 9, 0));

    let logged = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, 2, 12, 0))
        .unwrap();

    let stored = persistence
        .get_work_session(logged.session.work_session_id().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored.stored_hours(), Some(dec("2.00")));
    assert_eq!(stored.amounts().total_amount, Some(dec("30.00")));
    assert_eq!(stored.amounts().teacher_payment_amount, Some(dec("30.00")));
    assert_eq!(stored.rates().hourly_rate(), Some(dec("15.00")));
    assert_eq!(stored, logged.session);
}

#[test]
fn test_billable_session_is_billed_when_logged() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = create_test_draft(&fixture, WorkEntry::manual(dec("2.00")), at(2026, 3, 2, 9, 0));

    let logged = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, 2, 12, 0))
        .unwrap();

    let item = logged.bill_item.expect("session is billable");
    assert_eq!(item.line.amount(), dec("30.00"));
    assert_eq!(item.line.service_name(), "Lesson");
    assert_eq!(item.line.work_session_id(), logged.session.work_session_id());

    let bill = persistence
        .get_bill_for_month(fixture.student_id, march_2026())
        .unwrap()
        .unwrap();
    assert_eq!(bill.bill_id, item.bill_id);
    assert_eq!(bill.total_amount, Some(dec("30.00")));
}

#[test]
fn test_clock_session_is_billed_on_close() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let clock_in = at(2026, 3, 5, 14, 0);
    let draft = create_test_draft(&fixture, WorkEntry::clock_in(clock_in), clock_in);

    let opened = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, clock_in)
        .unwrap();
    assert!(opened.bill_item.is_none());
    assert!(opened.session.is_open());

    let id = opened.session.work_session_id().unwrap();
    let closed = persistence
        .close_work_session(id, at(2026, 3, 5, 15, 30), Tz::UTC, at(2026, 3, 5, 15, 30))
        .unwrap();

    assert_eq!(closed.session.stored_hours(), Some(dec("2")));
    assert_eq!(closed.session.amounts().total_amount, Some(dec("30.00")));
    assert!(closed.bill_item.is_some());
}

#[test]
fn test_closing_twice_is_rejected() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let clock_in = at(2026, 3, 5, 14, 0);
    let draft = create_test_draft(&fixture, WorkEntry::clock_in(clock_in), clock_in);
    let id = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, clock_in)
        .unwrap()
        .session
        .work_session_id()
        .unwrap();
    let clock_out = at(2026, 3, 5, 15, 0);
    persistence
        .close_work_session(id, clock_out, Tz::UTC, clock_out)
        .unwrap();

    let err = persistence
        .close_work_session(id, clock_out, Tz::UTC, clock_out)
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Rejected(DomainError::SessionAlreadyClosed { .. })
    ));
}

#[test]
fn test_invalid_entry_is_not_persisted() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = create_test_draft(
        &fixture,
        WorkEntry::time_range(at(2026, 3, 5, 15, 0), at(2026, 3, 5, 14, 0)),
        at(2026, 3, 5, 15, 0),
    );

    let err = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, 5, 15, 0))
        .unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Rejected(DomainError::EndNotAfterStart { .. })
    ));
    assert!(persistence.list_work_sessions().unwrap().is_empty());
}

#[test]
fn test_unknown_task_is_not_found() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = create_test_draft(&fixture, WorkEntry::manual(dec("1")), at(2026, 3, 2, 9, 0));

    let err = persistence
        .log_work_session(draft, 999, Tz::UTC, at(2026, 3, 2, 9, 0))
        .unwrap_err();

    assert!(matches!(err, PersistenceError::NotFound(_)));
}

#[test]
fn test_rate_change_leaves_existing_session_untouched() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = create_test_draft(&fixture, WorkEntry::manual(dec("2.00")), at(2026, 3, 2, 9, 0));
    let id = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, 2, 9, 0))
        .unwrap()
        .session
        .work_session_id()
        .unwrap();

    persistence
        .update_task_rates(fixture.task_id, dec("20.00"), dec("25.00"), at(2026, 3, 3, 0, 0))
        .unwrap();

    let stored = persistence.get_work_session(id).unwrap().unwrap();
    assert_eq!(stored.rates().hourly_rate(), Some(dec("15.00")));
    assert_eq!(stored.rates().price(), Some(dec("15.00")));
    assert_eq!(stored.amounts().teacher_payment_amount, Some(dec("30.00")));
}

#[test]
fn test_soft_delete_keeps_values_and_bill_line() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = create_test_draft(&fixture, WorkEntry::manual(dec("2.00")), at(2026, 3, 2, 9, 0));
    let logged = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, 2, 9, 0))
        .unwrap();
    let id = logged.session.work_session_id().unwrap();

    let deleted = persistence
        .delete_work_session(id, at(2026, 3, 4, 0, 0))
        .unwrap();

    assert!(deleted.is_deleted());
    assert_eq!(deleted.amounts().total_amount, Some(dec("30.00")));
    let item_id = logged.bill_item.unwrap().bill_item_id;
    assert!(persistence.get_bill_item(item_id).unwrap().is_some());
    assert!(
        persistence
            .list_teacher_sessions_for_month(fixture.teacher_id, march_2026(), Tz::UTC)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_session_for_unknown_teacher_is_an_integrity_violation() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = NewWorkSession {
        teacher_id: 999,
        student_id: None,
        entry: WorkEntry::manual(dec("1")),
        created_at: None,
    };

    let err = persistence
        .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, 2, 9, 0))
        .unwrap_err();

    assert!(matches!(err, PersistenceError::IntegrityViolation(_)));
}

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn lines_containing(&self, needle: &str) -> usize {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(needle))
            .count()
    }
}

#[test]
fn test_logging_a_session_reports_it_once_at_info() {
    let mut persistence = create_test_persistence();
    let fixture = create_test_fixture(&mut persistence);
    let draft = create_test_draft(&fixture, WorkEntry::manual(dec("1")), at(2026, 3, 2, 9, 0));
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        persistence
            .log_work_session(draft, fixture.task_id, Tz::UTC, at(2026, 3, 2, 9, 0))
            .unwrap();
    });

    assert_eq!(logs.lines_containing("Logged work session"), 1);
    assert_eq!(logs.lines_containing("Inserted work session row"), 0);
}

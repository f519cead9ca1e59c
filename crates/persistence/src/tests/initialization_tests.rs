// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend initialization tests.
//!
//! Every other persistence test opens a fresh in-memory database, so
//! connection setup and migration are exercised throughout. These tests
//! cover isolation, foreign key enforcement and the down migration.

use diesel_migrations::MigrationHarness;

use super::{at, create_test_persistence};
use crate::{MIGRATIONS, PersistenceError, RoleFlags, SqlitePersistence};

#[test]
fn test_persistence_initialization() {
    let result: Result<SqlitePersistence, PersistenceError> = SqlitePersistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = create_test_persistence();
    let mut db2 = create_test_persistence();

    db1.create_user("owner", "Owner", RoleFlags::default(), at(2026, 1, 1, 0, 0))
        .unwrap();

    assert_eq!(db1.list_users().unwrap().len(), 1);
    assert!(db2.list_users().unwrap().is_empty());
}

#[test]
fn test_foreign_key_enforcement_is_enabled() {
    let mut persistence = create_test_persistence();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_duplicate_username_is_an_integrity_violation() {
    let mut persistence = create_test_persistence();
    let now = at(2026, 1, 1, 0, 0);
    persistence
        .create_user("dup", "First", RoleFlags::default(), now)
        .unwrap();

    let err = persistence
        .create_user("dup", "Second", RoleFlags::default(), now)
        .unwrap_err();

    assert!(matches!(err, PersistenceError::IntegrityViolation(_)));
}

#[test]
fn test_failed_registration_leaves_nothing_behind() {
    let mut persistence = create_test_persistence();
    let now = at(2026, 1, 1, 0, 0);
    persistence
        .register_teacher("taken", "Teacher", None, now)
        .unwrap();

    let result = persistence.register_student("taken", "Student", None, now);

    assert!(result.is_err());
    assert_eq!(persistence.list_users().unwrap().len(), 1);
    assert!(persistence.list_students().unwrap().is_empty());
}

#[test]
fn test_migrations_revert_and_reapply() {
    let mut persistence = create_test_persistence();

    persistence
        .conn
        .revert_all_migrations(MIGRATIONS)
        .expect("down migrations apply");
    let reapplied = persistence
        .conn
        .run_pending_migrations(MIGRATIONS)
        .expect("up migrations apply again");

    assert!(!reapplied.is_empty());
    assert!(persistence.list_users().unwrap().is_empty());
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

/// How the hours of a work session were captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Hours typed in directly.
    Manual,
    /// Clock-in followed by a later clock-out.
    Clock,
    /// An explicit start and end time.
    TimeRange,
}

impl FromStr for EntryType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "clock" => Ok(Self::Clock),
            "time_range" => Ok(Self::TimeRange),
            _ => Err(DomainError::InvalidEntryType(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl EntryType {
    /// Converts this entry type to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Clock => "clock",
            Self::TimeRange => "time_range",
        }
    }
}

/// A login account with its role flags.
///
/// The flags are raw facts. Effective roles are derived by the
/// authorization layer, and flag/profile disagreements are reported by
/// the role verification job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// The canonical numeric identifier.
    pub user_id: i64,
    /// Unique login name.
    pub username: String,
    /// Human-readable name.
    pub display_name: String,
    /// Owner of the tutoring center.
    pub is_superuser: bool,
    /// Read-mostly reviewer.
    pub is_inspector: bool,
    /// Logs work sessions.
    pub is_teacher: bool,
    /// Receives bills.
    pub is_student: bool,
}

impl UserAccount {
    /// Counts how many of the inspector/teacher/student flags are set.
    ///
    /// The superuser flag is not counted; an owner may also hold a role.
    #[must_use]
    pub fn role_flag_count(&self) -> u8 {
        u8::from(self.is_inspector) + u8::from(self.is_teacher) + u8::from(self.is_student)
    }
}

/// A teacher profile attached to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub teacher_id: i64,
    pub user_id: i64,
    pub subjects: Option<String>,
}

/// A student profile attached to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: i64,
    pub user_id: i64,
    pub phone: Option<String>,
    /// Inactive students are skipped by monthly bill runs.
    pub is_active: bool,
}

/// An inspector profile attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectorProfile {
    pub inspector_id: i64,
    pub user_id: i64,
}

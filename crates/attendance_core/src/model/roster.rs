//! Roster model: the ordered list of students and teachers.
//!
//! The roster is owned by an outer collaborator. Reporting paths only read it,
//! and its order is the order of the roster-wide report.

use serde::{Deserialize, Serialize};

/// Roster member category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterRole {
    Student,
    Teacher,
}

impl RosterRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "student" => Some(Self::Student),
            "teacher" => Some(Self::Teacher),
            _ => None,
        }
    }
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterMember {
    pub id: String,
    pub name: String,
    pub role: RosterRole,
}

impl RosterMember {
    pub fn student(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: RosterRole::Student,
        }
    }

    pub fn teacher(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: RosterRole::Teacher,
        }
    }
}

/// Members installed into an empty store on first run.
pub fn default_roster() -> Vec<RosterMember> {
    vec![
        RosterMember::student("s1", "Student One"),
        RosterMember::student("s2", "Student Two"),
        RosterMember::teacher("t1", "Teacher One"),
    ]
}

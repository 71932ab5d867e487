//! Task model for the agenda scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// When a task is due, or nothing at all.
///
/// `None` is the "no deadline" sentinel and orders after every concrete
/// instant, so undated tasks lose every deadline tie. The derived `Option`
/// ordering would put `None` first, hence the manual impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline(pub Option<DateTime<Utc>>);

impl Deadline {
    pub const NONE: Deadline = Deadline(None);

    pub fn at(instant: DateTime<Utc>) -> Self {
        Deadline(Some(instant))
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

impl Ord for Deadline {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Deadline {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Unit of scheduling. Lower priority value = runs earlier.
///
/// The name doubles as the lookup key for edit/delete. The store does not
/// enforce uniqueness on insert; duplicates are legal and name-based removal
/// takes out every match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub priority: i32,
    pub deadline: Deadline,
}

impl Task {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self {
            name: name.into(),
            priority,
            deadline: Deadline::NONE,
        }
    }

    pub fn with_deadline(mut self, instant: DateTime<Utc>) -> Self {
        self.deadline = Deadline::at(instant);
        self
    }
}

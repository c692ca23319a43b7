// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Status classification.
//!
//! Every status type is mapped to a [`StatusCategory`] through an explicit,
//! versioned table that ships with the status type definitions. Display names
//! are only consulted for ids the table does not know about.

use crate::types::StatusType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Broad attendance category of a status type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    /// The employee is on duty.
    Present,
    /// Scheduled absence (leave, course, reserve duty).
    AbsentPlanned,
    /// Unscheduled absence (sickness, emergency).
    AbsentUnplanned,
    /// Anything else.
    Other,
}

impl StatusCategory {
    /// Returns whether the employee is unavailable under this category.
    #[must_use]
    pub const fn is_absence(self) -> bool {
        matches!(self, Self::AbsentPlanned | Self::AbsentUnplanned)
    }
}

/// Words that mark a status name as an on-duty status.
///
/// Heuristic only: applied as a case-insensitive substring match to names of
/// status types missing from the classification table.
pub const PRESENCE_WORDS: &[&str] = &["present", "on duty", "in office", "at work", "working"];

/// Returns whether a status display name reads as an on-duty status.
#[must_use]
pub fn name_indicates_presence(name: &str) -> bool {
    let lowered: String = name.to_lowercase();
    PRESENCE_WORDS.iter().any(|word| lowered.contains(word))
}

/// Versioned mapping from status type id to category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusClassification {
    /// Table version, bumped whenever an entry changes.
    pub version: u32,
    /// Category per status type id.
    #[serde(default)]
    pub entries: BTreeMap<i64, StatusCategory>,
}

impl StatusClassification {
    /// Creates an empty table at the given version.
    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self {
            version,
            entries: BTreeMap::new(),
        }
    }

    /// Adds or replaces an entry, returning the table for chaining.
    #[must_use]
    pub fn with(mut self, status_type_id: i64, category: StatusCategory) -> Self {
        self.entries.insert(status_type_id, category);
        self
    }

    /// Returns the table entry for a status type, if any.
    #[must_use]
    pub fn category(&self, status_type_id: i64) -> Option<StatusCategory> {
        self.entries.get(&status_type_id).copied()
    }

    /// Classifies a status by id, falling back to its display name.
    #[must_use]
    pub fn classify(&self, status_type_id: i64, name: &str) -> StatusCategory {
        self.category(status_type_id).unwrap_or_else(|| {
            if name_indicates_presence(name) {
                StatusCategory::Present
            } else {
                StatusCategory::Other
            }
        })
    }

    /// Classifies a status type.
    #[must_use]
    pub fn classify_type(&self, status_type: &StatusType) -> StatusCategory {
        self.classify(status_type.id, &status_type.name)
    }
}

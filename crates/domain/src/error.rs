// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::OrgKind;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An org node name is empty or whitespace.
    InvalidNodeName {
        /// The kind of node.
        kind: OrgKind,
        /// The node identifier.
        id: i64,
    },
    /// Two nodes of the same kind share an identifier.
    DuplicateNodeId {
        /// The kind of node.
        kind: OrgKind,
        /// The duplicated identifier.
        id: i64,
    },
    /// Two sibling nodes share a name.
    DuplicateNodeName {
        /// The kind of the duplicated nodes.
        kind: OrgKind,
        /// The parent node identifier (`None` for departments).
        parent_id: Option<i64>,
        /// The duplicated name.
        name: String,
    },
    /// A status interval ends before it starts.
    InvalidStatusInterval {
        /// The employee whose status is invalid.
        employee_id: i64,
        /// The interval start.
        start_date: time::Date,
        /// The interval end.
        end_date: time::Date,
    },
    /// Two employees share a personal number.
    DuplicatePersonalNumber(String),
    /// The configured timezone could not be parsed.
    InvalidTimezone(String),
    /// A calendar date could not be converted between representations.
    DateConversion(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNodeName { kind, id } => {
                write!(f, "Invalid {kind} {id}: name cannot be empty")
            }
            Self::DuplicateNodeId { kind, id } => {
                write!(f, "Duplicate {kind} id {id}")
            }
            Self::DuplicateNodeName {
                kind,
                parent_id,
                name,
            } => match parent_id {
                Some(parent_id) => write!(
                    f,
                    "Duplicate {kind} name '{name}' under parent {parent_id}"
                ),
                None => write!(f, "Duplicate {kind} name '{name}'"),
            },
            Self::InvalidStatusInterval {
                employee_id,
                start_date,
                end_date,
            } => {
                write!(
                    f,
                    "Status for employee {employee_id} ends ({end_date}) before it starts ({start_date})"
                )
            }
            Self::DuplicatePersonalNumber(number) => {
                write!(f, "Personal number '{number}' is assigned to more than one employee")
            }
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::DateConversion(msg) => write!(f, "Date conversion failed: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}

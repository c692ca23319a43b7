// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{Department, Employee, OrgKind};
use std::collections::HashSet;
use time::Date;

/// Validates the structural rules of a nested hierarchy.
///
/// Parent/child kinds are fixed by the nesting, so cycles and mis-parented
/// nodes cannot be expressed. This checks the remaining rules.
///
/// # Errors
///
/// Returns an error if:
/// - A node name is empty
/// - A node id is used twice within its kind
/// - Two siblings share a name (case-insensitive)
pub fn validate_hierarchy(departments: &[Department]) -> Result<(), DomainError> {
    let mut department_ids: HashSet<i64> = HashSet::new();
    let mut section_ids: HashSet<i64> = HashSet::new();
    let mut team_ids: HashSet<i64> = HashSet::new();
    let mut department_names: HashSet<String> = HashSet::new();

    for department in departments {
        check_node(
            OrgKind::Department,
            department.id,
            &department.name,
            None,
            &mut department_ids,
            &mut department_names,
        )?;

        let mut section_names: HashSet<String> = HashSet::new();
        for section in &department.sections {
            check_node(
                OrgKind::Section,
                section.id,
                &section.name,
                Some(department.id),
                &mut section_ids,
                &mut section_names,
            )?;

            let mut team_names: HashSet<String> = HashSet::new();
            for team in &section.teams {
                check_node(
                    OrgKind::Team,
                    team.id,
                    &team.name,
                    Some(section.id),
                    &mut team_ids,
                    &mut team_names,
                )?;
            }
        }
    }

    Ok(())
}

fn check_node(
    kind: OrgKind,
    id: i64,
    name: &str,
    parent_id: Option<i64>,
    seen_ids: &mut HashSet<i64>,
    sibling_names: &mut HashSet<String>,
) -> Result<(), DomainError> {
    let normalized: String = name.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(DomainError::InvalidNodeName { kind, id });
    }
    if !seen_ids.insert(id) {
        return Err(DomainError::DuplicateNodeId { kind, id });
    }
    if !sibling_names.insert(normalized) {
        return Err(DomainError::DuplicateNodeName {
            kind,
            parent_id,
            name: name.trim().to_string(),
        });
    }
    Ok(())
}

/// Validates that a status interval does not end before it starts.
///
/// # Errors
///
/// Returns an error if `end_date` is earlier than `start_date`.
pub fn validate_status_interval(
    employee_id: i64,
    start_date: Date,
    end_date: Option<Date>,
) -> Result<(), DomainError> {
    match end_date {
        Some(end_date) if end_date < start_date => Err(DomainError::InvalidStatusInterval {
            employee_id,
            start_date,
            end_date,
        }),
        _ => Ok(()),
    }
}

/// Validates the baseline invariants of a roster.
///
/// # Errors
///
/// Returns an error if:
/// - A personal number appears twice
/// - A current status interval ends before it starts
pub fn validate_roster(employees: &[Employee]) -> Result<(), DomainError> {
    let mut numbers: HashSet<&str> = HashSet::new();
    for employee in employees {
        if !numbers.insert(employee.personal_number.as_str()) {
            return Err(DomainError::DuplicatePersonalNumber(
                employee.personal_number.clone(),
            ));
        }
        if let Some(status) = &employee.current_status {
            validate_status_interval(employee.id, status.start_date, status.end_date)?;
        }
    }
    Ok(())
}

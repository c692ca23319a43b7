// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    CurrentStatus, Department, DomainError, Employee, OrgKind, Section, Team, today_in_timezone,
    validate_hierarchy, validate_roster, validate_status_interval,
};
use time::macros::date;

fn department(id: i64, name: &str, sections: Vec<Section>) -> Department {
    Department {
        id,
        name: name.to_string(),
        sections,
    }
}

fn section(id: i64, name: &str, teams: Vec<Team>) -> Section {
    Section {
        id,
        name: name.to_string(),
        teams,
    }
}

fn team(id: i64, name: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
    }
}

#[test]
fn test_valid_hierarchy_passes() {
    let departments: Vec<Department> = vec![
        department(1, "Ops", vec![section(10, "Patrol", vec![team(100, "Alpha")])]),
        department(2, "Support", vec![section(20, "Patrol", vec![team(200, "Alpha")])]),
    ];

    // Same names under different parents are allowed
    assert!(validate_hierarchy(&departments).is_ok());
}

#[test]
fn test_empty_node_name_is_rejected() {
    let departments: Vec<Department> =
        vec![department(1, "Ops", vec![section(10, "   ", vec![])])];

    assert_eq!(
        validate_hierarchy(&departments),
        Err(DomainError::InvalidNodeName {
            kind: OrgKind::Section,
            id: 10,
        })
    );
}

#[test]
fn test_duplicate_team_id_across_sections_is_rejected() {
    let departments: Vec<Department> = vec![department(
        1,
        "Ops",
        vec![
            section(10, "Patrol", vec![team(100, "Alpha")]),
            section(11, "Logistics", vec![team(100, "Bravo")]),
        ],
    )];

    assert_eq!(
        validate_hierarchy(&departments),
        Err(DomainError::DuplicateNodeId {
            kind: OrgKind::Team,
            id: 100,
        })
    );
}

#[test]
fn test_duplicate_sibling_name_is_case_insensitive() {
    let departments: Vec<Department> = vec![
        department(1, "Ops", vec![]),
        department(2, "OPS", vec![]),
    ];

    assert_eq!(
        validate_hierarchy(&departments),
        Err(DomainError::DuplicateNodeName {
            kind: OrgKind::Department,
            parent_id: None,
            name: String::from("OPS"),
        })
    );
}

#[test]
fn test_status_interval_rules() {
    assert!(validate_status_interval(1, date!(2026 - 10 - 01), None).is_ok());
    assert!(validate_status_interval(1, date!(2026 - 10 - 01), Some(date!(2026 - 10 - 01))).is_ok());
    assert!(matches!(
        validate_status_interval(1, date!(2026 - 10 - 02), Some(date!(2026 - 10 - 01))),
        Err(DomainError::InvalidStatusInterval { employee_id: 1, .. })
    ));
}

#[test]
fn test_roster_rejects_duplicate_personal_numbers() {
    let employees: Vec<Employee> = vec![
        Employee::new(1, "A", "One", "111"),
        Employee::new(2, "B", "Two", "111"),
    ];

    assert_eq!(
        validate_roster(&employees),
        Err(DomainError::DuplicatePersonalNumber(String::from("111")))
    );
}

#[test]
fn test_roster_rejects_inverted_baseline_interval() {
    let mut employee: Employee = Employee::new(1, "A", "One", "111");
    employee.current_status = Some(CurrentStatus {
        status_type_id: 3,
        status_name: String::from("Leave"),
        color: String::from("green"),
        start_date: date!(2026 - 10 - 10),
        end_date: Some(date!(2026 - 10 - 01)),
    });

    assert!(validate_roster(&[employee]).is_err());
}

#[test]
fn test_today_in_timezone() {
    assert!(today_in_timezone("Asia/Jerusalem").is_ok());
    assert_eq!(
        today_in_timezone("Mars/Olympus"),
        Err(DomainError::InvalidTimezone(String::from("Mars/Olympus")))
    );
}

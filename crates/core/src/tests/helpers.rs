// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ReconciliationStore;
use rollcall_domain::{
    CurrentStatus, Department, Employee, OrgHierarchy, OrgPath, Section, StatusType, Team,
};
use time::Date;
use time::macros::date;

pub const TODAY: Date = date!(2026 - 10 - 19);

pub fn create_test_hierarchy() -> OrgHierarchy {
    OrgHierarchy::new(vec![
        Department {
            id: 1,
            name: String::from("Operations"),
            sections: vec![
                Section {
                    id: 10,
                    name: String::from("Patrol"),
                    teams: vec![
                        Team {
                            id: 42,
                            name: String::from("Alpha"),
                        },
                        Team {
                            id: 43,
                            name: String::from("Bravo"),
                        },
                    ],
                },
                Section {
                    id: 11,
                    name: String::from("Investigations"),
                    teams: vec![Team {
                        id: 44,
                        name: String::from("Cyber"),
                    }],
                },
            ],
        },
        Department {
            id: 2,
            name: String::from("Support"),
            sections: vec![Section {
                id: 20,
                name: String::from("Logistics"),
                teams: vec![Team {
                    id: 50,
                    name: String::from("Transport"),
                }],
            }],
        },
    ])
    .unwrap()
}

pub fn create_test_status_types() -> Vec<StatusType> {
    vec![
        StatusType::new(1, "Present", "#22c55e"),
        StatusType::new(5, "Sick", "#ef4444"),
        StatusType::new(7, "Vacation", "#3b82f6"),
    ]
}

pub fn create_test_employee(id: i64, first: &str, last: &str, team_id: i64) -> Employee {
    let hierarchy: OrgHierarchy = create_test_hierarchy();
    let section_id: Option<i64> = hierarchy.section_of_team(team_id);
    let mut employee: Employee = Employee::new(id, first, last, &format!("{}", 1_000_000 + id));
    employee.org_path = OrgPath {
        department_id: section_id.and_then(|s| hierarchy.department_of_section(s)),
        section_id,
        team_id: Some(team_id),
    };
    employee
}

pub fn with_status(mut employee: Employee, status_type_id: i64, start_date: Date) -> Employee {
    let status: StatusType = create_test_status_types()
        .into_iter()
        .find(|s| s.id == status_type_id)
        .unwrap();
    employee.current_status = Some(CurrentStatus {
        status_type_id,
        status_name: status.name,
        color: status.color,
        start_date,
        end_date: None,
    });
    employee
}

/// Three employees with no baseline status: 1 and 2 in team 42, 3 in team 43.
pub fn create_test_roster() -> Vec<Employee> {
    vec![
        create_test_employee(1, "Avi", "Mizrahi", 42),
        create_test_employee(2, "Dana", "Levi", 42),
        create_test_employee(3, "Yossi", "Peretz", 43),
    ]
}

pub fn create_test_store() -> ReconciliationStore {
    let mut store: ReconciliationStore = ReconciliationStore::new(create_test_status_types(), TODAY);
    store.initialize(create_test_roster(), &[]);
    store
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use crate::{
    AppliedUpdate, BulkUpdateRequest, BulkUpdateService, Dataset, InMemoryDirectory,
    ProviderError, RosterProvider, RosterQuery, StatusTypeProvider,
};
use rollcall::{ReconciliationStore, prepare_roster};
use rollcall_domain::{Actor, Employee};
use time::Date;
use time::macros::date;

pub const TODAY: Date = date!(2026 - 10 - 19);

/// Two departments, one team commander (1) and one section commander (4).
///
/// Employee 5 is inactive and employee 6 sits in the other department.
pub const DATASET_JSON: &str = r##"{
    "hierarchy": [
        {
            "id": 1,
            "name": "Operations",
            "sections": [
                {
                    "id": 10,
                    "name": "Patrol",
                    "teams": [
                        { "id": 42, "name": "Alpha" },
                        { "id": 43, "name": "Bravo" }
                    ]
                }
            ]
        },
        {
            "id": 2,
            "name": "Support",
            "sections": [
                { "id": 20, "name": "Logistics", "teams": [ { "id": 50, "name": "Transport" } ] }
            ]
        }
    ],
    "status_types": [
        { "id": 1, "name": "Present", "color": "#22c55e" },
        { "id": 5, "name": "Sick", "color": "#ef4444" },
        { "id": 7, "name": "Vacation", "color": "#3b82f6" }
    ],
    "classification": {
        "version": 2,
        "entries": { "1": "present", "5": "absent_unplanned", "7": "absent_planned" }
    },
    "roster": [
        {
            "id": 1, "first_name": "Avi", "last_name": "Mizrahi", "personal_number": "1000001",
            "org_path": { "department_id": 1, "section_id": 10, "team_id": 42 },
            "is_commander": true
        },
        {
            "id": 2, "first_name": "Dana", "last_name": "Levi", "personal_number": "1000002",
            "org_path": { "department_id": 1, "section_id": 10, "team_id": 42 },
            "current_status": {
                "status_type_id": 1, "status_name": "Present", "color": "#22c55e",
                "start_date": "2026-10-01", "end_date": "2026-10-10"
            }
        },
        {
            "id": 3, "first_name": "Yossi", "last_name": "Peretz", "personal_number": "1000003",
            "org_path": { "department_id": 1, "section_id": 10, "team_id": 43 }
        },
        {
            "id": 4, "first_name": "Noa", "last_name": "Katz", "personal_number": "1000004",
            "org_path": { "department_id": 1, "section_id": 10 },
            "is_commander": true
        },
        {
            "id": 5, "first_name": "Rina", "last_name": "Golan", "personal_number": "1000005",
            "org_path": { "department_id": 1, "section_id": 10, "team_id": 42 },
            "is_active": false
        },
        {
            "id": 6, "first_name": "Eli", "last_name": "Cohen", "personal_number": "1000006",
            "org_path": { "department_id": 2, "section_id": 20, "team_id": 50 }
        }
    ],
    "actors": [
        { "id": 1, "is_commander": true, "commands_team_id": 42 },
        { "id": 4, "is_commander": true, "commands_section_id": 10 },
        { "id": 9, "is_admin": true }
    ]
}"##;

pub fn create_test_directory() -> InMemoryDirectory {
    InMemoryDirectory::new(Dataset::from_json(DATASET_JSON).unwrap())
}

pub fn team_commander() -> Actor {
    create_test_directory().actor(1).unwrap()
}

pub fn section_commander() -> Actor {
    create_test_directory().actor(4).unwrap()
}

/// Opens a session over the full roster as `actor` would see it.
pub fn create_test_store(directory: &InMemoryDirectory, actor: &Actor) -> ReconciliationStore {
    let roster: Vec<Employee> = directory.roster(&RosterQuery::default()).unwrap();
    let mut store: ReconciliationStore =
        ReconciliationStore::new(directory.status_types().unwrap(), TODAY);
    store.initialize(prepare_roster(&roster, actor.id, false), &[]);
    store
}

/// A bulk-update service that is always down.
pub struct UnreachableService;

#[async_trait::async_trait]
impl BulkUpdateService for UnreachableService {
    async fn apply_updates(
        &self,
        _request: BulkUpdateRequest,
    ) -> Result<Vec<AppliedUpdate>, ProviderError> {
        Err(ProviderError::Unavailable)
    }
}

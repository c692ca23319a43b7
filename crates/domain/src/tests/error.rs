// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, OrgKind};
use time::macros::date;

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::InvalidNodeName {
        kind: OrgKind::Team,
        id: 4,
    };
    assert_eq!(format!("{err}"), "Invalid team 4: name cannot be empty");

    let err: DomainError = DomainError::DuplicateNodeName {
        kind: OrgKind::Team,
        parent_id: Some(10),
        name: String::from("Alpha"),
    };
    assert_eq!(format!("{err}"), "Duplicate team name 'Alpha' under parent 10");

    let err: DomainError = DomainError::DuplicateNodeName {
        kind: OrgKind::Department,
        parent_id: None,
        name: String::from("Ops"),
    };
    assert_eq!(format!("{err}"), "Duplicate department name 'Ops'");

    let err: DomainError = DomainError::InvalidStatusInterval {
        employee_id: 9,
        start_date: date!(2026 - 10 - 02),
        end_date: date!(2026 - 10 - 01),
    };
    assert_eq!(
        format!("{err}"),
        "Status for employee 9 ends (2026-10-01) before it starts (2026-10-02)"
    );

    let err: DomainError = DomainError::DuplicatePersonalNumber(String::from("77"));
    assert_eq!(
        format!("{err}"),
        "Personal number '77' is assigned to more than one employee"
    );

    let err: DomainError = DomainError::InvalidTimezone(String::from("Nowhere"));
    assert_eq!(format!("{err}"), "Invalid timezone: Nowhere");
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{StatusCategory, StatusClassification, StatusType, name_indicates_presence};

#[test]
fn test_table_entry_wins_over_display_name() {
    let table: StatusClassification =
        StatusClassification::new(1).with(4, StatusCategory::AbsentPlanned);

    // Name says "working" but the table says planned absence
    assert_eq!(
        table.classify(4, "Working remotely abroad"),
        StatusCategory::AbsentPlanned
    );
}

#[test]
fn test_unclassified_ids_fall_back_to_lexical_match() {
    let table: StatusClassification = StatusClassification::new(1);

    assert_eq!(table.classify(1, "Present"), StatusCategory::Present);
    assert_eq!(table.classify(2, "ON DUTY - night"), StatusCategory::Present);
    assert_eq!(table.classify(3, "Sick"), StatusCategory::Other);
    assert_eq!(
        table.classify_type(&StatusType::new(5, "In office", "#22c55e")),
        StatusCategory::Present
    );
}

#[test]
fn test_presence_words_do_not_match_absences() {
    assert!(!name_indicates_presence("Vacation"));
    assert!(!name_indicates_presence("Off duty"));
    assert!(name_indicates_presence("present (late)"));
}

#[test]
fn test_absence_categories() {
    assert!(StatusCategory::AbsentPlanned.is_absence());
    assert!(StatusCategory::AbsentUnplanned.is_absence());
    assert!(!StatusCategory::Present.is_absence());
    assert!(!StatusCategory::Other.is_absence());
}

#[test]
fn test_classification_table_deserializes_with_integer_keys() {
    let json: &str = r#"{"version": 3, "entries": {"1": "present", "5": "absent_unplanned"}}"#;
    let table: StatusClassification = serde_json::from_str(json).unwrap();

    assert_eq!(table.version, 3);
    assert_eq!(table.category(5), Some(StatusCategory::AbsentUnplanned));
    assert_eq!(table.category(2), None);
}

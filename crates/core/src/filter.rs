// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Roster filtering.
//!
//! Filtering is a pure function of the roster, a [`FilterSpec`] and the
//! current selection. It runs on every keystroke, so it never allocates more
//! than the result vector and never reorders rows.
//!
//! Two visibility policies live outside [`apply_filter`] on purpose and are
//! applied once by [`prepare_roster`]: the actor never sees their own row in
//! a bulk list, and inactive personnel are hidden unless asked for.

use rollcall_domain::{Employee, OrgHierarchy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A complete filter selection for a roster view.
///
/// Every facet is optional. Empty sets and unset flags do not restrict.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    /// Free text matched against full name or personal number.
    pub search: String,
    /// Department filter.
    pub department_ids: BTreeSet<i64>,
    /// Section filter.
    pub section_ids: BTreeSet<i64>,
    /// Team filter.
    pub team_ids: BTreeSet<i64>,
    /// Role names.
    pub roles: BTreeSet<String>,
    /// Service types.
    pub service_type_ids: BTreeSet<i64>,
    /// Baseline status types (`0` matches employees with no status).
    pub status_type_ids: BTreeSet<i64>,
    /// Only commanders.
    pub is_commander: Option<bool>,
    /// Only administrators.
    pub is_admin: Option<bool>,
    /// Only holders of a security clearance.
    pub has_security_clearance: Option<bool>,
    /// Only holders of a police license.
    pub has_police_license: Option<bool>,
    /// Only inactive employees.
    pub show_inactive: Option<bool>,
    /// Only employees in the selection set.
    pub selected_only: Option<bool>,
}

const fn enabled(flag: Option<bool>) -> bool {
    matches!(flag, Some(true))
}

impl FilterSpec {
    /// Creates a filter pinned to an org path.
    #[must_use]
    pub fn for_org(
        department_id: Option<i64>,
        section_id: Option<i64>,
        team_id: Option<i64>,
    ) -> Self {
        Self {
            department_ids: department_id.into_iter().collect(),
            section_ids: section_id.into_iter().collect(),
            team_ids: team_id.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Selects departments, dropping sections and teams outside them.
    pub fn set_departments(&mut self, department_ids: BTreeSet<i64>, hierarchy: &OrgHierarchy) {
        self.department_ids = department_ids;
        if self.department_ids.is_empty() {
            return;
        }
        let departments: &BTreeSet<i64> = &self.department_ids;
        self.section_ids.retain(|section_id| {
            hierarchy
                .department_of_section(*section_id)
                .is_some_and(|d| departments.contains(&d))
        });
        self.team_ids.retain(|team_id| {
            hierarchy
                .section_of_team(*team_id)
                .and_then(|s| hierarchy.department_of_section(s))
                .is_some_and(|d| departments.contains(&d))
        });
    }

    /// Selects sections, dropping teams outside them.
    pub fn set_sections(&mut self, section_ids: BTreeSet<i64>, hierarchy: &OrgHierarchy) {
        self.section_ids = section_ids;
        if self.section_ids.is_empty() {
            return;
        }
        let sections: &BTreeSet<i64> = &self.section_ids;
        self.team_ids.retain(|team_id| {
            hierarchy
                .section_of_team(*team_id)
                .is_some_and(|s| sections.contains(&s))
        });
    }

    /// Selects teams.
    pub fn set_teams(&mut self, team_ids: BTreeSet<i64>) {
        self.team_ids = team_ids;
    }

    /// Number of facets currently restricting the result.
    #[must_use]
    pub fn active_facet_count(&self) -> usize {
        let sets: [bool; 6] = [
            !self.department_ids.is_empty(),
            !self.section_ids.is_empty(),
            !self.team_ids.is_empty(),
            !self.roles.is_empty(),
            !self.service_type_ids.is_empty(),
            !self.status_type_ids.is_empty(),
        ];
        let flags: [Option<bool>; 6] = [
            self.is_commander,
            self.is_admin,
            self.has_security_clearance,
            self.has_police_license,
            self.show_inactive,
            self.selected_only,
        ];

        usize::from(!self.search.trim().is_empty())
            + sets.iter().filter(|set| **set).count()
            + flags.iter().filter(|flag| enabled(**flag)).count()
    }

    /// Returns whether no facet restricts the result.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.active_facet_count() == 0
    }
}

fn id_matches(filter: &BTreeSet<i64>, value: Option<i64>) -> bool {
    filter.is_empty() || value.is_some_and(|v| filter.contains(&v))
}

fn flag_matches(flag: Option<bool>, value: bool) -> bool {
    !enabled(flag) || value
}

fn search_matches(search: &str, employee: &Employee) -> bool {
    let needle: String = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    employee.full_name().to_lowercase().contains(&needle)
        || employee.personal_number.to_lowercase().contains(&needle)
}

/// Returns whether a single employee passes every facet of the filter.
#[must_use]
pub fn matches_filter(employee: &Employee, spec: &FilterSpec, selection: &BTreeSet<i64>) -> bool {
    search_matches(&spec.search, employee)
        && id_matches(&spec.department_ids, employee.org_path.department_id)
        && id_matches(&spec.section_ids, employee.org_path.section_id)
        && id_matches(&spec.team_ids, employee.org_path.team_id)
        && id_matches(&spec.service_type_ids, employee.service_type_id)
        && id_matches(
            &spec.status_type_ids,
            Some(employee.baseline_status_type_id()),
        )
        && (spec.roles.is_empty()
            || employee
                .role_name
                .as_ref()
                .is_some_and(|role| spec.roles.contains(role)))
        && flag_matches(spec.is_commander, employee.is_commander)
        && flag_matches(spec.is_admin, employee.is_admin)
        && flag_matches(spec.has_security_clearance, employee.has_security_clearance)
        && flag_matches(spec.has_police_license, employee.has_police_license)
        && flag_matches(spec.show_inactive, !employee.is_active)
        && (!enabled(spec.selected_only) || selection.contains(&employee.id))
}

/// Applies a filter to a roster.
///
/// # Arguments
///
/// * `roster` - The prepared roster
/// * `spec` - The filter to evaluate
/// * `selection` - The selection set, consulted by `selected_only`
///
/// # Returns
///
/// * The matching employees, in roster order
#[must_use]
pub fn apply_filter<'a>(
    roster: &'a [Employee],
    spec: &FilterSpec,
    selection: &BTreeSet<i64>,
) -> Vec<&'a Employee> {
    roster
        .iter()
        .filter(|employee| matches_filter(employee, spec, selection))
        .collect()
}

/// Prepares a raw roster for a bulk view.
///
/// Removes the actor's own row and, unless `include_inactive` is set,
/// every inactive employee.
#[must_use]
pub fn prepare_roster(roster: &[Employee], actor_id: i64, include_inactive: bool) -> Vec<Employee> {
    roster
        .iter()
        .filter(|employee| employee.id != actor_id)
        .filter(|employee| include_inactive || employee.is_active)
        .cloned()
        .collect()
}

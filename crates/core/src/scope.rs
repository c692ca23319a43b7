// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Hierarchical scope resolution.
//!
//! An actor's edit scope is derived from the most specific `commands_*`
//! pointer they hold. The commanded level and every level above it are
//! fixed (pre-selected and read-only in the filter controls); only levels
//! strictly below may be picked.
//!
//! Read scope can be broader than edit scope, so submissions are re-checked
//! with [`Scope::ensure_editable`] before they leave the process.

use crate::error::CoreError;
use crate::filter::FilterSpec;
use crate::store::Update;
use rollcall_domain::{Actor, Employee, OrgHierarchy, OrgKind, OrgNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What an actor may see pre-selected and what they may edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Scope {
    /// Administrators edit everything, including employees with no org path.
    pub is_admin: bool,
    /// Departments under the actor's command.
    pub editable_department_ids: BTreeSet<i64>,
    /// Sections under the actor's command.
    pub editable_section_ids: BTreeSet<i64>,
    /// Teams under the actor's command.
    pub editable_team_ids: BTreeSet<i64>,
    /// Whether the department picker is enabled.
    pub can_pick_department: bool,
    /// Whether the section picker is enabled.
    pub can_pick_section: bool,
    /// Whether the team picker is enabled.
    pub can_pick_team: bool,
    /// The initial filter selection for this actor.
    pub default_filter: FilterSpec,
}

impl Scope {
    fn view_only(default_filter: FilterSpec) -> Self {
        Self {
            is_admin: false,
            editable_department_ids: BTreeSet::new(),
            editable_section_ids: BTreeSet::new(),
            editable_team_ids: BTreeSet::new(),
            can_pick_department: false,
            can_pick_section: false,
            can_pick_team: false,
            default_filter,
        }
    }

    /// Returns whether the actor may edit anyone at all.
    ///
    /// Callers hide edit actions when this is false.
    #[must_use]
    pub fn has_edit_scope(&self) -> bool {
        self.is_admin
            || !self.editable_department_ids.is_empty()
            || !self.editable_section_ids.is_empty()
            || !self.editable_team_ids.is_empty()
    }

    /// Returns whether the actor may edit an employee.
    #[must_use]
    pub fn can_edit(&self, employee: &Employee) -> bool {
        let path = employee.org_path;
        self.is_admin
            || path
                .team_id
                .is_some_and(|id| self.editable_team_ids.contains(&id))
            || path
                .section_id
                .is_some_and(|id| self.editable_section_ids.contains(&id))
            || path
                .department_id
                .is_some_and(|id| self.editable_department_ids.contains(&id))
    }

    /// Resets the org levels the actor may not pick to their pinned values.
    pub fn constrain(&self, filter: &mut FilterSpec) {
        if !self.can_pick_department {
            filter
                .department_ids
                .clone_from(&self.default_filter.department_ids);
        }
        if !self.can_pick_section {
            filter
                .section_ids
                .clone_from(&self.default_filter.section_ids);
        }
        if !self.can_pick_team {
            filter.team_ids.clone_from(&self.default_filter.team_ids);
        }
    }

    /// Re-checks a change-set against this scope.
    ///
    /// An update for an employee missing from `roster` counts as a violation.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ScopeViolation` listing every offending employee.
    pub fn ensure_editable(&self, updates: &[Update], roster: &[Employee]) -> Result<(), CoreError> {
        let employee_ids: Vec<i64> = updates
            .iter()
            .filter(|update| {
                !roster
                    .iter()
                    .find(|e| e.id == update.employee_id)
                    .is_some_and(|e| self.can_edit(e))
            })
            .map(|update| update.employee_id)
            .collect();

        if employee_ids.is_empty() {
            Ok(())
        } else {
            Err(CoreError::ScopeViolation { employee_ids })
        }
    }
}

/// Computes an actor's scope within the hierarchy.
///
/// Priority is team, then section, then department. An actor with no
/// `commands_*` pointer gets a view-only scope whose default filter is their
/// assigned node, if any.
///
/// # Arguments
///
/// * `actor` - The acting employee
/// * `hierarchy` - The org tree used to resolve ancestors and descendants
///
/// # Returns
///
/// * The editable node sets, picker flags and default filter for `actor`
#[must_use]
pub fn resolve_scope(actor: &Actor, hierarchy: &OrgHierarchy) -> Scope {
    if actor.is_admin {
        return Scope {
            is_admin: true,
            editable_department_ids: hierarchy.departments().iter().map(|d| d.id).collect(),
            editable_section_ids: hierarchy.sections().map(|(_, s)| s.id).collect(),
            editable_team_ids: hierarchy.teams().map(|(_, t)| t.id).collect(),
            can_pick_department: true,
            can_pick_section: true,
            can_pick_team: true,
            default_filter: FilterSpec::default(),
        };
    }

    if let Some(team_id) = actor.commands_team_id {
        let section_id: Option<i64> = hierarchy.section_of_team(team_id);
        let department_id: Option<i64> =
            section_id.and_then(|s| hierarchy.department_of_section(s));

        return Scope {
            editable_team_ids: BTreeSet::from([team_id]),
            ..Scope::view_only(FilterSpec::for_org(department_id, section_id, Some(team_id)))
        };
    }

    if let Some(section_id) = actor.commands_section_id {
        let department_id: Option<i64> = hierarchy.department_of_section(section_id);

        return Scope {
            editable_section_ids: BTreeSet::from([section_id]),
            editable_team_ids: hierarchy.team_ids_in(section_id).into_iter().collect(),
            can_pick_team: true,
            ..Scope::view_only(FilterSpec::for_org(department_id, Some(section_id), None))
        };
    }

    if let Some(department_id) = actor.commands_department_id {
        let section_ids: Vec<i64> = hierarchy.section_ids_in(department_id);
        let team_ids: BTreeSet<i64> = section_ids
            .iter()
            .flat_map(|s| hierarchy.team_ids_in(*s))
            .collect();

        return Scope {
            editable_department_ids: BTreeSet::from([department_id]),
            editable_section_ids: section_ids.into_iter().collect(),
            editable_team_ids: team_ids,
            can_pick_section: true,
            can_pick_team: true,
            ..Scope::view_only(FilterSpec::for_org(Some(department_id), None, None))
        };
    }

    let default_filter: FilterSpec = match (actor.assigned_section_id, actor.assigned_department_id)
    {
        (Some(section_id), department_id) => FilterSpec::for_org(
            department_id.or_else(|| hierarchy.department_of_section(section_id)),
            Some(section_id),
            None,
        ),
        (None, Some(department_id)) => FilterSpec::for_org(Some(department_id), None, None),
        (None, None) => FilterSpec::default(),
    };
    Scope::view_only(default_filter)
}

/// Org nodes a filter control may offer to an actor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrgOptions {
    /// Offered departments.
    pub departments: Vec<OrgNode>,
    /// Offered sections.
    pub sections: Vec<OrgNode>,
    /// Offered teams.
    pub teams: Vec<OrgNode>,
}

/// Lists the org nodes a filter control may offer under a scope.
///
/// Non-admins are limited to the subtree their default filter pins.
#[must_use]
pub fn org_options(hierarchy: &OrgHierarchy, scope: &Scope) -> OrgOptions {
    let pinned: &FilterSpec = &scope.default_filter;
    let allowed = |set: &BTreeSet<i64>, id: i64| scope.is_admin || set.is_empty() || set.contains(&id);

    let mut options: OrgOptions = OrgOptions::default();
    let mut offered_departments: BTreeSet<i64> = BTreeSet::new();
    let mut offered_sections: BTreeSet<i64> = BTreeSet::new();

    for node in hierarchy.nodes() {
        match node.kind {
            OrgKind::Department if allowed(&pinned.department_ids, node.id) => {
                offered_departments.insert(node.id);
                options.departments.push(node);
            }
            OrgKind::Section
                if allowed(&pinned.section_ids, node.id)
                    && node
                        .parent_id
                        .is_some_and(|p| offered_departments.contains(&p)) =>
            {
                offered_sections.insert(node.id);
                options.sections.push(node);
            }
            OrgKind::Team
                if allowed(&pinned.team_ids, node.id)
                    && node.parent_id.is_some_and(|p| offered_sections.contains(&p)) =>
            {
                options.teams.push(node);
            }
            _ => {}
        }
    }

    options
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The bulk attendance reconciliation store.
//!
//! The store owns one edit session at a time: a baseline roster, one
//! [`StagedEdit`] per employee and a selection set. The methods on
//! [`ReconciliationStore`] are the only way to change staged state.
//!
//! ## Invariants
//!
//! - Every employee in the baseline has exactly one staged edit
//! - `is_changed` is always `status_type_id != baseline status type id`
//! - Mutators are total: unknown employee or status type ids are no-ops
//! - `initialize` discards all previous session state
//! - At most one submission is in flight per session

use crate::delegation::DelegationRule;
use crate::error::CoreError;
use crate::filter::{FilterSpec, apply_filter};
use rollcall_domain::{Actor, Employee, StatusType, iso_date};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use time::Date;
use tracing::debug;

/// Which end of a status interval an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    /// Interval start.
    Start,
    /// Interval end.
    End,
}

/// Uncommitted status state for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedEdit {
    /// The employee this edit belongs to.
    pub employee_id: i64,
    /// Staged status type, [`StatusType::NONE_ID`] when none is chosen.
    pub status_type_id: i64,
    /// Display name of the staged status.
    pub status_name: String,
    /// Display color of the staged status.
    pub color: String,
    /// Staged interval start.
    #[serde(default, with = "iso_date::option")]
    pub start_date: Option<Date>,
    /// Staged interval end.
    #[serde(default, with = "iso_date::option")]
    pub end_date: Option<Date>,
    /// The user edited any field of this row.
    pub touched: bool,
    /// The staged status differs from the baseline status.
    pub is_changed: bool,
}

impl StagedEdit {
    /// Seeds an edit from an employee's baseline.
    ///
    /// A missing start date defaults to `today`.
    #[must_use]
    pub fn from_baseline(employee: &Employee, today: Date) -> Self {
        match &employee.current_status {
            Some(status) => Self {
                employee_id: employee.id,
                status_type_id: status.status_type_id,
                status_name: status.status_name.clone(),
                color: status.color.clone(),
                start_date: Some(status.start_date),
                end_date: status.end_date,
                touched: false,
                is_changed: false,
            },
            None => Self {
                employee_id: employee.id,
                status_type_id: StatusType::NONE_ID,
                status_name: String::new(),
                color: String::new(),
                start_date: Some(today),
                end_date: None,
                touched: false,
                is_changed: false,
            },
        }
    }

    /// Returns whether the row was touched or its status changed.
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.touched || self.is_changed
    }

    fn stage_status(&mut self, status_type: &StatusType, baseline_status_type_id: i64) {
        self.status_type_id = status_type.id;
        self.status_name.clone_from(&status_type.name);
        self.color.clone_from(&status_type.color);
        self.touched = true;
        self.is_changed = status_type.id != baseline_status_type_id;
    }

    fn stage_date(&mut self, field: DateField, value: Option<Date>) {
        match field {
            DateField::Start => self.start_date = value,
            DateField::End => self.end_date = value,
        }
        self.touched = true;
    }

    /// Converts this edit into a submission entry.
    #[must_use]
    pub const fn to_update(&self) -> Update {
        Update {
            employee_id: self.employee_id,
            status_type_id: self.status_type_id,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// One entry of a change-set, in the shape the bulk-update service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    /// The employee to update.
    pub employee_id: i64,
    /// The new status type.
    pub status_type_id: i64,
    /// The new interval start.
    #[serde(default, with = "iso_date::option")]
    pub start_date: Option<Date>,
    /// The new interval end.
    #[serde(default, with = "iso_date::option")]
    pub end_date: Option<Date>,
}

/// Proof that a submission was started from a particular session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    session: u64,
}

impl SubmissionTicket {
    /// The session the submission belongs to.
    #[must_use]
    pub const fn session(&self) -> u64 {
        self.session
    }
}

/// Row counts for badges and confirmation prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreSummary {
    /// Rows in the session.
    pub total: usize,
    /// Rows passing the current filter.
    pub visible: usize,
    /// Rows in the selection set.
    pub selected: usize,
    /// Rows the user edited.
    pub touched: usize,
    /// Rows whose status differs from baseline.
    pub changed: usize,
}

/// Staged edits, selection and filter for one reconciliation session.
#[derive(Debug, Clone)]
pub struct ReconciliationStore {
    status_types: Vec<StatusType>,
    today: Date,
    employees: Vec<Employee>,
    edits: HashMap<i64, StagedEdit>,
    selection: BTreeSet<i64>,
    filter: FilterSpec,
    session: u64,
    open: bool,
    in_flight: Option<u64>,
}

impl ReconciliationStore {
    /// Creates a closed store.
    ///
    /// # Arguments
    ///
    /// * `status_types` - The known status types
    /// * `today` - The date used to seed missing start dates
    #[must_use]
    pub fn new(status_types: Vec<StatusType>, today: Date) -> Self {
        Self {
            status_types,
            today,
            employees: Vec::new(),
            edits: HashMap::new(),
            selection: BTreeSet::new(),
            filter: FilterSpec::default(),
            session: 0,
            open: false,
            in_flight: None,
        }
    }

    /// Replaces the status types and the date used by the next session.
    ///
    /// Long-lived stores call this before `initialize` so that session
    /// numbers keep increasing across reopened sessions.
    pub fn set_reference_data(&mut self, status_types: Vec<StatusType>, today: Date) {
        self.status_types = status_types;
        self.today = today;
    }

    /// Opens a fresh session over `employees`.
    ///
    /// Any previous session is discarded, including an in-flight submission.
    ///
    /// # Arguments
    ///
    /// * `employees` - The prepared roster, in display order
    /// * `preselected_ids` - Employees to select up front. When non-empty the
    ///   filter switches to selected-only; ids not in the roster are dropped
    pub fn initialize(&mut self, employees: Vec<Employee>, preselected_ids: &[i64]) {
        self.session += 1;
        self.open = true;
        self.in_flight = None;
        self.edits = employees
            .iter()
            .map(|e| (e.id, StagedEdit::from_baseline(e, self.today)))
            .collect();
        self.employees = employees;

        let edits: &HashMap<i64, StagedEdit> = &self.edits;
        self.selection = preselected_ids
            .iter()
            .copied()
            .filter(|id| edits.contains_key(id))
            .collect();
        self.filter = if preselected_ids.is_empty() {
            FilterSpec::default()
        } else {
            FilterSpec {
                selected_only: Some(true),
                ..FilterSpec::default()
            }
        };

        debug!(
            session = self.session,
            rows = self.employees.len(),
            selected = self.selection.len(),
            "Initialized reconciliation session"
        );
    }

    /// Closes the session and discards its state.
    ///
    /// A submission still in flight will be reported as abandoned.
    pub fn close(&mut self) {
        self.open = false;
        self.in_flight = None;
        self.employees.clear();
        self.edits.clear();
        self.selection.clear();
        self.filter = FilterSpec::default();
    }

    /// Returns whether a session is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Returns the current session number.
    #[must_use]
    pub const fn session(&self) -> u64 {
        self.session
    }

    /// Returns the date used to seed missing start dates.
    #[must_use]
    pub const fn today(&self) -> Date {
        self.today
    }

    /// Returns the known status types.
    #[must_use]
    pub fn status_types(&self) -> &[StatusType] {
        &self.status_types
    }

    /// Returns the baseline roster in roster order.
    #[must_use]
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// Returns the baseline record of an employee.
    #[must_use]
    pub fn employee(&self, employee_id: i64) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == employee_id)
    }

    /// Returns the staged edit of an employee.
    #[must_use]
    pub fn staged(&self, employee_id: i64) -> Option<&StagedEdit> {
        self.edits.get(&employee_id)
    }

    /// Returns every staged edit in roster order.
    #[must_use]
    pub fn staged_edits(&self) -> Vec<&StagedEdit> {
        self.employees
            .iter()
            .filter_map(|e| self.edits.get(&e.id))
            .collect()
    }

    /// Returns the selection set.
    #[must_use]
    pub const fn selection(&self) -> &BTreeSet<i64> {
        &self.selection
    }

    /// Returns whether an employee is selected.
    #[must_use]
    pub fn is_selected(&self, employee_id: i64) -> bool {
        self.selection.contains(&employee_id)
    }

    /// Returns the active filter.
    #[must_use]
    pub const fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    /// Replaces the active filter. Selection is untouched.
    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
    }

    /// Returns the employees passing the active filter, in roster order.
    #[must_use]
    pub fn visible_employees(&self) -> Vec<&Employee> {
        apply_filter(&self.employees, &self.filter, &self.selection)
    }

    /// Returns the ids of the employees passing the active filter.
    #[must_use]
    pub fn visible_employee_ids(&self) -> Vec<i64> {
        self.visible_employees().iter().map(|e| e.id).collect()
    }

    fn find_status_type(&self, status_type_id: i64) -> Option<StatusType> {
        self.status_types
            .iter()
            .find(|s| s.id == status_type_id)
            .cloned()
    }

    fn baseline_status_type_id(&self, employee_id: i64) -> i64 {
        self.employee(employee_id)
            .map_or(StatusType::NONE_ID, Employee::baseline_status_type_id)
    }

    /// Stages a status for one employee.
    ///
    /// Unknown status types and employees are ignored.
    pub fn set_individual_status(&mut self, employee_id: i64, status_type_id: i64) {
        let Some(status_type) = self.find_status_type(status_type_id) else {
            debug!(employee_id, status_type_id, "Ignoring unknown status type");
            return;
        };
        let baseline: i64 = self.baseline_status_type_id(employee_id);
        match self.edits.get_mut(&employee_id) {
            Some(edit) => edit.stage_status(&status_type, baseline),
            None => debug!(employee_id, "Ignoring status change for unknown employee"),
        }
    }

    /// Stages one interval date for one employee.
    ///
    /// Always marks the row touched, even if the value equals the baseline.
    pub fn set_individual_dates(&mut self, employee_id: i64, field: DateField, value: Option<Date>) {
        match self.edits.get_mut(&employee_id) {
            Some(edit) => edit.stage_date(field, value),
            None => debug!(employee_id, "Ignoring date change for unknown employee"),
        }
    }

    /// Adds or removes the given visible ids from the selection.
    ///
    /// Ids outside `visible_ids` are never affected, so selections made under
    /// another filter survive.
    pub fn select_all(&mut self, visible_ids: &[i64], checked: bool) {
        for id in visible_ids {
            if checked {
                if self.edits.contains_key(id) {
                    self.selection.insert(*id);
                }
            } else {
                self.selection.remove(id);
            }
        }
    }

    /// Adds or removes every employee passing the active filter.
    pub fn select_all_visible(&mut self, checked: bool) {
        let visible_ids: Vec<i64> = self.visible_employee_ids();
        self.select_all(&visible_ids, checked);
    }

    /// Adds or removes one employee from the selection.
    pub fn select_one(&mut self, employee_id: i64, checked: bool) {
        if checked {
            if self.edits.contains_key(&employee_id) {
                self.selection.insert(employee_id);
            }
        } else {
            self.selection.remove(&employee_id);
        }
    }

    /// Stages a status for every selected employee.
    ///
    /// Missing start dates are seeded with today; existing ones are kept.
    pub fn apply_batch_status(&mut self, status_type_id: i64) {
        if self.selection.is_empty() || status_type_id == StatusType::NONE_ID {
            return;
        }
        let Some(status_type) = self.find_status_type(status_type_id) else {
            debug!(status_type_id, "Ignoring batch change to unknown status type");
            return;
        };

        let baselines: HashMap<i64, i64> = self
            .employees
            .iter()
            .map(|e| (e.id, e.baseline_status_type_id()))
            .collect();
        for id in &self.selection {
            if let Some(edit) = self.edits.get_mut(id) {
                let baseline: i64 = baselines.get(id).copied().unwrap_or(StatusType::NONE_ID);
                edit.stage_status(&status_type, baseline);
                if edit.start_date.is_none() {
                    edit.start_date = Some(self.today);
                }
            }
        }
    }

    /// Overwrites one interval date for every selected employee.
    pub fn apply_batch_dates(&mut self, field: DateField, value: Option<Date>) {
        for id in &self.selection {
            if let Some(edit) = self.edits.get_mut(id) {
                edit.stage_date(field, value);
            }
        }
    }

    /// Restores an employee's staged edit to baseline and deselects them.
    pub fn revert(&mut self, employee_id: i64) {
        let Some(employee) = self.employees.iter().find(|e| e.id == employee_id) else {
            debug!(employee_id, "Ignoring revert for unknown employee");
            return;
        };
        self.edits.insert(
            employee_id,
            StagedEdit::from_baseline(employee, self.today),
        );
        self.selection.remove(&employee_id);
    }

    /// Returns whether any row is selected, touched or changed.
    #[must_use]
    pub fn has_selection_or_modification(&self) -> bool {
        !self.selection.is_empty() || self.edits.values().any(StagedEdit::is_modified)
    }

    /// Computes the change-set to submit.
    ///
    /// A row is included when it is selected, touched or changed. When no row
    /// anywhere is selected or modified, every row visible under the active
    /// filter is included instead. Rows without a status are always dropped.
    ///
    /// # Returns
    ///
    /// * The updates to send, in roster order
    /// * An empty vector when there is nothing to submit
    #[must_use]
    pub fn compute_change_set(&self) -> Vec<Update> {
        let fallback_to_visible: bool = !self.has_selection_or_modification();
        let visible: HashSet<i64> = if fallback_to_visible {
            self.visible_employee_ids().into_iter().collect()
        } else {
            HashSet::new()
        };

        self.staged_edits()
            .into_iter()
            .filter(|edit| {
                self.selection.contains(&edit.employee_id)
                    || edit.is_modified()
                    || visible.contains(&edit.employee_id)
            })
            .filter(|edit| edit.status_type_id != StatusType::NONE_ID)
            .map(StagedEdit::to_update)
            .collect()
    }

    /// Returns row counts for the current session.
    #[must_use]
    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            total: self.employees.len(),
            visible: self.visible_employees().len(),
            selected: self.selection.len(),
            touched: self.edits.values().filter(|e| e.touched).count(),
            changed: self.edits.values().filter(|e| e.is_changed).count(),
        }
    }

    /// Evaluates the delegation rule against the actor's own staged edit.
    #[must_use]
    pub fn delegation_offer(
        &self,
        rule: &DelegationRule,
        actor: &Actor,
        candidates: &[Employee],
    ) -> bool {
        self.staged(actor.id)
            .is_some_and(|edit| rule.should_offer(actor, actor.id, edit, candidates))
    }

    /// Marks a submission as started.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No session is open
    /// - A submission from this session has not settled yet
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, CoreError> {
        if !self.open {
            return Err(CoreError::SessionClosed);
        }
        if self.in_flight.is_some() {
            return Err(CoreError::SubmissionInFlight);
        }
        self.in_flight = Some(self.session);
        Ok(SubmissionTicket {
            session: self.session,
        })
    }

    /// Marks a submission as settled.
    ///
    /// Returns false when the ticket's session was closed or replaced; the
    /// caller must then ignore the submission result.
    pub fn finish_submission(&mut self, ticket: SubmissionTicket) -> bool {
        if self.open && self.in_flight == Some(ticket.session) && self.session == ticket.session {
            self.in_flight = None;
            true
        } else {
            debug!(
                ticket_session = ticket.session,
                session = self.session,
                "Discarding result for abandoned submission"
            );
            false
        }
    }

    /// Returns whether a submission is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }
}

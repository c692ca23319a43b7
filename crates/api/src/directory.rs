// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! A single-process directory backed by a JSON dataset.
//!
//! The directory implements every provider contract. It is what the HTTP
//! binary serves from and what the tests run against.

use crate::error::ProviderError;
use crate::providers::{
    AppliedUpdate, BulkUpdateRequest, BulkUpdateService, DelegationCandidateProvider,
    RosterProvider, RosterQuery, StatusTypeProvider, StructureProvider,
};
use rollcall::{Delegation, Update};
use rollcall_domain::{
    Actor, CurrentStatus, Employee, OrgHierarchy, StatusClassification, StatusType,
    validate_roster, validate_status_interval,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;
use time::{Date, OffsetDateTime};
use tracing::{debug, info};

/// Everything the directory serves, in its on-disk shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Departments with their nested sections and teams.
    pub hierarchy: OrgHierarchy,
    /// Enumerated status types.
    pub status_types: Vec<StatusType>,
    /// Status classification table.
    #[serde(default)]
    pub classification: StatusClassification,
    /// Every employee, in display order.
    pub roster: Vec<Employee>,
    /// Console operators.
    #[serde(default)]
    pub actors: Vec<Actor>,
}

impl Dataset {
    /// Parses a dataset from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, the hierarchy is invalid or
    /// the roster breaks a baseline invariant.
    pub fn from_json(raw: &str) -> Result<Self, ProviderError> {
        let dataset: Self =
            serde_json::from_str(raw).map_err(|e| ProviderError::InvalidDataset(e.to_string()))?;
        validate_roster(&dataset.roster)
            .map_err(|e| ProviderError::InvalidDataset(e.to_string()))?;
        Ok(dataset)
    }

    /// Reads and parses a dataset file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid dataset.
    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        let raw: String =
            std::fs::read_to_string(path).map_err(|e| ProviderError::DatasetUnreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::from_json(&raw)
    }
}

/// Serves a [`Dataset`] through the provider contracts.
///
/// Committed updates rewrite the roster in place, so the next roster read
/// reflects them.
#[derive(Debug)]
pub struct InMemoryDirectory {
    hierarchy: OrgHierarchy,
    status_types: Vec<StatusType>,
    classification: StatusClassification,
    actors: Vec<Actor>,
    roster: RwLock<Vec<Employee>>,
    delegations: RwLock<Vec<Delegation>>,
}

impl InMemoryDirectory {
    /// Creates a directory over a dataset.
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self {
            hierarchy: dataset.hierarchy,
            status_types: dataset.status_types,
            classification: dataset.classification,
            actors: dataset.actors,
            roster: RwLock::new(dataset.roster),
            delegations: RwLock::new(Vec::new()),
        }
    }

    /// Looks up an actor.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::UnknownActor` if the id is not an actor.
    pub fn actor(&self, actor_id: i64) -> Result<Actor, ProviderError> {
        self.actors
            .iter()
            .find(|a| a.id == actor_id)
            .cloned()
            .ok_or(ProviderError::UnknownActor(actor_id))
    }

    /// Returns every hand-off recorded so far.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage lock is poisoned.
    pub fn delegations(&self) -> Result<Vec<Delegation>, ProviderError> {
        Ok(self
            .delegations
            .read()
            .map_err(|_| ProviderError::Unavailable)?
            .clone())
    }

    fn apply_one(
        &self,
        roster: &mut [Employee],
        update: &Update,
        committed_at: OffsetDateTime,
    ) -> AppliedUpdate {
        let Some(employee) = roster.iter_mut().find(|e| e.id == update.employee_id) else {
            return AppliedUpdate::refused(update.employee_id, "Unknown employee");
        };
        let Some(status_type) = self
            .status_types
            .iter()
            .find(|s| s.id == update.status_type_id)
        else {
            return AppliedUpdate::refused(update.employee_id, "Unknown status type");
        };
        let Some(start_date) = update.start_date else {
            return AppliedUpdate::refused(update.employee_id, "A start date is required");
        };
        if let Err(err) = validate_status_interval(employee.id, start_date, update.end_date) {
            return AppliedUpdate::refused(update.employee_id, &err.to_string());
        }

        employee.current_status = Some(CurrentStatus {
            status_type_id: status_type.id,
            status_name: status_type.name.clone(),
            color: status_type.color.clone(),
            start_date,
            end_date: update.end_date,
        });
        employee.last_status_update = Some(committed_at);
        AppliedUpdate::applied(update.employee_id)
    }
}

impl StructureProvider for InMemoryDirectory {
    fn structure(&self) -> Result<OrgHierarchy, ProviderError> {
        Ok(self.hierarchy.clone())
    }
}

impl StatusTypeProvider for InMemoryDirectory {
    fn status_types(&self) -> Result<Vec<StatusType>, ProviderError> {
        Ok(self.status_types.clone())
    }

    fn classification(&self) -> Result<StatusClassification, ProviderError> {
        Ok(self.classification.clone())
    }
}

fn covers(status: &CurrentStatus, date: Date) -> bool {
    status.start_date <= date && status.end_date.is_none_or(|end| date <= end)
}

impl RosterProvider for InMemoryDirectory {
    fn roster(&self, query: &RosterQuery) -> Result<Vec<Employee>, ProviderError> {
        let roster = self.roster.read().map_err(|_| ProviderError::Unavailable)?;
        let narrowed: Vec<Employee> = roster
            .iter()
            .filter(|e| {
                query
                    .department_id
                    .is_none_or(|id| e.org_path.department_id == Some(id))
                    && query
                        .section_id
                        .is_none_or(|id| e.org_path.section_id == Some(id))
                    && query.team_id.is_none_or(|id| e.org_path.team_id == Some(id))
            })
            .cloned()
            .map(|mut e| {
                if let Some(date) = query.date
                    && e.current_status.as_ref().is_some_and(|s| !covers(s, date))
                {
                    e.current_status = None;
                }
                e
            })
            .collect();

        debug!(rows = narrowed.len(), "Served roster");
        Ok(narrowed)
    }
}

impl DelegationCandidateProvider for InMemoryDirectory {
    /// Active members of the unit the actor commands, excluding the actor.
    fn delegation_candidates(&self, actor: &Actor) -> Result<Vec<Employee>, ProviderError> {
        let roster = self.roster.read().map_err(|_| ProviderError::Unavailable)?;
        let in_unit = |e: &Employee| {
            if let Some(team_id) = actor.commands_team_id {
                e.org_path.team_id == Some(team_id)
            } else if let Some(section_id) = actor.commands_section_id {
                e.org_path.section_id == Some(section_id)
            } else if let Some(department_id) = actor.commands_department_id {
                e.org_path.department_id == Some(department_id)
            } else {
                false
            }
        };

        Ok(roster
            .iter()
            .filter(|e| e.id != actor.id && e.is_active && in_unit(e))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl BulkUpdateService for InMemoryDirectory {
    async fn apply_updates(
        &self,
        request: BulkUpdateRequest,
    ) -> Result<Vec<AppliedUpdate>, ProviderError> {
        if request.updates.is_empty() {
            return Err(ProviderError::Rejected(String::from("empty change-set")));
        }

        let committed_at: OffsetDateTime = OffsetDateTime::now_utc();
        let results: Vec<AppliedUpdate> = {
            let mut roster = self.roster.write().map_err(|_| ProviderError::Unavailable)?;
            request
                .updates
                .iter()
                .map(|update| self.apply_one(&mut roster, update, committed_at))
                .collect()
        };

        if let Some(delegation) = request.delegation {
            self.delegations
                .write()
                .map_err(|_| ProviderError::Unavailable)?
                .push(delegation);
            info!(
                commander_id = delegation.commander_id,
                delegate_id = delegation.delegate_id,
                "Recorded command delegation"
            );
        }

        info!(
            entries = results.len(),
            failed = results.iter().filter(|r| !r.success).count(),
            "Applied bulk update"
        );
        Ok(results)
    }
}

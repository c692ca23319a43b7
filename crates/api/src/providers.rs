// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contracts for the systems the reconciliation core talks to.
//!
//! Every provider is synchronous except the bulk-update service, which is
//! the only suspension point of a reconciliation session.

use crate::error::ProviderError;
use rollcall::{Delegation, FilterSpec, Update};
use rollcall_domain::{Actor, Employee, OrgHierarchy, StatusClassification, StatusType, iso_date};
use serde::{Deserialize, Serialize};
use time::Date;

/// Supplies the organizational tree.
pub trait StructureProvider {
    /// Returns the validated hierarchy.
    ///
    /// # Errors
    ///
    /// Returns an error if the structure cannot be loaded.
    fn structure(&self) -> Result<OrgHierarchy, ProviderError>;
}

/// Supplies status types and their classification.
pub trait StatusTypeProvider {
    /// Returns the enumerated status types.
    ///
    /// # Errors
    ///
    /// Returns an error if the status types cannot be loaded.
    fn status_types(&self) -> Result<Vec<StatusType>, ProviderError>;

    /// Returns the classification table maintained alongside the status types.
    ///
    /// # Errors
    ///
    /// Returns an error if the table cannot be loaded.
    fn classification(&self) -> Result<StatusClassification, ProviderError>;
}

/// How a roster view is narrowed before it reaches the core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterQuery {
    /// Only statuses in effect on this day are reported. `None` reports
    /// every current status as-is.
    #[serde(with = "iso_date::option")]
    pub date: Option<Date>,
    /// Department narrowing.
    pub department_id: Option<i64>,
    /// Section narrowing.
    pub section_id: Option<i64>,
    /// Team narrowing.
    pub team_id: Option<i64>,
}

/// Supplies employee records for a view.
pub trait RosterProvider {
    /// Returns the employees matching a query, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be loaded.
    fn roster(&self, query: &RosterQuery) -> Result<Vec<Employee>, ProviderError>;
}

/// Supplies stand-in commanders.
pub trait DelegationCandidateProvider {
    /// Returns the peers who may take over command from `actor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidates cannot be loaded.
    fn delegation_candidates(&self, actor: &Actor) -> Result<Vec<Employee>, ProviderError>;
}

/// A change-set and its optional hand-off of command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    /// The entries to apply.
    pub updates: Vec<Update>,
    /// The hand-off to record alongside the updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delegation: Option<Delegation>,
}

/// The per-item outcome of a bulk update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedUpdate {
    /// The employee the entry targeted.
    pub employee_id: i64,
    /// Whether the entry was applied.
    pub success: bool,
    /// Why the entry failed, when it did.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AppliedUpdate {
    /// An applied entry.
    #[must_use]
    pub const fn applied(employee_id: i64) -> Self {
        Self {
            employee_id,
            success: true,
            message: None,
        }
    }

    /// A refused entry.
    #[must_use]
    pub fn refused(employee_id: i64, message: &str) -> Self {
        Self {
            employee_id,
            success: false,
            message: Some(message.to_string()),
        }
    }
}

/// Commits change-sets.
#[async_trait::async_trait]
pub trait BulkUpdateService: Send + Sync {
    /// Applies a change-set and reports a result per entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request as a whole could not be processed.
    async fn apply_updates(
        &self,
        request: BulkUpdateRequest,
    ) -> Result<Vec<AppliedUpdate>, ProviderError>;
}

/// Opaque string storage for per-actor UI preferences.
pub trait PreferenceStore {
    /// Returns the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be reached.
    fn load(&self, key: &str) -> Result<Option<String>, ProviderError>;

    /// Stores a blob under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be reached.
    fn store(&self, key: &str, value: String) -> Result<(), ProviderError>;

    /// Loads the last-used filter for a view.
    ///
    /// Missing, unreadable and corrupt entries all read as no saved filter.
    fn load_filter_preference(&self, actor_id: i64, view: &str) -> Option<FilterSpec> {
        crate::preferences::load_filter(self, actor_id, view)
    }

    /// Saves the last-used filter for a view.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter cannot be encoded or stored.
    fn save_filter_preference(
        &self,
        actor_id: i64,
        view: &str,
        filter: &FilterSpec,
    ) -> Result<(), ProviderError> {
        crate::preferences::save_filter(self, actor_id, view, filter)
    }
}

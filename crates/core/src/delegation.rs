// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Command delegation for commanders who mark themselves absent.

use crate::store::StagedEdit;
use rollcall_domain::{Actor, Employee, StatusCategory, StatusClassification, StatusType};
use serde::{Deserialize, Serialize};

/// A temporary hand-off of command, sent alongside a change-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    /// The commander going unavailable.
    pub commander_id: i64,
    /// The stand-in commander.
    pub delegate_id: i64,
    /// The team being handed over, when the commander leads a team.
    pub team_id: Option<i64>,
}

/// Decides when to offer a command hand-off and validates the chosen delegate.
#[derive(Debug, Clone, Default)]
pub struct DelegationRule {
    classification: StatusClassification,
}

impl DelegationRule {
    /// Creates a rule backed by a status classification table.
    #[must_use]
    pub const fn new(classification: StatusClassification) -> Self {
        Self { classification }
    }

    /// Returns the classification table in use.
    #[must_use]
    pub const fn classification(&self) -> &StatusClassification {
        &self.classification
    }

    /// Returns whether a hand-off offer must be shown.
    ///
    /// True only for a commander staging a chosen, non-present status on
    /// their own row while at least one candidate exists. Status types
    /// missing from the table are judged by name (see
    /// [`rollcall_domain::PRESENCE_WORDS`]).
    #[must_use]
    pub fn should_offer(
        &self,
        actor: &Actor,
        target_employee_id: i64,
        staged: &StagedEdit,
        candidates: &[Employee],
    ) -> bool {
        actor.is_commander
            && target_employee_id == actor.id
            && !candidates.is_empty()
            && staged.status_type_id != StatusType::NONE_ID
            && self
                .classification
                .classify(staged.status_type_id, &staged.status_name)
                != StatusCategory::Present
    }

    /// Returns whether `delegate_id` is one of the supplied candidates.
    #[must_use]
    pub fn validate(delegate_id: i64, candidates: &[Employee]) -> bool {
        candidates.iter().any(|c| c.id == delegate_id)
    }

    /// Builds the delegation payload, or `None` when it must be omitted.
    #[must_use]
    pub fn payload(
        actor: &Actor,
        delegate_id: Option<i64>,
        candidates: &[Employee],
    ) -> Option<Delegation> {
        let delegate_id: i64 = delegate_id?;
        if delegate_id == actor.id || !Self::validate(delegate_id, candidates) {
            return None;
        }
        Some(Delegation {
            commander_id: actor.id,
            delegate_id,
            team_id: actor.commands_team_id,
        })
    }
}

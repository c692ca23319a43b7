// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rollcall_domain::DomainError;

/// Errors that can occur in the reconciliation core.
///
/// Staged-edit mutators never return these; invalid ids there are no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A change-set targets employees outside the actor's edit scope.
    ScopeViolation {
        /// The offending employee ids, in change-set order.
        employee_ids: Vec<i64>,
    },
    /// A submission from this store has not settled yet.
    SubmissionInFlight,
    /// The store has been closed or was never initialized.
    SessionClosed,
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::ScopeViolation { employee_ids } => {
                let ids: Vec<String> = employee_ids.iter().map(ToString::to_string).collect();
                write!(
                    f,
                    "Scope violation: employees [{}] are outside the actor's edit scope",
                    ids.join(", ")
                )
            }
            Self::SubmissionInFlight => write!(f, "A submission is already in progress"),
            Self::SessionClosed => write!(f, "The edit session is closed"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}

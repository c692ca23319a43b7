// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use rollcall::CoreError;
use rollcall_domain::DomainError;
use thiserror::Error;

/// Failures reported by a provider or the bulk-update service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The dataset could not be read.
    #[error("Failed to read dataset '{path}': {message}")]
    DatasetUnreadable {
        /// Where the dataset was expected.
        path: String,
        /// The underlying I/O or parse failure.
        message: String,
    },
    /// The dataset was read but is not valid.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),
    /// No actor with this id is known to the directory.
    #[error("Unknown actor {0}")]
    UnknownActor(i64),
    /// The bulk-update service refused the request as a whole.
    #[error("Bulk update rejected: {0}")]
    Rejected(String),
    /// Backing storage could not be reached.
    #[error("Provider storage is unavailable")]
    Unavailable,
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A domain rule was violated.
    #[error("Domain rule violation ({rule}): {message}")]
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The change-set is empty. Callers show "nothing to update".
    #[error("Nothing to update")]
    NothingToSubmit,
    /// The change-set targets employees outside the actor's edit scope.
    #[error("Scope violation: employees {employee_ids:?} are outside the actor's edit scope")]
    ScopeViolation {
        /// Offending employee ids.
        employee_ids: Vec<i64>,
    },
    /// A submission from this session has not settled yet.
    #[error("A submission is already in progress")]
    SubmissionInFlight,
    /// No edit session is open.
    #[error("No edit session is open")]
    SessionClosed,
    /// The bulk-update service failed. Staged state is preserved.
    #[error("Submission failed: {message}")]
    SubmissionFailed {
        /// The service's failure description.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidNodeName { .. } => ApiError::InvalidInput {
            field: String::from("name"),
            message,
        },
        DomainError::DuplicateNodeId { .. } => ApiError::DomainRuleViolation {
            rule: String::from("unique_node_id"),
            message,
        },
        DomainError::DuplicateNodeName { .. } => ApiError::DomainRuleViolation {
            rule: String::from("unique_sibling_name"),
            message,
        },
        DomainError::InvalidStatusInterval { .. } => ApiError::InvalidInput {
            field: String::from("end_date"),
            message,
        },
        DomainError::DuplicatePersonalNumber(_) => ApiError::DomainRuleViolation {
            rule: String::from("unique_personal_number"),
            message,
        },
        DomainError::InvalidTimezone(_) => ApiError::InvalidInput {
            field: String::from("timezone"),
            message,
        },
        DomainError::DateConversion(_) => ApiError::Internal { message },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::ScopeViolation { employee_ids } => ApiError::ScopeViolation { employee_ids },
        CoreError::SubmissionInFlight => ApiError::SubmissionInFlight,
        CoreError::SessionClosed => ApiError::SessionClosed,
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        translate_core_error(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        translate_domain_error(err)
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UnknownActor(id) => Self::ResourceNotFound {
                resource_type: String::from("Actor"),
                message: format!("Actor {id} does not exist"),
            },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}

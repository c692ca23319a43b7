// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The submission pipeline.
//!
//! A submission runs in three steps so that callers never hold the store
//! across the service call:
//!
//! 1. [`prepare_submission`] computes and checks the change-set and takes the
//!    store's submission ticket
//! 2. [`submit`] awaits the bulk-update service
//! 3. [`finish_submission`] hands the ticket back; if the session was closed
//!    or replaced meanwhile the result is reported as abandoned
//!
//! Staged state is never modified by a submission. After a successful
//! submission callers reload the roster and re-initialize the store.

use crate::error::ApiError;
use crate::providers::{AppliedUpdate, BulkUpdateRequest, BulkUpdateService};
use rollcall::{Delegation, ReconciliationStore, Scope, SubmissionTicket, Update};
use rollcall_domain::validate_status_interval;
use tracing::{error, info, warn};

/// A checked change-set holding the store's submission ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedSubmission {
    /// The ticket to hand back through [`finish_submission`].
    pub ticket: SubmissionTicket,
    /// The request for the bulk-update service.
    pub request: BulkUpdateRequest,
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The service answered. Individual entries may still have failed.
    Applied {
        /// Per-entry results.
        results: Vec<AppliedUpdate>,
    },
    /// The service call failed. Staged state is preserved for a retry.
    Failed {
        /// What went wrong.
        error: ApiError,
    },
    /// The session was torn down while the call was in flight.
    Abandoned,
}

fn check_intervals(updates: &[Update]) -> Result<(), ApiError> {
    for update in updates {
        let Some(start_date) = update.start_date else {
            return Err(ApiError::InvalidInput {
                field: String::from("start_date"),
                message: format!("Status for employee {} has no start date", update.employee_id),
            });
        };
        validate_status_interval(update.employee_id, start_date, update.end_date)?;
    }
    Ok(())
}

/// Computes, checks and claims a change-set for submission.
///
/// # Arguments
///
/// * `store` - The session to submit from
/// * `scope` - The submitting actor's scope
/// * `delegation` - A validated hand-off to send along, if any
///
/// # Errors
///
/// Returns an error if:
/// - No session is open
/// - The change-set is empty
/// - The change-set targets an employee outside the actor's edit scope
/// - A staged interval has no start date or ends before it starts
/// - A submission from this session is already in flight
pub fn prepare_submission(
    store: &mut ReconciliationStore,
    scope: &Scope,
    delegation: Option<Delegation>,
) -> Result<PreparedSubmission, ApiError> {
    if !store.is_open() {
        return Err(ApiError::SessionClosed);
    }

    let updates: Vec<Update> = store.compute_change_set();
    if updates.is_empty() {
        info!(session = store.session(), "Nothing to submit");
        return Err(ApiError::NothingToSubmit);
    }

    scope
        .ensure_editable(&updates, store.employees())
        .map_err(|err| {
            error!(session = store.session(), error = %err, "Refusing out-of-scope submission");
            ApiError::from(err)
        })?;

    check_intervals(&updates)?;

    let ticket: SubmissionTicket = store.begin_submission()?;
    info!(
        session = ticket.session(),
        entries = updates.len(),
        delegated = delegation.is_some(),
        "Prepared submission"
    );

    Ok(PreparedSubmission {
        ticket,
        request: BulkUpdateRequest {
            updates,
            delegation,
        },
    })
}

/// Sends a prepared change-set to the bulk-update service.
///
/// # Errors
///
/// Returns `ApiError::SubmissionFailed` if the service call fails.
pub async fn submit<S>(
    service: &S,
    prepared: &PreparedSubmission,
) -> Result<Vec<AppliedUpdate>, ApiError>
where
    S: BulkUpdateService + ?Sized,
{
    service
        .apply_updates(prepared.request.clone())
        .await
        .map_err(|err| {
            error!(session = prepared.ticket.session(), error = %err, "Bulk update failed");
            ApiError::SubmissionFailed {
                message: err.to_string(),
            }
        })
}

/// Settles a submission against the store it was prepared from.
pub fn finish_submission(
    store: &mut ReconciliationStore,
    ticket: SubmissionTicket,
    result: Result<Vec<AppliedUpdate>, ApiError>,
) -> SubmissionOutcome {
    if !store.finish_submission(ticket) {
        warn!(session = ticket.session(), "Ignoring result of abandoned submission");
        return SubmissionOutcome::Abandoned;
    }

    match result {
        Ok(results) => {
            info!(
                session = ticket.session(),
                applied = results.iter().filter(|r| r.success).count(),
                refused = results.iter().filter(|r| !r.success).count(),
                "Submission settled"
            );
            SubmissionOutcome::Applied { results }
        }
        Err(error) => SubmissionOutcome::Failed { error },
    }
}

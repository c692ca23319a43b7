// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

//! The boundary between the reconciliation core and the systems around it.
//!
//! This crate defines the provider contracts the core consumes, an in-memory
//! directory implementing all of them, filter-preference persistence and the
//! submission pipeline.

mod directory;
mod error;
mod preferences;
mod providers;
mod submission;

#[cfg(test)]
mod tests;

pub use directory::{Dataset, InMemoryDirectory};
pub use error::{ApiError, ProviderError, translate_core_error, translate_domain_error};
pub use preferences::{InMemoryPreferences, filter_key};
pub use providers::{
    AppliedUpdate, BulkUpdateRequest, BulkUpdateService, DelegationCandidateProvider,
    PreferenceStore, RosterProvider, RosterQuery, StatusTypeProvider, StructureProvider,
};
pub use submission::{
    PreparedSubmission, SubmissionOutcome, finish_submission, prepare_submission, submit,
};

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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod delegation;
mod error;
mod filter;
mod scope;
mod store;

#[cfg(test)]
mod tests;

pub use delegation::{Delegation, DelegationRule};
pub use error::CoreError;
pub use filter::{FilterSpec, apply_filter, matches_filter, prepare_roster};
pub use scope::{OrgOptions, Scope, org_options, resolve_scope};
pub use store::{
    DateField, ReconciliationStore, StagedEdit, StoreSummary, SubmissionTicket, Update,
};

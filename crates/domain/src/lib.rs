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

mod classification;
mod dates;
mod error;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use classification::{
    PRESENCE_WORDS, StatusCategory, StatusClassification, name_indicates_presence,
};
pub use dates::{iso_date, naive_to_date, today_in_timezone};
pub use error::DomainError;
pub use types::{
    Actor, CurrentStatus, Department, Employee, OrgHierarchy, OrgKind, OrgNode, OrgPath, Section,
    StatusType, Team,
};
pub use validation::{validate_hierarchy, validate_roster, validate_status_interval};

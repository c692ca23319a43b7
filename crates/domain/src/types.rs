// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::dates::iso_date;
use crate::error::DomainError;
use crate::validation::validate_hierarchy;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// The level of a node in the organizational hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgKind {
    /// Top level.
    Department,
    /// Child of a department.
    Section,
    /// Child of a section.
    Team,
}

impl OrgKind {
    /// Converts this kind to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Department => "department",
            Self::Section => "section",
            Self::Team => "team",
        }
    }
}

impl std::fmt::Display for OrgKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A flattened view of a single node in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgNode {
    /// The node identifier, unique within its kind.
    pub id: i64,
    /// The display name, unique within its parent.
    pub name: String,
    /// The parent node identifier (`None` for departments).
    pub parent_id: Option<i64>,
    /// The level of this node.
    pub kind: OrgKind,
}

/// A team, the most specific org unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// The team identifier.
    pub id: i64,
    /// The team name.
    pub name: String,
}

/// A section and the teams beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// The section identifier.
    pub id: i64,
    /// The section name.
    pub name: String,
    /// Teams within this section.
    #[serde(default)]
    pub teams: Vec<Team>,
}

/// A department and the sections beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// The department identifier.
    pub id: i64,
    /// The department name.
    pub name: String,
    /// Sections within this department.
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// The Department → Section → Team tree for a session.
///
/// The hierarchy is validated on construction and immutable afterwards.
/// Structural parent/child relations are guaranteed by the nesting itself;
/// construction checks identifier and sibling-name uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Department>", into = "Vec<Department>")]
pub struct OrgHierarchy {
    departments: Vec<Department>,
}

impl TryFrom<Vec<Department>> for OrgHierarchy {
    type Error = DomainError;

    fn try_from(departments: Vec<Department>) -> Result<Self, Self::Error> {
        Self::new(departments)
    }
}

impl From<OrgHierarchy> for Vec<Department> {
    fn from(hierarchy: OrgHierarchy) -> Self {
        hierarchy.departments
    }
}

impl OrgHierarchy {
    /// Builds a hierarchy from nested department records.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is empty, an identifier is reused within a
    /// kind, or two siblings share a name.
    pub fn new(departments: Vec<Department>) -> Result<Self, DomainError> {
        validate_hierarchy(&departments)?;
        Ok(Self { departments })
    }

    /// Returns all departments in supplied order.
    #[must_use]
    pub fn departments(&self) -> &[Department] {
        &self.departments
    }

    /// Iterates over every section together with its department id.
    pub fn sections(&self) -> impl Iterator<Item = (i64, &Section)> {
        self.departments
            .iter()
            .flat_map(|d| d.sections.iter().map(move |s| (d.id, s)))
    }

    /// Iterates over every team together with its section id.
    pub fn teams(&self) -> impl Iterator<Item = (i64, &Team)> {
        self.sections()
            .flat_map(|(_, s)| s.teams.iter().map(move |t| (s.id, t)))
    }

    /// Looks up a department by id.
    #[must_use]
    pub fn department(&self, id: i64) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }

    /// Looks up a section by id.
    #[must_use]
    pub fn section(&self, id: i64) -> Option<&Section> {
        self.sections().map(|(_, s)| s).find(|s| s.id == id)
    }

    /// Looks up a team by id.
    #[must_use]
    pub fn team(&self, id: i64) -> Option<&Team> {
        self.teams().map(|(_, t)| t).find(|t| t.id == id)
    }

    /// Returns the department that owns a section.
    #[must_use]
    pub fn department_of_section(&self, section_id: i64) -> Option<i64> {
        self.sections()
            .find(|(_, s)| s.id == section_id)
            .map(|(department_id, _)| department_id)
    }

    /// Returns the section that owns a team.
    #[must_use]
    pub fn section_of_team(&self, team_id: i64) -> Option<i64> {
        self.teams()
            .find(|(_, t)| t.id == team_id)
            .map(|(section_id, _)| section_id)
    }

    /// Returns the ids of every section within a department.
    #[must_use]
    pub fn section_ids_in(&self, department_id: i64) -> Vec<i64> {
        self.department(department_id)
            .map(|d| d.sections.iter().map(|s| s.id).collect())
            .unwrap_or_default()
    }

    /// Returns the ids of every team within a section.
    #[must_use]
    pub fn team_ids_in(&self, section_id: i64) -> Vec<i64> {
        self.section(section_id)
            .map(|s| s.teams.iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }

    /// Returns every node as a flat list, parents before children.
    #[must_use]
    pub fn nodes(&self) -> Vec<OrgNode> {
        let mut nodes: Vec<OrgNode> = Vec::new();
        for department in &self.departments {
            nodes.push(OrgNode {
                id: department.id,
                name: department.name.clone(),
                parent_id: None,
                kind: OrgKind::Department,
            });
            for section in &department.sections {
                nodes.push(OrgNode {
                    id: section.id,
                    name: section.name.clone(),
                    parent_id: Some(department.id),
                    kind: OrgKind::Section,
                });
                for team in &section.teams {
                    nodes.push(OrgNode {
                        id: team.id,
                        name: team.name.clone(),
                        parent_id: Some(section.id),
                        kind: OrgKind::Team,
                    });
                }
            }
        }
        nodes
    }
}

/// Where an employee sits in the hierarchy. Any level may be unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrgPath {
    /// The employee's department.
    #[serde(default)]
    pub department_id: Option<i64>,
    /// The employee's section.
    #[serde(default)]
    pub section_id: Option<i64>,
    /// The employee's team.
    #[serde(default)]
    pub team_id: Option<i64>,
}

/// An enumerated attendance status (e.g. "Present", "Sick").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusType {
    /// The status type identifier. Never [`StatusType::NONE_ID`].
    pub id: i64,
    /// The display name.
    pub name: String,
    /// The display color (e.g. `#ef4444`).
    pub color: String,
}

impl StatusType {
    /// Sentinel id meaning "no status".
    pub const NONE_ID: i64 = 0;

    /// Creates a new `StatusType`.
    #[must_use]
    pub fn new(id: i64, name: &str, color: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// The single active status interval of an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentStatus {
    /// The status type.
    pub status_type_id: i64,
    /// The status display name at load time.
    pub status_name: String,
    /// The status display color at load time.
    pub color: String,
    /// First day of the interval.
    #[serde(with = "iso_date")]
    pub start_date: Date,
    /// Last day of the interval, open-ended when unset.
    #[serde(default, with = "iso_date::option")]
    pub end_date: Option<Date>,
}

const fn default_active() -> bool {
    true
}

/// A member of the unit as supplied by the roster provider.
///
/// `personal_number` is the stable business identity; `id` is the internal key.
/// Status fields only change through a committed change-set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Employee {
    /// Internal identifier.
    pub id: i64,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Unique, stable personal number.
    pub personal_number: String,
    /// Position in the hierarchy.
    #[serde(default)]
    pub org_path: OrgPath,
    /// Service type classification.
    #[serde(default)]
    pub service_type_id: Option<i64>,
    /// Role name (free text from the roster provider).
    #[serde(default)]
    pub role_name: Option<String>,
    /// The baseline status, if any.
    #[serde(default)]
    pub current_status: Option<CurrentStatus>,
    /// When the baseline status was last committed.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_status_update: Option<OffsetDateTime>,
    /// Whether the employee is currently active.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Whether the employee commands an org unit.
    #[serde(default)]
    pub is_commander: bool,
    /// Whether the employee is a system administrator.
    #[serde(default)]
    pub is_admin: bool,
    /// Whether the employee holds a security clearance.
    #[serde(default)]
    pub has_security_clearance: bool,
    /// Whether the employee holds a police license.
    #[serde(default)]
    pub has_police_license: bool,
}

impl Employee {
    /// Creates an active employee with no status and no org placement.
    #[must_use]
    pub fn new(id: i64, first_name: &str, last_name: &str, personal_number: &str) -> Self {
        Self {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            personal_number: personal_number.to_string(),
            org_path: OrgPath::default(),
            service_type_id: None,
            role_name: None,
            current_status: None,
            last_status_update: None,
            is_active: true,
            is_commander: false,
            is_admin: false,
            has_security_clearance: false,
            has_police_license: false,
        }
    }

    /// Returns `"first last"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns the baseline status type id, [`StatusType::NONE_ID`] when absent.
    #[must_use]
    pub fn baseline_status_type_id(&self) -> i64 {
        self.current_status
            .as_ref()
            .map_or(StatusType::NONE_ID, |s| s.status_type_id)
    }
}

/// The authenticated person operating the console.
///
/// `id` is the actor's own employee id. A commander normally sets exactly one
/// of the `commands_*` pointers; none set means view-only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Actor {
    /// The actor's employee id.
    pub id: i64,
    /// System administrator flag.
    #[serde(default)]
    pub is_admin: bool,
    /// Commander flag.
    #[serde(default)]
    pub is_commander: bool,
    /// Commanded department.
    #[serde(default)]
    pub commands_department_id: Option<i64>,
    /// Commanded section.
    #[serde(default)]
    pub commands_section_id: Option<i64>,
    /// Commanded team.
    #[serde(default)]
    pub commands_team_id: Option<i64>,
    /// Department the actor belongs to.
    #[serde(default)]
    pub assigned_department_id: Option<i64>,
    /// Section the actor belongs to.
    #[serde(default)]
    pub assigned_section_id: Option<i64>,
}

impl Actor {
    /// Creates a plain, view-only actor.
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP handlers.
//!
//! Each actor owns at most one reconciliation store. Handlers lock the
//! session map only for synchronous store work; the lock is released before
//! the bulk-update call and re-taken to settle the submission.

use axum::{
    Json,
    extract::{Path, State as AxumState},
};
use rollcall::{
    DateField, Delegation, DelegationRule, FilterSpec, OrgOptions, ReconciliationStore, Scope,
    StagedEdit, StoreSummary, Update, apply_filter, org_options, prepare_roster, resolve_scope,
};
use rollcall_api::{
    ApiError, AppliedUpdate, DelegationCandidateProvider, PreferenceStore, PreparedSubmission,
    RosterProvider, RosterQuery, StatusTypeProvider, StructureProvider, SubmissionOutcome,
    finish_submission, prepare_submission, submit,
};
use rollcall_domain::{
    Actor, Employee, OrgHierarchy, StatusClassification, StatusType, iso_date, today_in_timezone,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use time::Date;
use tracing::info;

use crate::session::SessionActor;
use crate::{AppState, HttpError};

/// Response for GET `/scope`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeResponse {
    /// The actor's resolved scope.
    pub scope: Scope,
    /// Org nodes the filter controls may offer.
    pub options: OrgOptions,
}

/// Response for GET `/status_types`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTypesResponse {
    /// Enumerated status types.
    pub status_types: Vec<StatusType>,
    /// Their classification.
    pub classification: StatusClassification,
}

/// Request for POST `/roster/filter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterFilterRequest {
    /// Server-side narrowing.
    pub query: RosterQuery,
    /// Facets applied after narrowing.
    pub filter: FilterSpec,
    /// Include inactive personnel.
    pub include_inactive: bool,
}

/// Response for POST `/roster/filter`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterResponse {
    /// The filter after scope pinning and hierarchy cleanup.
    pub filter: FilterSpec,
    /// Matching employees in roster order.
    pub employees: Vec<Employee>,
}

/// Request for POST `/session/open`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenSessionRequest {
    /// Server-side narrowing of the roster.
    pub query: RosterQuery,
    /// Employees to pre-select. Switches the view to selected-only.
    pub preselected_ids: Vec<i64>,
    /// Include inactive personnel.
    pub include_inactive: bool,
    /// View whose saved filter seeds the session.
    pub view: Option<String>,
    /// Open over the actor's own row only, for a personal status update.
    pub personal: bool,
}

/// One visible row of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowView {
    /// Baseline record.
    pub employee: Employee,
    /// Staged state.
    pub staged: StagedEdit,
    /// Whether the row is in the selection set.
    pub selected: bool,
    /// Whether the actor may submit changes for this row.
    pub editable: bool,
}

/// The state of an actor's session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    /// Session number.
    pub session: u64,
    /// Date used to seed missing start dates.
    #[serde(with = "iso_date")]
    pub today: Date,
    /// Row counts.
    pub summary: StoreSummary,
    /// Active filter.
    pub filter: FilterSpec,
    /// Facets restricting the active filter.
    pub active_facets: usize,
    /// Whether a submission is in flight.
    pub is_submitting: bool,
    /// Whether a command hand-off must be offered before submitting.
    pub delegation_offered: bool,
    /// Rows passing the active filter.
    pub rows: Vec<RowView>,
}

/// Request for POST `/session/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStatusRequest {
    /// The employee to edit.
    pub employee_id: i64,
    /// The status to stage.
    pub status_type_id: i64,
}

/// Request for POST `/session/dates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDateRequest {
    /// The employee to edit.
    pub employee_id: i64,
    /// Which end of the interval.
    pub field: DateField,
    /// The new value, `null` to clear.
    #[serde(default, with = "iso_date::option")]
    pub value: Option<Date>,
}

/// Request for POST `/session/select`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectRequest {
    /// Rows to add or remove. Ignored when `all_visible` is set.
    #[serde(default)]
    pub employee_ids: Vec<i64>,
    /// Apply to every row passing the active filter.
    #[serde(default)]
    pub all_visible: bool,
    /// Add when true, remove when false.
    pub checked: bool,
}

/// Request for POST `/session/batch/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatusRequest {
    /// The status to stage on every selected row.
    pub status_type_id: i64,
}

/// Request for POST `/session/batch/dates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDateRequest {
    /// Which end of the interval.
    pub field: DateField,
    /// The new value, `null` to clear.
    #[serde(default, with = "iso_date::option")]
    pub value: Option<Date>,
}

/// Request for POST `/session/revert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertRequest {
    /// The row to restore.
    pub employee_id: i64,
}

/// Response for GET `/session/changes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangesResponse {
    /// The change-set a submission would send.
    pub updates: Vec<Update>,
}

/// Request for POST `/session/submit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitRequest {
    /// Stand-in commander chosen for the offered hand-off.
    pub delegate_id: Option<i64>,
}

/// How a submit request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitStatus {
    /// The service answered.
    Applied,
    /// The change-set was empty.
    NothingToSubmit,
    /// The session was closed or reopened during the call.
    Abandoned,
}

/// Response for POST `/session/submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// How the request ended.
    pub outcome: SubmitStatus,
    /// Per-entry results when applied.
    pub results: Vec<AppliedUpdate>,
    /// A message for the user.
    pub message: Option<String>,
}

/// Response for GET `/preferences/filter/{view}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterPreferenceResponse {
    /// The saved filter, if any.
    pub filter: Option<FilterSpec>,
}

/// Generic write response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Optional message.
    pub message: Option<String>,
}

fn resolve(state: &AppState, actor: &Actor) -> Result<(OrgHierarchy, Scope), HttpError> {
    let hierarchy: OrgHierarchy = state.directory.structure()?;
    let scope: Scope = resolve_scope(actor, &hierarchy);
    Ok((hierarchy, scope))
}

/// Pins fixed levels and drops org ids orphaned by their parents.
fn normalize_filter(mut filter: FilterSpec, scope: &Scope, hierarchy: &OrgHierarchy) -> FilterSpec {
    scope.constrain(&mut filter);
    let department_ids: BTreeSet<i64> = filter.department_ids.clone();
    filter.set_departments(department_ids, hierarchy);
    let section_ids: BTreeSet<i64> = filter.section_ids.clone();
    filter.set_sections(section_ids, hierarchy);
    filter
}

fn open_store(
    sessions: &mut HashMap<i64, ReconciliationStore>,
    actor_id: i64,
) -> Result<&mut ReconciliationStore, HttpError> {
    sessions
        .get_mut(&actor_id)
        .filter(|store| store.is_open())
        .ok_or_else(|| HttpError::from(ApiError::SessionClosed))
}

fn session_view(
    state: &AppState,
    actor: &Actor,
    scope: &Scope,
    store: &ReconciliationStore,
) -> Result<SessionView, HttpError> {
    let rule: DelegationRule = DelegationRule::new(state.directory.classification()?);
    let candidates: Vec<Employee> = state.directory.delegation_candidates(actor)?;

    let rows: Vec<RowView> = store
        .visible_employees()
        .into_iter()
        .filter_map(|employee| {
            store.staged(employee.id).map(|staged| RowView {
                employee: employee.clone(),
                staged: staged.clone(),
                selected: store.is_selected(employee.id),
                editable: scope.can_edit(employee),
            })
        })
        .collect();

    Ok(SessionView {
        session: store.session(),
        today: store.today(),
        summary: store.summary(),
        filter: store.filter().clone(),
        active_facets: store.filter().active_facet_count(),
        is_submitting: store.is_submitting(),
        delegation_offered: store.delegation_offer(&rule, actor, &candidates),
        rows,
    })
}

/// Runs a synchronous edit against the actor's open session.
async fn edit_session<F>(
    state: &AppState,
    actor: &Actor,
    edit: F,
) -> Result<Json<SessionView>, HttpError>
where
    F: FnOnce(&mut ReconciliationStore, &Scope, &OrgHierarchy),
{
    let (hierarchy, scope) = resolve(state, actor)?;
    let mut sessions = state.sessions.lock().await;
    let store: &mut ReconciliationStore = open_store(&mut sessions, actor.id)?;
    edit(store, &scope, &hierarchy);
    Ok(Json(session_view(state, actor, &scope, store)?))
}

/// Handler for GET `/scope` endpoint.
pub async fn handle_get_scope(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<ScopeResponse>, HttpError> {
    info!(actor_id = actor.id, "Handling get_scope request");

    let (hierarchy, scope) = resolve(&app_state, &actor)?;
    let options: OrgOptions = org_options(&hierarchy, &scope);

    Ok(Json(ScopeResponse { scope, options }))
}

/// Handler for GET `/status_types` endpoint.
pub async fn handle_get_status_types(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<StatusTypesResponse>, HttpError> {
    info!(actor_id = actor.id, "Handling get_status_types request");

    Ok(Json(StatusTypesResponse {
        status_types: app_state.directory.status_types()?,
        classification: app_state.directory.classification()?,
    }))
}

/// Handler for POST `/roster/filter` endpoint.
///
/// Returns the roster as the actor sees it under a filter, without opening
/// an edit session.
pub async fn handle_filter_roster(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<RosterFilterRequest>,
) -> Result<Json<RosterResponse>, HttpError> {
    info!(
        actor_id = actor.id,
        include_inactive = req.include_inactive,
        "Handling filter_roster request"
    );

    let (hierarchy, scope) = resolve(&app_state, &actor)?;
    let filter: FilterSpec = normalize_filter(req.filter, &scope, &hierarchy);
    let roster: Vec<Employee> = prepare_roster(
        &app_state.directory.roster(&req.query)?,
        actor.id,
        req.include_inactive,
    );
    let employees: Vec<Employee> = apply_filter(&roster, &filter, &BTreeSet::new())
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(RosterResponse { filter, employees }))
}

/// Handler for POST `/session/open` endpoint.
///
/// Opens (or reopens) the actor's reconciliation session.
pub async fn handle_open_session(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<OpenSessionRequest>,
) -> Result<Json<SessionView>, HttpError> {
    info!(
        actor_id = actor.id,
        preselected = req.preselected_ids.len(),
        personal = req.personal,
        "Handling open_session request"
    );

    let (hierarchy, scope) = resolve(&app_state, &actor)?;
    let today: Date = today_in_timezone(&app_state.timezone)?;
    let status_types: Vec<StatusType> = app_state.directory.status_types()?;
    let roster: Vec<Employee> = app_state.directory.roster(&req.query)?;
    let employees: Vec<Employee> = if req.personal {
        roster.into_iter().filter(|e| e.id == actor.id).collect()
    } else {
        prepare_roster(&roster, actor.id, req.include_inactive)
    };
    let initial_filter: Option<FilterSpec> = if req.personal || !req.preselected_ids.is_empty() {
        None
    } else {
        let saved: Option<FilterSpec> = req
            .view
            .as_deref()
            .and_then(|view| app_state.preferences.load_filter_preference(actor.id, view));
        Some(normalize_filter(
            saved.unwrap_or_else(|| scope.default_filter.clone()),
            &scope,
            &hierarchy,
        ))
    };

    let mut sessions = app_state.sessions.lock().await;
    let store: &mut ReconciliationStore = sessions
        .entry(actor.id)
        .or_insert_with(|| ReconciliationStore::new(Vec::new(), today));
    store.set_reference_data(status_types, today);
    store.initialize(employees, &req.preselected_ids);
    if let Some(filter) = initial_filter {
        store.set_filter(filter);
    }

    info!(
        actor_id = actor.id,
        session = store.session(),
        rows = store.employees().len(),
        "Opened reconciliation session"
    );

    Ok(Json(session_view(&app_state, &actor, &scope, store)?))
}

/// Handler for GET `/session` endpoint.
pub async fn handle_get_session(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<SessionView>, HttpError> {
    info!(actor_id = actor.id, "Handling get_session request");
    edit_session(&app_state, &actor, |_, _, _| {}).await
}

/// Handler for POST `/session/status` endpoint.
pub async fn handle_set_status(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<SessionView>, HttpError> {
    info!(
        actor_id = actor.id,
        employee_id = req.employee_id,
        status_type_id = req.status_type_id,
        "Handling set_status request"
    );
    edit_session(&app_state, &actor, |store, _, _| {
        store.set_individual_status(req.employee_id, req.status_type_id);
    })
    .await
}

/// Handler for POST `/session/dates` endpoint.
pub async fn handle_set_date(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<SetDateRequest>,
) -> Result<Json<SessionView>, HttpError> {
    info!(
        actor_id = actor.id,
        employee_id = req.employee_id,
        field = ?req.field,
        "Handling set_date request"
    );
    edit_session(&app_state, &actor, |store, _, _| {
        store.set_individual_dates(req.employee_id, req.field, req.value);
    })
    .await
}

/// Handler for POST `/session/select` endpoint.
pub async fn handle_select(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<SelectRequest>,
) -> Result<Json<SessionView>, HttpError> {
    info!(
        actor_id = actor.id,
        rows = req.employee_ids.len(),
        all_visible = req.all_visible,
        checked = req.checked,
        "Handling select request"
    );
    edit_session(&app_state, &actor, |store, _, _| {
        if req.all_visible {
            store.select_all_visible(req.checked);
        } else {
            store.select_all(&req.employee_ids, req.checked);
        }
    })
    .await
}

/// Handler for POST `/session/batch/status` endpoint.
pub async fn handle_batch_status(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<BatchStatusRequest>,
) -> Result<Json<SessionView>, HttpError> {
    info!(
        actor_id = actor.id,
        status_type_id = req.status_type_id,
        "Handling batch_status request"
    );
    edit_session(&app_state, &actor, |store, _, _| {
        store.apply_batch_status(req.status_type_id);
    })
    .await
}

/// Handler for POST `/session/batch/dates` endpoint.
pub async fn handle_batch_dates(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<BatchDateRequest>,
) -> Result<Json<SessionView>, HttpError> {
    info!(actor_id = actor.id, field = ?req.field, "Handling batch_dates request");
    edit_session(&app_state, &actor, |store, _, _| {
        store.apply_batch_dates(req.field, req.value);
    })
    .await
}

/// Handler for POST `/session/revert` endpoint.
pub async fn handle_revert(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<RevertRequest>,
) -> Result<Json<SessionView>, HttpError> {
    info!(
        actor_id = actor.id,
        employee_id = req.employee_id,
        "Handling revert request"
    );
    edit_session(&app_state, &actor, |store, _, _| {
        store.revert(req.employee_id);
    })
    .await
}

/// Handler for POST `/session/filter` endpoint.
pub async fn handle_set_filter(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(filter): Json<FilterSpec>,
) -> Result<Json<SessionView>, HttpError> {
    info!(
        actor_id = actor.id,
        facets = filter.active_facet_count(),
        "Handling set_filter request"
    );
    edit_session(&app_state, &actor, |store, scope, hierarchy| {
        store.set_filter(normalize_filter(filter, scope, hierarchy));
    })
    .await
}

/// Handler for GET `/session/changes` endpoint.
pub async fn handle_get_changes(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<ChangesResponse>, HttpError> {
    info!(actor_id = actor.id, "Handling get_changes request");

    let mut sessions = app_state.sessions.lock().await;
    let store: &mut ReconciliationStore = open_store(&mut sessions, actor.id)?;

    Ok(Json(ChangesResponse {
        updates: store.compute_change_set(),
    }))
}

/// Handler for POST `/session/submit` endpoint.
///
/// An empty change-set is an ordinary outcome, not an error.
pub async fn handle_submit(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, HttpError> {
    info!(
        actor_id = actor.id,
        delegate_id = ?req.delegate_id,
        "Handling submit request"
    );

    let (_, scope) = resolve(&app_state, &actor)?;
    let rule: DelegationRule = DelegationRule::new(app_state.directory.classification()?);
    let candidates: Vec<Employee> = app_state.directory.delegation_candidates(&actor)?;

    let prepared: PreparedSubmission = {
        let mut sessions = app_state.sessions.lock().await;
        let store: &mut ReconciliationStore = open_store(&mut sessions, actor.id)?;

        let delegation: Option<Delegation> = match req.delegate_id {
            None => None,
            Some(delegate_id) => {
                if !store.delegation_offer(&rule, &actor, &candidates) {
                    return Err(HttpError::from(ApiError::InvalidInput {
                        field: String::from("delegate_id"),
                        message: String::from("No command hand-off applies to this change-set"),
                    }));
                }
                Some(
                    DelegationRule::payload(&actor, Some(delegate_id), &candidates).ok_or_else(
                        || {
                            HttpError::from(ApiError::InvalidInput {
                                field: String::from("delegate_id"),
                                message: format!("Employee {delegate_id} cannot take over command"),
                            })
                        },
                    )?,
                )
            }
        };

        match prepare_submission(store, &scope, delegation) {
            Ok(prepared) => prepared,
            Err(ApiError::NothingToSubmit) => {
                return Ok(Json(SubmitResponse {
                    outcome: SubmitStatus::NothingToSubmit,
                    results: Vec::new(),
                    message: Some(ApiError::NothingToSubmit.to_string()),
                }));
            }
            Err(err) => return Err(err.into()),
        }
    };

    let result = submit(app_state.directory.as_ref(), &prepared).await;

    let mut sessions = app_state.sessions.lock().await;
    let outcome: SubmissionOutcome = match sessions.get_mut(&actor.id) {
        Some(store) => finish_submission(store, prepared.ticket, result),
        None => SubmissionOutcome::Abandoned,
    };
    drop(sessions);

    match outcome {
        SubmissionOutcome::Applied { results } => {
            let refused: usize = results.iter().filter(|r| !r.success).count();
            Ok(Json(SubmitResponse {
                outcome: SubmitStatus::Applied,
                message: (refused > 0).then(|| format!("{refused} updates were refused")),
                results,
            }))
        }
        SubmissionOutcome::Abandoned => Ok(Json(SubmitResponse {
            outcome: SubmitStatus::Abandoned,
            results: Vec::new(),
            message: Some(String::from("The session was closed before the submission settled")),
        })),
        SubmissionOutcome::Failed { error } => Err(error.into()),
    }
}

/// Handler for POST `/session/close` endpoint.
pub async fn handle_close_session(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<WriteResponse>, HttpError> {
    info!(actor_id = actor.id, "Handling close_session request");

    let mut sessions = app_state.sessions.lock().await;
    let closed: bool = match sessions.get_mut(&actor.id) {
        Some(store) if store.is_open() => {
            store.close();
            true
        }
        _ => false,
    };

    Ok(Json(WriteResponse {
        success: closed,
        message: (!closed).then(|| String::from("No session was open")),
    }))
}

/// Handler for GET `/preferences/filter/{view}` endpoint.
pub async fn handle_get_filter_preference(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(view): Path<String>,
) -> Json<FilterPreferenceResponse> {
    info!(actor_id = actor.id, view = %view, "Handling get_filter_preference request");

    Json(FilterPreferenceResponse {
        filter: app_state.preferences.load_filter_preference(actor.id, &view),
    })
}

/// Handler for PUT `/preferences/filter/{view}` endpoint.
pub async fn handle_save_filter_preference(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(view): Path<String>,
    Json(filter): Json<FilterSpec>,
) -> Result<Json<WriteResponse>, HttpError> {
    info!(actor_id = actor.id, view = %view, "Handling save_filter_preference request");

    app_state
        .preferences
        .save_filter_preference(actor.id, &view, &filter)?;

    Ok(Json(WriteResponse {
        success: true,
        message: None,
    }))
}

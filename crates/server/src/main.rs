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
#![allow(clippy::multiple_crate_versions)]

mod handlers;
mod session;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use rollcall::ReconciliationStore;
use rollcall_api::{ApiError, Dataset, InMemoryDirectory, InMemoryPreferences, ProviderError};
use rollcall_domain::{DomainError, today_in_timezone};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

use handlers::{
    handle_batch_dates, handle_batch_status, handle_close_session, handle_filter_roster,
    handle_get_changes, handle_get_filter_preference, handle_get_scope, handle_get_session,
    handle_get_status_types, handle_open_session, handle_revert, handle_save_filter_preference,
    handle_select, handle_set_date, handle_set_filter, handle_set_status, handle_submit,
};

/// Roll Call Server - HTTP server for bulk attendance reconciliation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON dataset with hierarchy, status types, roster and actors
    #[arg(short, long)]
    data: PathBuf,

    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// IANA timezone used to compute today's date
    #[arg(long, default_value = "UTC")]
    timezone: String,
}

#[derive(Clone)]
struct AppState {
    directory: Arc<InMemoryDirectory>,
    preferences: Arc<InMemoryPreferences>,
    /// One store per actor, kept across sessions.
    sessions: Arc<Mutex<HashMap<i64, ReconciliationStore>>>,
    timezone: String,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::DomainRuleViolation { .. } | ApiError::NothingToSubmit => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::ScopeViolation { .. } => StatusCode::FORBIDDEN,
            ApiError::SubmissionInFlight | ApiError::SessionClosed => StatusCode::CONFLICT,
            ApiError::SubmissionFailed { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<ProviderError> for HttpError {
    fn from(err: ProviderError) -> Self {
        ApiError::from(err).into()
    }
}

impl From<DomainError> for HttpError {
    fn from(err: DomainError) -> Self {
        ApiError::from(err).into()
    }
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/scope", get(handle_get_scope))
        .route("/status_types", get(handle_get_status_types))
        .route("/roster/filter", post(handle_filter_roster))
        .route("/session", get(handle_get_session))
        .route("/session/open", post(handle_open_session))
        .route("/session/status", post(handle_set_status))
        .route("/session/dates", post(handle_set_date))
        .route("/session/select", post(handle_select))
        .route("/session/batch/status", post(handle_batch_status))
        .route("/session/batch/dates", post(handle_batch_dates))
        .route("/session/revert", post(handle_revert))
        .route("/session/filter", post(handle_set_filter))
        .route("/session/changes", get(handle_get_changes))
        .route("/session/submit", post(handle_submit))
        .route("/session/close", post(handle_close_session))
        .route(
            "/preferences/filter/{view}",
            get(handle_get_filter_preference).put(handle_save_filter_preference),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Roll Call Server");

    // Reject a bad timezone before serving anything
    let today = today_in_timezone(&args.timezone)?;
    info!(timezone = %args.timezone, %today, "Using timezone");

    info!("Loading dataset from: {}", args.data.display());
    let dataset: Dataset = Dataset::load(&args.data)?;

    let app_state: AppState = AppState {
        directory: Arc::new(InMemoryDirectory::new(dataset)),
        preferences: Arc::new(InMemoryPreferences::default()),
        sessions: Arc::new(Mutex::new(HashMap::new())),
        timezone: args.timezone,
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{
        ChangesResponse, FilterPreferenceResponse, ScopeResponse, SessionView, SubmitResponse,
        SubmitStatus, WriteResponse,
    };
    use crate::session::ACTOR_HEADER;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use rollcall::Delegation;
    use rollcall_api::{RosterProvider, RosterQuery};
    use serde::de::DeserializeOwned;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    /// One department with two teams. Actor 1 commands team 42.
    const DATASET_JSON: &str = r##"{
        "hierarchy": [
            {
                "id": 1,
                "name": "Operations",
                "sections": [
                    {
                        "id": 10,
                        "name": "Patrol",
                        "teams": [
                            { "id": 42, "name": "Alpha" },
                            { "id": 43, "name": "Bravo" }
                        ]
                    }
                ]
            }
        ],
        "status_types": [
            { "id": 1, "name": "Present", "color": "#22c55e" },
            { "id": 5, "name": "Sick", "color": "#ef4444" }
        ],
        "classification": {
            "version": 1,
            "entries": { "1": "present", "5": "absent_unplanned" }
        },
        "roster": [
            {
                "id": 1, "first_name": "Avi", "last_name": "Mizrahi", "personal_number": "1000001",
                "org_path": { "department_id": 1, "section_id": 10, "team_id": 42 },
                "is_commander": true
            },
            {
                "id": 2, "first_name": "Dana", "last_name": "Levi", "personal_number": "1000002",
                "org_path": { "department_id": 1, "section_id": 10, "team_id": 42 }
            },
            {
                "id": 3, "first_name": "Yossi", "last_name": "Peretz", "personal_number": "1000003",
                "org_path": { "department_id": 1, "section_id": 10, "team_id": 43 }
            }
        ],
        "actors": [
            { "id": 1, "is_commander": true, "commands_team_id": 42 },
            { "id": 9, "is_admin": true }
        ]
    }"##;

    /// Helper to create test app state over the inline dataset.
    fn create_test_app_state() -> AppState {
        let dataset: Dataset =
            Dataset::from_json(DATASET_JSON).expect("Failed to parse test dataset");
        AppState {
            directory: Arc::new(InMemoryDirectory::new(dataset)),
            preferences: Arc::new(InMemoryPreferences::default()),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            timezone: String::from("UTC"),
        }
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        actor_id: Option<i64>,
        body: Option<Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = actor_id {
            builder = builder.header(ACTOR_HEADER, id.to_string());
        }
        let body: Body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_actor_header_is_unauthorized() {
        let app: Router = build_router(create_test_app_state());

        let response = send(&app, "GET", "/scope", None, None).await;

        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_actor_is_unauthorized() {
        let app: Router = build_router(create_test_app_state());

        let response = send(&app, "GET", "/scope", Some(404), None).await;

        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_team_commander_scope_is_pinned() {
        let app: Router = build_router(create_test_app_state());

        let response = send(&app, "GET", "/scope", Some(1), None).await;
        assert_eq!(response.status(), HttpStatusCode::OK);

        let scope: ScopeResponse = read_json(response).await;
        assert!(!scope.scope.can_pick_department);
        assert!(!scope.scope.can_pick_section);
        assert!(!scope.scope.can_pick_team);
        assert!(scope.scope.default_filter.team_ids.contains(&42));
    }

    #[tokio::test]
    async fn test_session_requires_open() {
        let app: Router = build_router(create_test_app_state());

        let response = send(&app, "GET", "/session", Some(1), None).await;
        assert_eq!(response.status(), HttpStatusCode::CONFLICT);

        let response = send(
            &app,
            "POST",
            "/session/status",
            Some(1),
            Some(json!({ "employee_id": 2, "status_type_id": 5 })),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_open_session_shows_commanded_team_without_actor() {
        let app: Router = build_router(create_test_app_state());

        let response = send(&app, "POST", "/session/open", Some(1), Some(json!({}))).await;
        assert_eq!(response.status(), HttpStatusCode::OK);

        let view: SessionView = read_json(response).await;
        assert_eq!(view.session, 1);
        assert_eq!(view.summary.total, 2);
        let visible: Vec<i64> = view.rows.iter().map(|r| r.employee.id).collect();
        assert_eq!(visible, vec![2]);
        assert!(view.rows[0].editable);
        assert!(!view.delegation_offered);
    }

    #[tokio::test]
    async fn test_edit_and_submit_applies_updates() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state.clone());

        send(&app, "POST", "/session/open", Some(1), Some(json!({}))).await;
        let response = send(
            &app,
            "POST",
            "/session/status",
            Some(1),
            Some(json!({ "employee_id": 2, "status_type_id": 5 })),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let view: SessionView = read_json(response).await;
        assert_eq!(view.summary.changed, 1);

        let response = send(&app, "GET", "/session/changes", Some(1), None).await;
        let changes: ChangesResponse = read_json(response).await;
        assert_eq!(changes.updates.len(), 1);
        assert_eq!(changes.updates[0].employee_id, 2);
        assert_eq!(changes.updates[0].status_type_id, 5);

        let response = send(&app, "POST", "/session/submit", Some(1), Some(json!({}))).await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let submitted: SubmitResponse = read_json(response).await;
        assert_eq!(submitted.outcome, SubmitStatus::Applied);
        assert_eq!(submitted.results.len(), 1);
        assert!(submitted.results[0].success);

        let roster = app_state.directory.roster(&RosterQuery::default()).unwrap();
        let dana = roster.iter().find(|e| e.id == 2).unwrap();
        assert_eq!(
            dana.current_status.as_ref().map(|s| s.status_type_id),
            Some(5)
        );
    }

    #[tokio::test]
    async fn test_empty_change_set_is_not_an_error() {
        let app: Router = build_router(create_test_app_state());

        send(&app, "POST", "/session/open", Some(1), Some(json!({}))).await;
        let response = send(&app, "POST", "/session/submit", Some(1), Some(json!({}))).await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let submitted: SubmitResponse = read_json(response).await;
        assert_eq!(submitted.outcome, SubmitStatus::NothingToSubmit);
        assert!(submitted.results.is_empty());
    }

    #[tokio::test]
    async fn test_out_of_scope_edit_is_forbidden() {
        let app: Router = build_router(create_test_app_state());

        send(&app, "POST", "/session/open", Some(1), Some(json!({}))).await;
        send(
            &app,
            "POST",
            "/session/status",
            Some(1),
            Some(json!({ "employee_id": 3, "status_type_id": 5 })),
        )
        .await;
        let response = send(&app, "POST", "/session/submit", Some(1), Some(json!({}))).await;

        assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_commander_absence_hands_off_command() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state.clone());

        let response = send(
            &app,
            "POST",
            "/session/open",
            Some(1),
            Some(json!({ "personal": true })),
        )
        .await;
        let view: SessionView = read_json(response).await;
        assert_eq!(view.summary.total, 1);
        assert!(!view.delegation_offered);

        let response = send(
            &app,
            "POST",
            "/session/status",
            Some(1),
            Some(json!({ "employee_id": 1, "status_type_id": 5 })),
        )
        .await;
        let view: SessionView = read_json(response).await;
        assert!(view.delegation_offered);

        let response = send(
            &app,
            "POST",
            "/session/submit",
            Some(1),
            Some(json!({ "delegate_id": 3 })),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);

        let response = send(
            &app,
            "POST",
            "/session/submit",
            Some(1),
            Some(json!({ "delegate_id": 2 })),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::OK);

        let delegations: Vec<Delegation> = app_state.directory.delegations().unwrap();
        assert_eq!(delegations.len(), 1);
        assert_eq!(delegations[0].commander_id, 1);
        assert_eq!(delegations[0].delegate_id, 2);
    }

    #[tokio::test]
    async fn test_filter_cannot_leave_pinned_team() {
        let app: Router = build_router(create_test_app_state());

        send(&app, "POST", "/session/open", Some(1), Some(json!({}))).await;
        let response = send(
            &app,
            "POST",
            "/session/filter",
            Some(1),
            Some(json!({ "team_ids": [43], "search": "yossi" })),
        )
        .await;

        let view: SessionView = read_json(response).await;
        assert!(view.filter.team_ids.contains(&42));
        assert!(!view.filter.team_ids.contains(&43));
        assert!(view.rows.is_empty());
    }

    #[tokio::test]
    async fn test_preselection_shows_only_selected() {
        let app: Router = build_router(create_test_app_state());

        let response = send(
            &app,
            "POST",
            "/session/open",
            Some(9),
            Some(json!({ "preselected_ids": [3] })),
        )
        .await;

        let view: SessionView = read_json(response).await;
        assert_eq!(view.summary.selected, 1);
        let visible: Vec<i64> = view.rows.iter().map(|r| r.employee.id).collect();
        assert_eq!(visible, vec![3]);
    }

    #[tokio::test]
    async fn test_reopen_abandons_previous_session() {
        let app: Router = build_router(create_test_app_state());

        send(&app, "POST", "/session/open", Some(1), Some(json!({}))).await;
        let response = send(&app, "POST", "/session/open", Some(1), Some(json!({}))).await;
        let view: SessionView = read_json(response).await;
        assert_eq!(view.session, 2);

        let response = send(&app, "POST", "/session/close", Some(1), None).await;
        let closed: WriteResponse = read_json(response).await;
        assert!(closed.success);

        let response = send(&app, "POST", "/session/close", Some(1), None).await;
        let closed: WriteResponse = read_json(response).await;
        assert!(!closed.success);
    }

    #[tokio::test]
    async fn test_saved_filter_seeds_next_session() {
        let app: Router = build_router(create_test_app_state());

        let response = send(
            &app,
            "PUT",
            "/preferences/filter/attendance",
            Some(9),
            Some(json!({ "team_ids": [43] })),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::OK);

        let response = send(&app, "GET", "/preferences/filter/attendance", Some(9), None).await;
        let saved: FilterPreferenceResponse = read_json(response).await;
        assert!(saved.filter.unwrap().team_ids.contains(&43));

        let response = send(
            &app,
            "POST",
            "/session/open",
            Some(9),
            Some(json!({ "view": "attendance" })),
        )
        .await;
        let view: SessionView = read_json(response).await;
        let visible: Vec<i64> = view.rows.iter().map(|r| r.employee.id).collect();
        assert_eq!(visible, vec![3]);
    }
}

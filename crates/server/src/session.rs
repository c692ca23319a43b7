// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor extraction for the server.
//!
//! Authentication happens in front of this server. The upstream proxy
//! forwards the authenticated employee id in the `X-Actor-Id` header and
//! this extractor resolves it against the directory.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use rollcall_domain::Actor;
use tracing::{debug, warn};

use crate::AppState;

/// The header carrying the authenticated employee id.
pub const ACTOR_HEADER: &str = "X-Actor-Id";

/// Extractor for the acting operator.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     SessionActor(actor): SessionActor,
/// ) -> Result<Json<Response>, HttpError> {
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 Unauthorized if:
/// - The actor header is missing
/// - The actor header is not an integer id
/// - The id does not belong to a known actor
pub struct SessionActor(pub Actor);

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .ok_or_else(|| {
                debug!("Missing actor header");
                SessionError::MissingActorHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid actor header encoding");
                SessionError::InvalidActorHeader
            })?;

        let actor_id: i64 = raw.trim().parse().map_err(|_| {
            warn!(value = %raw, "Actor header is not an employee id");
            SessionError::InvalidActorHeader
        })?;

        let actor: Actor = state.directory.actor(actor_id).map_err(|e| {
            warn!(actor_id, error = %e, "Unknown actor");
            SessionError::UnknownActor(actor_id)
        })?;

        debug!(actor_id, "Actor resolved");
        Ok(Self(actor))
    }
}

/// Actor extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// The actor header is missing.
    MissingActorHeader,
    /// The actor header is not an integer id.
    InvalidActorHeader,
    /// No actor has this id.
    UnknownActor(i64),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingActorHeader => format!("Missing {ACTOR_HEADER} header"),
            Self::InvalidActorHeader => {
                format!("Invalid {ACTOR_HEADER} header. Expected an employee id")
            }
            Self::UnknownActor(id) => format!("Unknown actor {id}"),
        };

        (StatusCode::UNAUTHORIZED, message).into_response()
    }
}

//! Auth handlers: login, logout, whoami.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::dto::request::LoginRequest;
use crate::dto::response::{LoginResponse, WhoAmIResponse};
use crate::error::ApiError;
use crate::extractors::session::{removal_cookie, session_cookie};
use crate::extractors::{MaybeSessionToken, SessionToken};
use crate::state::AppState;

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let outcome = state.gateway.login(req.into()).await?;

    let jar = jar.add(session_cookie(
        &state.config.session.cookie,
        &outcome.session_id,
    ));

    Ok((
        jar,
        Json(LoginResponse {
            session_id: outcome.session_id.as_str().to_owned(),
            username: outcome.username,
        }),
    ))
}

/// POST /api/logout
///
/// Always answers 204 and clears the cookie, whether or not a live
/// session was presented.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    MaybeSessionToken(id): MaybeSessionToken,
) -> (CookieJar, StatusCode) {
    if let Some(id) = id {
        state.gateway.logout(&id).await;
    }

    (
        jar.remove(removal_cookie(&state.config.session.cookie)),
        StatusCode::NO_CONTENT,
    )
}

/// GET /api/whoami
pub async fn whoami(
    State(state): State<AppState>,
    SessionToken(id): SessionToken,
) -> Result<Json<WhoAmIResponse>, ApiError> {
    let identity = state.gateway.whoami(&id).await?;
    Ok(Json(identity.into()))
}

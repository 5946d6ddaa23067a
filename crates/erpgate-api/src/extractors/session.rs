//! `SessionToken` extractor: pulls the gateway session identifier from the
//! session cookie or an `Authorization: Bearer` header.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use erpgate_auth::{GatewayState, SessionId};
use erpgate_core::config::{CookieConfig, CookieSameSite};
use erpgate_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The session identifier presented with a request.
///
/// Rejects with `401` when none is present or it is malformed. Whether the
/// session is still live is decided by the gateway, not here.
#[derive(Debug, Clone)]
pub struct SessionToken(pub SessionId);

impl FromRequestParts<AppState> for SessionToken {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let candidates = presented_sessions(&parts.headers, &state.config.session.cookie.name);
        select_session(state, candidates)
            .await
            .map(SessionToken)
            .ok_or_else(|| ApiError(AppError::unauthorized("Not authenticated")))
    }
}

/// Like [`SessionToken`] but never rejects.
#[derive(Debug, Clone)]
pub struct MaybeSessionToken(pub Option<SessionId>);

impl FromRequestParts<AppState> for MaybeSessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let candidates = presented_sessions(&parts.headers, &state.config.session.cookie.name);
        Ok(MaybeSessionToken(select_session(state, candidates).await))
    }
}

/// Well-formed identifiers presented with a request, cookie first, then
/// the bearer header.
fn presented_sessions(headers: &HeaderMap, cookie_name: &str) -> Vec<SessionId> {
    let jar = CookieJar::from_headers(headers);
    let from_cookie = jar.get(cookie_name).and_then(|c| SessionId::parse(c.value()));

    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(SessionId::parse);

    let mut candidates: Vec<SessionId> = from_cookie.into_iter().collect();
    if let Some(id) = from_header {
        if !candidates.contains(&id) {
            candidates.push(id);
        }
    }
    candidates
}

/// The cookie wins while it names a live session. A stale cookie falls
/// back to a live bearer token; if none is live the first candidate is
/// kept so the gateway reports it.
async fn select_session(state: &AppState, candidates: Vec<SessionId>) -> Option<SessionId> {
    if candidates.len() > 1 {
        for id in &candidates {
            if state.gateway.state_of(Some(id)).await == GatewayState::Authenticated {
                return Some(id.clone());
            }
        }
    }
    candidates.into_iter().next()
}

fn same_site(policy: CookieSameSite) -> SameSite {
    match policy {
        CookieSameSite::Strict => SameSite::Strict,
        CookieSameSite::Lax => SameSite::Lax,
        CookieSameSite::None => SameSite::None,
    }
}

/// HTTP-only cookie carrying `id`.
pub fn session_cookie(config: &CookieConfig, id: &SessionId) -> Cookie<'static> {
    Cookie::build((config.name.clone(), id.as_str().to_owned()))
        .http_only(true)
        .secure(config.secure)
        .same_site(same_site(config.same_site))
        .path(config.path.clone())
        .build()
}

/// Cookie that clears the session cookie in the browser.
pub fn removal_cookie(config: &CookieConfig) -> Cookie<'static> {
    Cookie::build(config.name.clone())
        .path(config.path.clone())
        .build()
}

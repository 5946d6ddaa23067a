//! ERP call forwarding.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use validator::Validate;

use crate::dto::request::CallRequest;
use crate::dto::response::CallResponse;
use crate::error::ApiError;
use crate::extractors::SessionToken;
use crate::state::AppState;

/// POST /api/call
pub async fn call(
    State(state): State<AppState>,
    SessionToken(id): SessionToken,
    payload: Result<Json<CallRequest>, JsonRejection>,
) -> Result<Json<CallResponse>, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let result = state
        .gateway
        .call(&id, &req.model, &req.method, req.args, req.kwargs)
        .await?;

    Ok(Json(CallResponse { result }))
}

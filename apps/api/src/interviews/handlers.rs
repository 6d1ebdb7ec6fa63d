//! Interview listing and lookup. Interviews are created elsewhere (the
//! interview-setup flow); this service only reads them.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::handlers::require_session;
use crate::errors::AppError;
use crate::models::interview::Interview;
use crate::state::AppState;

const DEFAULT_LATEST_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/interviews — the current user's interviews, newest first.
pub async fn handle_list_mine(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Interview>>, AppError> {
    let user = require_session(&state, &headers).await?;
    let interviews = state.store.interviews_for_user(&user.id).await?;
    Ok(Json(interviews))
}

/// GET /api/v1/interviews/latest — finalized interviews by other users.
pub async fn handle_list_latest(
    State(state): State<AppState>,
    Query(params): Query<LatestQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Interview>>, AppError> {
    let user = require_session(&state, &headers).await?;
    let limit = params.limit.unwrap_or(DEFAULT_LATEST_LIMIT);
    let interviews = state.store.latest_interviews(&user.id, limit).await?;
    Ok(Json(interviews))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Interview>, AppError> {
    require_session(&state, &headers).await?;
    let interview = state
        .store
        .get_interview(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    Ok(Json(interview))
}

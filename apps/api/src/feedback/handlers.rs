use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::handlers::require_session;
use crate::errors::AppError;
use crate::feedback::pipeline::{
    create_feedback, lookup, CreateFeedbackParams, CreateFeedbackResult,
};
use crate::models::feedback::{Feedback, TranscriptTurn};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateFeedbackRequest {
    pub transcript: Vec<TranscriptTurn>,
}

/// POST /api/v1/interviews/:id/feedback
///
/// Session-gated; the user id comes from the session, never the body.
/// Pipeline failures come back as `{success:false, error}` with status 200 —
/// the front end owns retry.
pub async fn handle_create_feedback(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<CreateFeedbackRequest>,
) -> Result<Json<CreateFeedbackResult>, AppError> {
    let user = require_session(&state, &headers).await?;

    let params = CreateFeedbackParams {
        interview_id,
        user_id: user.id,
        transcript: req.transcript,
    };
    Ok(Json(create_feedback(&state.store, &state.generator, &params).await))
}

/// GET /api/v1/interviews/:id/feedback
///
/// `null` when no feedback exists for the (interview, current user) pair.
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Option<Feedback>>, AppError> {
    let user = require_session(&state, &headers).await?;
    let feedback = lookup(&state.store, interview_id, &user.id).await?;
    Ok(Json(feedback))
}

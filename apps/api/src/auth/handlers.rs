use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::auth::accounts::{sign_in, sign_up};
use crate::auth::cookie::session_from_headers;
use crate::auth::AuthError;
use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Resolves the current user for a protected route, or 401. The session
/// manager itself never errors; the boundary between "no session" and
/// "unauthorized response" lives here.
pub async fn require_session(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let cookie = session_from_headers(headers);
    state
        .sessions
        .verify(cookie.as_deref())
        .await
        .ok_or(AppError::Unauthorized)
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub uid: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub id_token: String,
}

/// Every auth outcome — including failures — is a 200 with this shape.
/// The front end branches on `success` and shows `message` verbatim.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

impl AuthResponse {
    fn ok(message: &str) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.to_string(),
        })
    }

    fn fail(message: &str) -> Json<Self> {
        Json(Self {
            success: false,
            message: message.to_string(),
        })
    }
}

/// POST /api/v1/auth/sign-up
pub async fn handle_sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Json<AuthResponse> {
    match sign_up(&state.store, &req.uid, &req.name, &req.email).await {
        Ok(()) => AuthResponse::ok("Account created successfully. Please sign in to continue!"),
        Err(AuthError::UserExists) => {
            AuthResponse::fail("User already exists. Please sign in instead.")
        }
        Err(e) => {
            error!("Sign-up failed: {e}");
            AuthResponse::fail("Failed to create an account. Please try again later.")
        }
    }
}

/// POST /api/v1/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Response {
    match sign_in(&state.identity, &state.sessions, &req.email, &req.id_token).await {
        Ok(cookie) => (
            [(header::SET_COOKIE, cookie.header_value())],
            AuthResponse::ok("Sign in successful"),
        )
            .into_response(),
        Err(AuthError::UserNotFound) => {
            AuthResponse::fail("User doesn't exist. Please sign up instead.").into_response()
        }
        Err(e) => {
            error!("Sign-in failed: {e}");
            AuthResponse::fail("Failed to sign in. Please try again later.").into_response()
        }
    }
}

/// POST /api/v1/auth/sign-out
pub async fn handle_sign_out(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, state.sessions.revoke())],
        AuthResponse::ok("Signed out"),
    )
        .into_response()
}

/// GET /api/v1/auth/me
///
/// Resolves the current user from the session cookie. Responds `null` for
/// any unauthenticated state — absent and invalid sessions are not
/// distinguished.
pub async fn handle_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<Option<User>> {
    let cookie = session_from_headers(&headers);
    Json(state.sessions.verify(cookie.as_deref()).await)
}

use axum::{
    extract::{FromRef, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::{
    auth::{
        dto::{
            EmailRequest, ResetPasswordRequest, SignInRequest, SignUpRequest, SignUpResponse,
            VerifyEmailQuery,
        },
        jwt::{AuthUser, JwtKeys},
    },
    error::{ApiError, ErrorCode},
    response::{ApiResponse, MessageData},
    state::AppState,
    users::repo_types::PublicUser,
    validation::ValidJson,
};

pub const RESET_REQUESTED: &str = "If email exists, reset link sent";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(sign_up))
        .route("/api/auth/signin", post(sign_in))
        .route("/api/auth/verify-email", get(verify_email))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/session", get(session))
        .route("/api/auth/signout", post(sign_out))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SignUpRequest>,
) -> Result<ApiResponse<SignUpResponse>, ApiError> {
    let user = state.auth.sign_up(&payload).await?;
    Ok(ApiResponse::created(SignUpResponse {
        user,
        message: "Verification email sent",
    }))
}

/// Checks credentials and starts a session: the JWT is set as an
/// HttpOnly cookie, the body carries the user.
#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<SignInRequest>,
) -> Result<Response, ApiError> {
    let user = state.auth.sign_in(&payload).await?;
    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign_session(&user)?;
    let cookie = keys.session_cookie(&token)?;
    Ok(([(header::SET_COOKIE, cookie)], ApiResponse::ok(user)).into_response())
}

#[instrument(skip(state, query))]
pub async fn verify_email(
    State(state): State<AppState>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<ApiResponse<MessageData>, ApiError> {
    let token = query.token.filter(|t| !t.is_empty()).ok_or_else(|| {
        ApiError::validation(
            "Token required",
            json!([{ "field": "token", "message": "Token required" }]),
        )
    })?;
    state.auth.verify_email(&token).await?;
    Ok(ApiResponse::ok(MessageData {
        message: "Email verified successfully",
    }))
}

/// Always answers with the same message whether or not the account exists.
#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<EmailRequest>,
) -> Result<ApiResponse<MessageData>, ApiError> {
    state.auth.request_password_reset(&payload.email).await?;
    Ok(ApiResponse::ok(MessageData {
        message: RESET_REQUESTED,
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<ResetPasswordRequest>,
) -> Result<ApiResponse<MessageData>, ApiError> {
    state
        .auth
        .reset_password(&payload.token, &payload.password)
        .await?;
    Ok(ApiResponse::ok(MessageData {
        message: "Password reset successfully",
    }))
}

#[instrument(skip(state, auth))]
pub async fn session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<PublicUser>, ApiError> {
    let user = state
        .users
        .get(auth.id)
        .await
        .map_err(|e| match e.code() {
            ErrorCode::NotFound => ApiError::unauthorized("Invalid or expired session"),
            _ => e,
        })?;
    debug!(user_id = %auth.id, role = ?auth.role, "session resolved");
    Ok(ApiResponse::ok(user.into()))
}

#[instrument(skip(keys))]
pub async fn sign_out(State(keys): State<JwtKeys>) -> Result<Response, ApiError> {
    let cookie = keys.cleared_session_cookie()?;
    info!("session cleared");
    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::ok(MessageData {
            message: "Signed out",
        }),
    )
        .into_response())
}

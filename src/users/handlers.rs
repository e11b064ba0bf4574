use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::ApiError,
    response::{ApiResponse, Paginated},
    state::AppState,
    users::{
        dto::{CreateUserRequest, ListUsersQuery, UpdateUserRequest},
        repo_types::User,
    },
    validation::ValidJson,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::validation(
            "Invalid user ID",
            json!([{ "field": "id", "message": "Invalid user ID format" }]),
        )
    })
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<ApiResponse<Paginated<User>>, ApiError> {
    let params = query
        .parse()
        .map_err(|e| e.with_message("Invalid query parameters"))?;
    let page = state
        .users
        .list(&params.filters, params.page, params.limit)
        .await?;
    Ok(ApiResponse::ok(page))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<User>, ApiError> {
    let id = parse_id(&id)?;
    Ok(ApiResponse::ok(state.users.get(id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<ValidJson<CreateUserRequest>, ApiError>,
) -> Result<ApiResponse<User>, ApiError> {
    let ValidJson(req) = payload.map_err(|e| e.with_message("Invalid user data"))?;
    let user = state.users.create(req.into()).await?;
    Ok(ApiResponse::created(user))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<ValidJson<UpdateUserRequest>, ApiError>,
) -> Result<ApiResponse<User>, ApiError> {
    let id = parse_id(&id)?;
    let ValidJson(req) = payload.map_err(|e| e.with_message("Invalid request data"))?;
    let user = state.users.update(id, req.into()).await?;
    Ok(ApiResponse::ok(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

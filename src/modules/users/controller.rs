use axum::{
    Json,
    extract::{Path, State},
};
use mindflow_core::AppError;
use mindflow_models::{Principal, UserId};
use tracing::instrument;

use crate::docs::ErrorResponse;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::validator::parse_path_id;

/// List every registered user
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Registered users", body = Vec<Principal>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires admin staff grant", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<Principal>>, AppError> {
    let users = UserService::list(&state).await?;
    Ok(Json(users))
}

/// Details of a single user
#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = Principal),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - requires admin staff grant", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Principal>, AppError> {
    let user_id: UserId = parse_path_id(&user_id, "user")?;
    let user = UserService::get(&state, user_id).await?;
    Ok(Json(user))
}

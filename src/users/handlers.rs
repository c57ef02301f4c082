use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::AppError,
    state::AppState,
    users::dto::{MessageResponse, PublicUser, UpdateUserRequest},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, caller), fields(caller = %caller.0.sub))]
pub async fn list_users(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    Ok(Json(state.users.list_users().await?))
}

#[instrument(skip(state, caller), fields(caller = %caller.0.sub))]
pub async fn get_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(state.users.get_user(id).await?))
}

#[instrument(skip(state, caller, payload), fields(caller = %caller.0.sub))]
pub async fn update_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(state.users.update_user(id, payload).await?))
}

#[instrument(skip(state, caller), fields(caller = %caller.0.sub))]
pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    state.users.delete_user(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

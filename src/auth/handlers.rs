use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse},
        extractors::BearerToken,
    },
    error::AppError,
    state::AppState,
    users::dto::{CreateUserRequest, MessageResponse, PublicUser},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let user = state.users.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (user, token) = state.auth.login(&payload.email, &payload.password).await?;
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.auth.token_ttl_secs(),
        user,
    }))
}

#[instrument(skip(state, token))]
pub async fn logout(
    State(state): State<AppState>,
    token: Result<BearerToken, AppError>,
) -> Result<Json<MessageResponse>, AppError> {
    let BearerToken(token) = token.map_err(|_| AppError::AuthenticationFailed)?;
    state.auth.logout(&token)?;
    Ok(Json(MessageResponse::new("Logged out")))
}

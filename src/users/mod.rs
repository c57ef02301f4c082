use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod service;
pub mod validation;

pub use repo::{InMemoryUserStore, PgUserStore, StoreError, UserStore};
pub use service::UserDirectory;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}

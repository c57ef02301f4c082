use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use tracing::{info, warn};

use crate::{
    auth::{AuthService, JwtKeys, PasswordHasher},
    config::AppConfig,
    users::{InMemoryUserStore, PgUserStore, UserDirectory, UserStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: UserDirectory,
    pub auth: AuthService,
    pub keys: JwtKeys,
}

impl AppState {
    /// Build from the environment, using Postgres when `DATABASE_URL` is set.
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        let store: Arc<dyn UserStore> = match &config.database_url {
            Some(url) => Arc::new(
                PgUserStore::connect(url, config.max_connections)
                    .await
                    .context("connect to database")?,
            ),
            None => {
                warn!("DATABASE_URL not set; using in-memory user store, data will not survive a restart");
                Arc::new(InMemoryUserStore::new())
            }
        };

        Self::from_parts(config, store)
    }

    pub fn from_parts(config: AppConfig, store: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let hasher = PasswordHasher::new(&config.hasher).context("configure password hasher")?;
        let keys = JwtKeys::new(&config.jwt);
        info!(
            ttl_minutes = config.jwt.ttl_minutes,
            memory_kib = config.hasher.memory_kib,
            iterations = config.hasher.iterations,
            "auth configured"
        );

        Ok(Self {
            users: UserDirectory::new(store.clone(), hasher.clone()),
            auth: AuthService::new(store, hasher, keys.clone()),
            keys,
            config: Arc::new(config),
        })
    }

    /// In-memory state for tests and local runs.
    pub fn in_memory(config: AppConfig) -> anyhow::Result<Self> {
        Self::from_parts(config, Arc::new(InMemoryUserStore::new()))
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

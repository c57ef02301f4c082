//! Login and logout on top of the user store, the hasher and the token keys.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::{
    auth::{claims::SessionClaims, jwt::JwtKeys, password::PasswordHasher},
    error::AppError,
    users::{dto::PublicUser, repo::StoreError, validation, UserStore},
};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, keys: JwtKeys) -> Self {
        Self {
            store,
            hasher,
            keys,
        }
    }

    /// Unknown email and wrong password both yield
    /// [`AppError::AuthenticationFailed`] and cost one hash verification.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(PublicUser, String), AppError> {
        let email = validation::normalize_email(email);

        let user = match self.store.get_by_email(&email).await {
            Ok(u) => u,
            Err(StoreError::NotFound) => {
                self.hasher.verify_decoy(password);
                warn!(email = %email, "login unknown email");
                return Err(AppError::AuthenticationFailed);
            }
            Err(e) => {
                error!(error = %e, "get_by_email failed");
                return Err(e.into());
            }
        };

        if !self.hasher.verify(password, &user.password_hash) {
            warn!(email = %email, user_id = %user.id, "login invalid password");
            return Err(AppError::AuthenticationFailed);
        }

        let token = self.keys.issue(user.id, &user.name)?;
        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok((user.into(), token))
    }

    /// Tokens are stateless, so this only checks that the token is one we
    /// would still accept.
    pub fn logout(&self, token: &str) -> Result<SessionClaims, AppError> {
        let claims = self.keys.validate(token).map_err(|e| {
            warn!(cause = %e, "logout with unusable token");
            AppError::AuthenticationFailed
        })?;
        info!(user_id = %claims.sub, "user logged out");
        Ok(claims)
    }

    pub fn token_ttl_secs(&self) -> u64 {
        self.keys.ttl().as_secs()
    }
}

use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::password::PasswordHasher,
    error::AppError,
    users::{
        dto::{CreateUserRequest, PublicUser, UpdateUserRequest},
        repo::UserStore,
        repo_types::{NewUser, UserChanges},
        validation,
    },
};

/// Account CRUD over a [`UserStore`]. Everything it returns is a
/// [`PublicUser`], so password hashes never leave this layer.
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn create_user(&self, req: CreateUserRequest) -> Result<PublicUser, AppError> {
        let name = validation::name(&req.name)?;
        let email = validation::email(&req.email)?;
        validation::password(&req.password)?;
        let age = validation::age(req.age)?;

        let password_hash = self.hasher.hash(&req.password)?;
        let user = self
            .store
            .insert(NewUser {
                name,
                email,
                password_hash,
                age,
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user.into())
    }

    pub async fn get_user(&self, id: Uuid) -> Result<PublicUser, AppError> {
        Ok(self.store.get_by_id(id).await?.into())
    }

    pub async fn list_users(&self) -> Result<Vec<PublicUser>, AppError> {
        let users = self.store.list_all().await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    /// Validates whichever fields are present. An empty request returns the
    /// current record untouched.
    #[instrument(skip(self, req))]
    pub async fn update_user(
        &self,
        id: Uuid,
        req: UpdateUserRequest,
    ) -> Result<PublicUser, AppError> {
        let changes = UserChanges {
            name: req.name.as_deref().map(validation::name).transpose()?,
            email: req.email.as_deref().map(validation::email).transpose()?,
            age: req.age.map(validation::age).transpose()?,
        };

        if changes.is_empty() {
            return self.get_user(id).await;
        }

        let user = self.store.update(id, changes).await?;
        info!(user_id = %user.id, "user updated");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        self.store.delete(id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }
}

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::api::UserApi;
use crate::cache::{CollectionKey, QueryCache};
use crate::domain::{User, UserCreate, UserPatch};
use crate::error::ApiError;
use crate::notify::Notifier;
use crate::user_actor::UserError;

/// Client for account administration, acting on behalf of `acting_user_id`.
#[derive(Clone)]
pub struct UserClient {
    api: Arc<dyn UserApi>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    acting_user_id: Option<String>,
}

impl_client_methods!(UserClient, User, UserError, users, Users);

impl UserClient {
    pub fn new(api: Arc<dyn UserApi>, cache: QueryCache, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, cache, notifier, acting_user_id: None }
    }

    /// The signed-in operator; they may not delete or ban themselves.
    pub fn acting_as(mut self, user_id: impl Into<String>) -> Self {
        self.acting_user_id = Some(user_id.into());
        self
    }

    fn is_self(&self, id: &str) -> bool {
        self.acting_user_id.as_deref() == Some(id)
    }

    async fn mutated(&self, message: &str) {
        self.cache.invalidate(CollectionKey::Users).await;
        self.notifier.success(message);
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: UserCreate) -> Result<User, UserError> {
        user.validate().map_err(UserError::Validation)?;
        match self.api.create_user(&user).await {
            Ok(created) => {
                info!(user_id = %created.id, "User created");
                self.mutated("User created successfully!").await;
                Ok(created)
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to create user");
                match e {
                    ApiError::Status { status: 409, .. } => Err(UserError::AlreadyExists(user.email)),
                    e => Err(e.into()),
                }
            }
        }
    }

    /// Applies the non-blank parts of `patch`. A patch with nothing left is
    /// refused without a request.
    #[instrument(skip(self, patch))]
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User, UserError> {
        let patch = patch.cleaned().map_err(UserError::Validation)?;
        if patch.is_empty() {
            debug!("Nothing to update");
            return Err(UserError::EmptyUpdate);
        }
        match self.api.update_user(id, &patch).await {
            Ok(updated) => {
                self.mutated("User updated successfully!").await;
                Ok(updated)
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to update user");
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> Result<(), UserError> {
        if self.is_self(id) {
            warn!("Refusing to delete the acting user");
            let refusal = UserError::CannotDeleteSelf;
            self.notifier.error(&refusal.to_string());
            return Err(refusal);
        }
        match self.api.delete_user(id).await {
            Ok(()) => {
                self.mutated("User deleted successfully!").await;
                Ok(())
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to delete user");
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn ban_user(&self, id: &str) -> Result<(), UserError> {
        if self.is_self(id) {
            warn!("Refusing to ban the acting user");
            let refusal = UserError::CannotBanSelf;
            self.notifier.error(&refusal.to_string());
            return Err(refusal);
        }
        match self.api.ban_user(id).await {
            Ok(()) => {
                self.mutated("User banned successfully!").await;
                Ok(())
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to ban user");
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn unban_user(&self, id: &str) -> Result<(), UserError> {
        match self.api.unban_user(id).await {
            Ok(()) => {
                self.mutated("User unbanned successfully!").await;
                Ok(())
            }
            Err(e) => {
                notify_failure!(self.notifier, &e, "Failed to unban user");
                Err(e.into())
            }
        }
    }
}

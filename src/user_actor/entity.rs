use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Role, User, UserCreate, UserPatch};
use super::actions::UserAction;

impl Entity for User {
    type Id = String;
    type CreatePayload = UserCreate;
    type Patch = UserPatch;
    type Action = UserAction;
    /// Whether the ban flag changed.
    type ActionResult = bool;

    fn id(&self) -> &String { &self.id }

    /// Registers a new account with the `user` role.
    fn from_create(id: String, params: UserCreate) -> Result<Self, String> {
        params.validate().map_err(|e| e.to_string())?;
        let now = Utc::now();
        Ok(Self {
            id,
            name: params.name,
            email: params.email,
            role: Role::User,
            is_banned: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Updates the user's profile information.
    ///
    /// # Fields Updated
    /// - `name`, `email`, `role`; passwords are not stored here
    fn on_update(&mut self, patch: UserPatch) -> Result<(), String> {
        let patch = patch.cleaned().map_err(|e| e.to_string())?;
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn handle_action(&mut self, action: UserAction) -> Result<bool, String> {
        let banned = action == UserAction::Ban;
        let changed = self.is_banned != banned;
        self.is_banned = banned;
        if changed {
            self.updated_at = Utc::now();
        }
        Ok(changed)
    }
}

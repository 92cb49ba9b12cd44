use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::UserRepository,
    error::{AppError, AppResult},
    models::{AuthResponse, UpdateProfileRequest, UserPublic},
    services::auth::{non_empty, PasswordHasher, TokenIssuer},
};

const USER_NOT_FOUND: &str = "User not found";

/// Reads and updates the caller's own user record
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
    hasher: PasswordHasher,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenIssuer, hasher: PasswordHasher) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    /// Loads a user without the password hash
    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserPublic> {
        self.users
            .find_user_by_id(user_id)
            .await?
            .map(UserPublic::from)
            .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))
    }

    /// Applies the supplied fields and issues a fresh token
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> AppResult<AuthResponse> {
        let mut user = self
            .users
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;

        if let Some(name) = non_empty(request.name) {
            user.name = name;
        }
        if let Some(email) = non_empty(request.email) {
            user.email = email;
        }
        if let Some(password) = request.password.filter(|p| !p.is_empty()) {
            user.password_hash = self.hasher.hash(&password).await?;
        }

        let updated = self
            .users
            .update_user(&user)
            .await?
            .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;

        tracing::info!(user_id = %updated.id, "Profile updated");

        let token = self.tokens.issue(updated.id)?;
        Ok(AuthResponse::new(&updated, token))
    }
}

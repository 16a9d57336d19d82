//! Registration, login and profile management

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use tracing::{info, warn};
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::{
    models::{LoginRequest, NewUser, ProfilePatch, RegisterRequest, User, UserProfile},
    repositories::UserStore,
    validation::{require, validate_password},
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Register a regular account
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<User> {
        self.create_account(request, false).await
    }

    /// Register an account flagged as organizer
    pub async fn register_organizer(&self, request: RegisterRequest) -> ServiceResult<User> {
        self.create_account(request, true).await
    }

    async fn create_account(
        &self,
        request: RegisterRequest,
        is_organizer: bool,
    ) -> ServiceResult<User> {
        let username =
            require(request.username.as_deref(), "Username").map_err(ServiceError::Validation)?;
        let email = require(request.email.as_deref(), "Email").map_err(ServiceError::Validation)?;
        let password = request.password.as_deref().unwrap_or_default();

        validate_password(password).map_err(ServiceError::Validation)?;

        if self.users.email_exists(email).await? {
            return Err(ServiceError::Conflict("Email already exists.".to_string()));
        }
        if self.users.username_exists(username).await? {
            return Err(ServiceError::Conflict("Username already exists.".to_string()));
        }

        let user = self
            .users
            .create_user(&NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
                is_organizer,
            })
            .await?;

        info!(user_id = %user.id, is_organizer, "User registered");
        Ok(user)
    }

    /// Check credentials and return the matching user
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<User> {
        let email = request.email.as_deref().map(str::trim).unwrap_or_default();
        let password = request.password.as_deref().unwrap_or_default();

        if email.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let invalid = || ServiceError::Unauthorized("Invalid email or password".to_string());

        let user = self.users.find_user_by_email(email).await?.ok_or_else(invalid)?;
        if !verify_password(&user.password_hash, password) {
            return Err(invalid());
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    pub async fn get_user(&self, id: Uuid) -> ServiceResult<UserProfile> {
        self.users
            .find_user(id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(user_not_found)
    }

    /// Apply the keys present in `patch` to the user's profile
    pub async fn edit_profile(&self, id: Uuid, patch: ProfilePatch) -> ServiceResult<UserProfile> {
        let user = if patch.is_empty() {
            self.users.find_user(id).await?
        } else {
            self.users.update_profile(id, &patch).await?
        };

        user.map(UserProfile::from).ok_or_else(user_not_found)
    }

    pub async fn upgrade_to_organizer(&self, id: Uuid) -> ServiceResult<UserProfile> {
        let user = self.users.set_organizer(id).await?.ok_or_else(user_not_found)?;

        info!(user_id = %user.id, "User upgraded to organizer");
        Ok(UserProfile::from(user))
    }
}

fn user_not_found() -> ServiceError {
    ServiceError::NotFound("User not found.".to_string())
}

fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password_hash: &str, password: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

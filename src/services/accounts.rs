use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use uuid::Uuid;

use crate::db::UserStore;
use crate::error::{AppError, AppResult};
use crate::models::User;

/// Registration, login, and token authentication
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Registers a new account; the password is stored as an Argon2 hash
    pub async fn register(&self, username: &str, password: &str) -> AppResult<User> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput("Missing credentials".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = self.users.insert(username, &password_hash).await?;
        tracing::info!(user_id = user.id, username, "user registered");
        Ok(user)
    }

    /// Verifies credentials and rotates the session token
    ///
    /// Wrong username and wrong password are deliberately indistinguishable.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(User, String)> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        let token = Uuid::new_v4().to_string();
        self.users.set_token(user.id, &token).await?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok((user, token))
    }

    /// Resolves a bearer token to its account, if any
    pub async fn authenticate(&self, token: &str) -> AppResult<Option<User>> {
        self.users.find_by_token(token).await
    }

    pub async fn find(&self, user_id: i64) -> AppResult<Option<User>> {
        self.users.find_by_id(user_id).await
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

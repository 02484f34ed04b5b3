use std::sync::Arc;
use std::time::Duration;

use super::Deadline;
use crate::auth::password::{HashError, PasswordHasher};
use crate::auth::token::TokenService;
use crate::auth::Credentials;
use crate::error::ServiceError;
use crate::models::User;
use crate::repository::UserRepository;

/// Shortest password accepted at registration and login, counted in characters.
pub const MIN_PASSWORD_LEN: usize = 4;

// Hashed once at construction; unknown usernames are verified against it.
const UNKNOWN_USER_PASSWORD: &str = "no-such-account";

fn check_password_strength(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Registration, login and role management.
pub struct UserUseCase {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    timeout: Duration,
    unknown_user_hash: String,
}

impl UserUseCase {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
        timeout: Duration,
    ) -> Result<Self, HashError> {
        let unknown_user_hash = hasher.hash(UNKNOWN_USER_PASSWORD)?;
        Ok(Self {
            repository,
            hasher,
            tokens,
            timeout,
            unknown_user_hash,
        })
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Deadline::after(self.timeout)
            .run(self.repository.list_users())
            .await
    }

    /// Registers a new account.
    ///
    /// The first account created in an empty collection becomes an Admin; every
    /// later one is a User. The repository picks the role in the same atomic
    /// step as the insert, so concurrent first registrations yield one Admin.
    pub async fn create_user(&self, credentials: Credentials) -> Result<User, ServiceError> {
        check_password_strength(&credentials.password)?;
        let deadline = Deadline::after(self.timeout);

        let Credentials { username, password } = credentials;
        if deadline
            .run(self.repository.find_by_username(&username))
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateUsername(username));
        }

        let password_hash = self.hash_password(password).await?;

        // A concurrent registration may have claimed the name since the lookup.
        let user = deadline
            .run(self.repository.insert_user(&username, &password_hash))
            .await?
            .ok_or(ServiceError::DuplicateUsername(username))?;

        log::info!("registered user '{}' with role {}", user.username, user.role);
        Ok(user)
    }

    /// Checks the credentials and issues a token for the account.
    pub async fn login(&self, credentials: Credentials) -> Result<String, ServiceError> {
        check_password_strength(&credentials.password)?;
        let deadline = Deadline::after(self.timeout);

        let user = match deadline
            .run(self.repository.find_by_username(&credentials.username))
            .await?
        {
            Some(user) => user,
            None => {
                // Same bcrypt cost as a wrong password, so timing does not reveal the username.
                let _ = self
                    .verify_password(self.unknown_user_hash.clone(), credentials.password)
                    .await?;
                log::warn!("login rejected for unknown user '{}'", credentials.username);
                return Err(ServiceError::InvalidCredentials);
            }
        };

        match self
            .verify_password(user.password_hash.clone(), credentials.password)
            .await?
        {
            Ok(()) => {}
            Err(HashError::Mismatch) => {
                log::warn!("login rejected for '{}': wrong password", user.username);
                return Err(ServiceError::InvalidCredentials);
            }
            Err(e) => {
                log::error!("stored hash for '{}' unusable: {}", user.username, e);
                return Err(ServiceError::InvalidCredentials);
            }
        }

        Ok(self.tokens.issue_token(&user.username, user.role)?)
    }

    /// Raises a User to Admin.
    ///
    /// The role change is a single conditional update; the follow-up lookup only
    /// classifies why nothing was updated.
    pub async fn promote_user(&self, username: &str) -> Result<User, ServiceError> {
        let deadline = Deadline::after(self.timeout);

        if let Some(user) = deadline.run(self.repository.promote_user(username)).await? {
            log::info!("promoted user '{}' to Admin", user.username);
            return Ok(user);
        }

        match deadline.run(self.repository.find_by_username(username)).await? {
            Some(_) => Err(ServiceError::AlreadyAdmin(username.to_string())),
            None => Err(ServiceError::UserNotFound(username.to_string())),
        }
    }

    // bcrypt is CPU bound, so it runs on the blocking pool.
    async fn hash_password(&self, plaintext: String) -> Result<String, ServiceError> {
        let hasher = Arc::clone(&self.hasher);
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| ServiceError::Internal(format!("password hashing task failed: {}", e)))??;
        Ok(hashed)
    }

    async fn verify_password(
        &self,
        hashed: String,
        plaintext: String,
    ) -> Result<Result<(), HashError>, ServiceError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&hashed, &plaintext))
            .await
            .map_err(|e| ServiceError::Internal(format!("password verification task failed: {}", e)))
    }
}

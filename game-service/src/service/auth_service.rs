use std::sync::Arc;

use shared::{Email, Result, ServiceError, User, UserId, Username};

use crate::auth::{password, TokenService};
use crate::repository::CredentialStore;

const MIN_PASSWORD_LENGTH: usize = 6;

pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn CredentialStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, String)> {
        let username = Username::new(username)?;
        let email = Email::new(email)?;

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(ServiceError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        // Pre-checks give the precise conflicting field; the store's
        // uniqueness constraint still backstops a racing insert.
        if self.users.find_by_email(email.as_str()).await?.is_some() {
            return Err(ServiceError::DuplicateIdentity(email.to_string()));
        }
        if self
            .users
            .find_by_username(username.as_str())
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicateIdentity(username.to_string()));
        }

        let password_hash = password::hash(password)?;
        let user = self.users.create(&username, &email, &password_hash).await?;
        let token = self.tokens.issue(&user.id)?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            "User registered"
        );

        Ok((user, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .users
            .find_by_email(email.trim().to_lowercase().as_str())
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !password::verify(password, &user.password_hash) {
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user.id)?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok((user, token))
    }

    /// Gate for every protected operation. The verification failure kinds
    /// stay distinguishable in the token service; here they collapse into
    /// one unauthorized outcome.
    pub fn authenticate(&self, token: &str) -> Result<UserId> {
        self.tokens.verify(token).map_err(|e| {
            tracing::debug!(reason = %e, "Token rejected");
            ServiceError::Unauthorized(e.to_string())
        })
    }
}

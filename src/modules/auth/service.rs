//! Account registration and password sign-in.

use bookshelf_authz::{hash_password, verify_against_dummy, verify_password};
use bookshelf_db::{StorageError, User};
use bookshelf_http::AppError;
use serde::Deserialize;

use crate::state::AppState;

/// Email and password as submitted by a form or a JSON body.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    fn require(&self) -> Result<(&str, &str), AuthError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        Ok((email, &self.password))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email and password are required.")]
    MissingCredentials,

    #[error("User with this email already exists.")]
    EmailTaken,

    #[error("User not found.")]
    UnknownUser,

    #[error("Invalid password.")]
    WrongPassword,

    #[error("credential processing failed: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                AppError::bad_request_with_code("missing_credentials", err.to_string())
            }
            AuthError::EmailTaken => AppError::conflict(Vec::new(), err.to_string()),
            // The JSON API does not reveal which half of the pair was wrong.
            AuthError::UnknownUser | AuthError::WrongPassword => {
                AppError::unauthorized("Invalid email or password.")
            }
            AuthError::Internal(message) => AppError::Internal(anyhow::anyhow!(message)),
        }
    }
}

pub async fn register(state: &AppState, credentials: &Credentials) -> Result<User, AuthError> {
    let (email, password) = credentials.require()?;
    let hash = hash_password(password).map_err(|e| AuthError::Internal(e.to_string()))?;

    state
        .users
        .create(email, hash)
        .await
        .map_err(|err| match err {
            StorageError::Conflict { .. } => AuthError::EmailTaken,
            other => AuthError::Internal(other.to_string()),
        })
}

pub async fn authenticate(state: &AppState, credentials: &Credentials) -> Result<User, AuthError> {
    let (email, password) = credentials.require()?;

    let user = match state.users.find_by_email(email).await {
        Ok(user) => user,
        Err(err) if err.is_not_found() => {
            verify_against_dummy(password);
            return Err(AuthError::UnknownUser);
        }
        Err(err) => return Err(AuthError::Internal(err.to_string())),
    };

    match verify_password(password, &user.password_hash) {
        Ok(true) => Ok(user),
        Ok(false) => {
            tracing::info!(user_id = user.id, "sign-in rejected: wrong password");
            Err(AuthError::WrongPassword)
        }
        Err(e) => Err(AuthError::Internal(e.to_string())),
    }
}

/// Sign-in followed by a fresh session token for the account.
pub async fn issue_token(state: &AppState, credentials: &Credentials) -> Result<String, AuthError> {
    let user = authenticate(state, credentials).await?;
    state
        .tokens
        .create_token(user.id)
        .map_err(|e| AuthError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshelf_kernel::Settings;

    fn state() -> AppState {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "test-secret".to_string();
        AppState::from_settings(&settings).unwrap()
    }

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let state = state();
        let user = register(&state, &credentials(" ada@example.com ", "pw"))
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(user.password_hash.starts_with("$argon2id$"));

        let signed_in = authenticate(&state, &credentials("ada@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(signed_in.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let state = state();
        register(&state, &credentials("ada@example.com", "pw"))
            .await
            .unwrap();
        let err = register(&state, &credentials("ADA@example.com", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn sign_in_failures_are_distinguished() {
        let state = state();
        register(&state, &credentials("ada@example.com", "pw"))
            .await
            .unwrap();

        assert!(matches!(
            authenticate(&state, &credentials("bob@example.com", "pw")).await,
            Err(AuthError::UnknownUser)
        ));
        assert!(matches!(
            authenticate(&state, &credentials("ada@example.com", "nope")).await,
            Err(AuthError::WrongPassword)
        ));
        assert!(matches!(
            authenticate(&state, &credentials("  ", "pw")).await,
            Err(AuthError::MissingCredentials)
        ));
    }

    #[tokio::test]
    async fn issued_token_names_the_account() {
        let state = state();
        let user = register(&state, &credentials("ada@example.com", "pw"))
            .await
            .unwrap();
        let token = issue_token(&state, &credentials("ada@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(state.tokens.validate_token(&token).unwrap(), user.id);
    }
}

//! This file defines the route for exchanging a username and password for a bearer token.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error, PasswordHash,
    auth::{TokenKeys, TokenResponse},
    user::get_user_by_username,
};

/// The state needed for logging in a user.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<rusqlite::Connection>>,
    /// The keys used to sign new tokens.
    pub token_keys: TokenKeys,
    /// How long new tokens are valid for.
    pub token_duration: Duration,
    /// Checked in place of a real hash when the username is unknown.
    pub decoy_password_hash: PasswordHash,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_keys: state.token_keys.clone(),
            token_duration: state.token_duration,
            decoy_password_hash: state.decoy_password_hash.clone(),
        }
    }
}

/// The body of a register or log-in request.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// The user's username.
    pub username: String,
    /// The user's password in plain text.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Handler for log-in requests.
///
/// Responds with a bearer token if the username exists and the password matches, otherwise
/// responds with `401 Unauthorized`. The response does not reveal which of the two was wrong,
/// and an unknown username still costs one bcrypt verification.
pub async fn post_log_in(
    State(state): State<LogInState>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, Error> {
    let Json(credentials) = credentials?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        match get_user_by_username(&credentials.username, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                drop(connection);
                tracing::debug!("Log in attempt for unknown user {}", credentials.username);
                state
                    .decoy_password_hash
                    .verify(&credentials.password)
                    .map_err(|error| Error::HashingError(error.to_string()))?;
                return Err(Error::InvalidCredentials);
            }
            Err(error) => return Err(error),
        }
    };

    let is_password_correct = user
        .password_hash
        .verify(&credentials.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_correct {
        tracing::debug!("Log in attempt with wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = state.token_keys.issue_token(&user, state.token_duration)?;

    Ok(Json(TokenResponse { token }))
}

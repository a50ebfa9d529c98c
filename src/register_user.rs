//! The route for creating a new user account.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
};
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error, PasswordHash,
    auth::{Credentials, TokenKeys, TokenResponse},
    password::ValidatedPassword,
    user::create_user,
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The keys used to sign the new user's token.
    pub token_keys: TokenKeys,
    /// How long new tokens are valid for.
    pub token_duration: Duration,
    /// The bcrypt cost for hashing the new user's password.
    pub password_cost: u32,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_keys: state.token_keys.clone(),
            token_duration: state.token_duration,
            password_cost: state.password_cost,
        }
    }
}

/// A route handler for creating a new user.
///
/// On success the new user is logged in straight away: the response holds a
/// bearer token, the same as logging in.
///
/// # Errors
///
/// Responds with `400 Bad Request` for an empty username or password and
/// `409 Conflict` if the username is taken.
pub async fn register_user(
    State(state): State<RegistrationState>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<TokenResponse>, Error> {
    let Json(credentials) = credentials?;

    if credentials.username.trim().is_empty() {
        return Err(Error::EmptyUsername);
    }

    // Hashing is slow, so do it before taking the database lock.
    let password = ValidatedPassword::new(&credentials.password)?;
    let password_hash = PasswordHash::new(password, state.password_cost)?;

    let user = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        create_user(&credentials.username, password_hash, &connection)?
    };

    tracing::info!("Registered user {} ({})", user.username, user.id);

    let token = state.token_keys.issue_token(&user, state.token_duration)?;

    Ok(Json(TokenResponse { token }))
}

//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use time::Duration;

use crate::{Error, PasswordHash, auth::TokenKeys, db::initialize};

/// The password behind [AppState::decoy_password_hash]. It is never a user's hash.
const DECOY_PASSWORD: &str = "not a real password";

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The keys used to sign and verify bearer tokens.
    pub token_keys: TokenKeys,

    /// The duration for which newly issued tokens are valid.
    pub token_duration: Duration,

    /// The bcrypt cost used when hashing new passwords.
    pub password_cost: u32,

    /// A hash with the same cost as real passwords, checked when logging in as an unknown user
    /// so that the response takes as long as a wrong password.
    pub decoy_password_hash: PasswordHash,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// Tokens are signed with a key derived from `token_secret`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the decoy password cannot be
    /// hashed with `password_cost`.
    pub fn new(
        db_connection: Connection,
        token_secret: &str,
        token_duration: Duration,
        password_cost: u32,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;
        let decoy_password_hash = PasswordHash::from_raw_password(DECOY_PASSWORD, password_cost)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            token_keys: TokenKeys::new(token_secret),
            token_duration,
            password_cost,
            decoy_password_hash,
            db_connection: connection,
        })
    }
}

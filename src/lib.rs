//! Expense Tracker is a JSON API for recording personal income and expenses.
//!
//! Users register and log in to receive a bearer token. With that token they
//! can create, list, update and delete their own transactions, and request a
//! summary of their total income, total expenses and balance.
//!
//! This library provides the router, the SQLite-backed transaction ledger and
//! the helpers the server binaries need.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::QueryRejection;
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
mod auth;
mod database_id;
mod db;
pub mod endpoints;
mod logging;
mod password;
mod register_user;
mod routing;
mod summary;
#[cfg(test)]
mod test_utils;
mod transaction;
mod user;

pub use app_state::AppState;
pub use auth::{Claims, DEFAULT_TOKEN_DURATION, TokenKeys};
pub use database_id::TransactionId;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, REQUEST_BODY_LIMIT, logging_middleware};
pub use password::PasswordHash;
pub use routing::build_router;
pub use summary::{Summary, summarize};
pub use transaction::{
    DateRange, NewTransaction, Transaction, TransactionFilter, TransactionKind,
    create_transaction, delete_transaction, list_transactions, update_transaction,
};
pub use user::{User, UserID, create_user, get_user_by_id, get_user_by_username};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body, path or query string could not be parsed.
    ///
    /// The string describes what was wrong with the request and is safe to
    /// show to the client.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request body is larger than the server will read.
    #[error("the request body is larger than {0} bytes")]
    BodyTooLarge(usize),

    /// An empty string was used as a username.
    #[error("username cannot be empty")]
    EmptyUsername,

    /// An empty string was used as a password.
    #[error("password cannot be empty")]
    EmptyPassword,

    /// The username does not exist or the password does not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The bearer token is missing, malformed, forged or expired.
    #[error("missing or invalid token")]
    InvalidToken,

    /// The bearer token was valid but refers to a user that is not in the
    /// database.
    #[error("the user {0} does not exist")]
    UnknownUser(UserID),

    /// The username is already taken by another user.
    #[error("the username \"{0}\" already exists")]
    DuplicateUsername(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a transaction that does not exist or that belongs to
    /// another user.
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist or that belongs to
    /// another user.
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A token could not be signed.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.to_string())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_) | Error::EmptyUsername | Error::EmptyPassword => {
                StatusCode::BAD_REQUEST
            }
            Error::InvalidCredentials | Error::InvalidToken | Error::UnknownUser(_) => {
                StatusCode::UNAUTHORIZED
            }
            Error::NotFound | Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => {
                StatusCode::NOT_FOUND
            }
            Error::DuplicateUsername(_) => StatusCode::CONFLICT,
            Error::BodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::UnknownUser(_) => "Unauthorized".to_owned(),
            Error::UpdateMissingTransaction | Error::DeleteMissingTransaction => {
                "Transaction not found".to_owned()
            }
            // Internal errors are not intended to be shown to the client.
            error if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                "Internal server error".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

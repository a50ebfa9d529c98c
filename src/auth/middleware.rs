//! Authentication middleware that validates bearer tokens.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use rusqlite::Connection;

use crate::{AppState, Error, auth::TokenKeys, user::get_user_by_id};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The keys used to verify bearer tokens.
    pub token_keys: TokenKeys,
    /// The database connection for checking that the token's user still exists.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_keys: state.token_keys.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Middleware function that checks for a valid bearer token in the `Authorization` header.
/// The user ID is placed into the request and then the request executed normally if the token
/// is valid and its user still exists, otherwise `401 Unauthorized` is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(
    State(state): State<AuthState>,
    authorization: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Response {
    let TypedHeader(Authorization(bearer)) = match authorization {
        Ok(header) => header,
        Err(rejection) => {
            tracing::debug!("Rejected request to {}: {rejection}", request.uri());
            return Error::InvalidToken.into_response();
        }
    };

    let user_id = match state.token_keys.resolve_user_id(bearer.token()) {
        Ok(user_id) => user_id,
        Err(error) => return error.into_response(),
    };

    let user = match state.db_connection.lock() {
        Ok(connection) => get_user_by_id(user_id, &connection),
        Err(_) => Err(Error::DatabaseLockError),
    };

    match user {
        Ok(_) => {}
        Err(Error::NotFound) => {
            tracing::debug!("Rejected token for missing user {user_id}");
            return Error::UnknownUser(user_id).into_response();
        }
        Err(error) => return error.into_response(),
    }

    request.extensions_mut().insert(user_id);
    next.run(request).await
}

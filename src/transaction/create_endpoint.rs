//! Defines the endpoint for creating a new transaction.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    Error,
    transaction::{NewTransaction, Transaction, TransactionState, core::create_transaction},
    user::UserID,
};

/// A route handler for creating a new transaction owned by the logged in user.
///
/// Responds with `201 Created` and the stored transaction, including its new ID.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let Json(new_transaction) = payload?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(user_id, new_transaction, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

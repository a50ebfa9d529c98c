//! Defines the endpoint and query for replacing a transaction's fields.

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use rusqlite::{Connection, params};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{
        NewTransaction, Transaction, TransactionState,
        core::{TRANSACTION_COLUMNS, map_transaction_row},
    },
    user::UserID,
};

/// A route handler for replacing every field of one of the logged in user's
/// transactions.
///
/// Responds with `404 Not Found` if the transaction does not exist or belongs
/// to another user.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    transaction_id: Result<Path<TransactionId>, PathRejection>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<Json<Transaction>, Error> {
    let Path(transaction_id) = transaction_id?;
    let Json(new_values) = payload?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_transaction(user_id, transaction_id, new_values, &connection).map(Json)
}

/// Replace the amount, type, category, description and date of the
/// transaction `id` owned by `user_id`.
///
/// The ownership check and the update are a single statement, so a
/// concurrent delete cannot make the update silently affect zero rows.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    user_id: UserID,
    id: TransactionId,
    new_values: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "UPDATE \"transaction\" \
            SET \
                amount = ?1, \
                type = ?2, \
                category = ?3, \
                description = ?4, \
                date = ?5 \
            WHERE id = ?6 AND user_id = ?7 \
            RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            params![
                new_values.amount,
                new_values.kind,
                new_values.category,
                new_values.description,
                new_values.date,
                id,
                user_id,
            ],
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UpdateMissingTransaction,
            error => error.into(),
        })?;

    tracing::debug!("Updated transaction {id} for user {user_id}");

    Ok(transaction)
}

//! Defines the endpoint for listing a user's transactions.

use axum::{Extension, Json, extract::State};
// axum_extra's Query parses empty values such as `?category=` as `None`.
use axum_extra::extract::{Query, QueryRejection};

use crate::{
    Error,
    transaction::{Transaction, TransactionFilter, TransactionState, query::list_transactions},
    user::UserID,
};

/// A route handler for listing the logged in user's transactions.
///
/// The query string may contain `category`, `start_date` and `end_date`.
/// Responds with an empty list, not an error, when nothing matches.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    filter: Result<Query<TransactionFilter>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let Query(filter) = filter?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    list_transactions(user_id, &filter, &connection).map(Json)
}

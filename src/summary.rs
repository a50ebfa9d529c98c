//! Totals of a user's income and expenses.
//!
//! The totals are computed by the database on every request, there is no
//! cached or stored summary.

use axum::{Extension, Json, extract::State};
// axum_extra's Query parses empty values such as `?start_date=` as `None`.
use axum_extra::extract::{Query, QueryRejection};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    transaction::{DateRange, OwnedRowsClause, TransactionState},
    user::UserID,
};

/// The total income, total expenses and balance of a user's transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of the amounts of all income transactions.
    pub total_income: f64,
    /// The sum of the amounts of all expense transactions.
    pub total_expense: f64,
    /// `total_income` minus `total_expense`.
    pub balance: f64,
}

impl Summary {
    fn new(total_income: f64, total_expense: f64) -> Self {
        Self {
            total_income,
            total_expense,
            balance: total_income - total_expense,
        }
    }
}

/// Sum the income and expenses of the transactions owned by `user_id`,
/// optionally limited to `date_range` (inclusive).
///
/// Transactions whose type is neither "income" nor "expense" are left out of
/// both totals. A user with no matching transactions gets a summary of zeros.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn summarize(
    user_id: UserID,
    date_range: &DateRange,
    connection: &Connection,
) -> Result<Summary, Error> {
    let clause = OwnedRowsClause::new(&user_id).in_range(date_range);

    // TOTAL() returns 0.0 rather than NULL when no rows match.
    let query = format!(
        "SELECT \
            TOTAL(CASE WHEN type = 'income' THEN amount END), \
            TOTAL(CASE WHEN type = 'expense' THEN amount END) \
        FROM \"transaction\" \
        WHERE {}",
        clause.sql()
    );

    connection
        .prepare(&query)?
        .query_row(clause.params(), |row| {
            Ok(Summary::new(row.get(0)?, row.get(1)?))
        })
        .map_err(Error::from)
}

/// A route handler for getting the logged in user's summary.
///
/// The query string may contain `start_date` and `end_date`.
pub async fn get_summary_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    date_range: Result<Query<DateRange>, QueryRejection>,
) -> Result<Json<Summary>, Error> {
    let Query(date_range) = date_range?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    summarize(user_id, &date_range, &connection).map(Json)
}

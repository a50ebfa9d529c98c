//! Defines the core data models and database queries for transactions.

use std::fmt::Display;

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, IntoDeserializer},
};
use time::Date;

use crate::{Error, database_id::TransactionId, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
///
/// Only [TransactionKind::Income] and [TransactionKind::Expense] count towards
/// a [Summary](crate::Summary). Any other label is kept as-is in
/// [TransactionKind::Other] so it can be stored and listed, but it is left out
/// of both totals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionKind {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
    /// Any label other than "income" or "expense", e.g. "transfer".
    Other(String),
}

impl TransactionKind {
    /// The label stored in the database and sent to clients.
    pub fn as_str(&self) -> &str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Other(label) => label,
        }
    }
}

impl From<String> for TransactionKind {
    fn from(label: String) -> Self {
        match label.as_str() {
            "income" => TransactionKind::Income,
            "expense" => TransactionKind::Expense,
            _ => TransactionKind::Other(label),
        }
    }
}

impl From<&str> for TransactionKind {
    fn from(label: &str) -> Self {
        TransactionKind::from(label.to_owned())
    }
}

impl From<TransactionKind> for String {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Other(label) => label,
            kind => kind.as_str().to_owned(),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Borrowed(ValueRef::Text(self.as_str().as_bytes())))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(TransactionKind::from)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// Transactions are always owned by a single user and are only visible to
/// that user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// A free text label for grouping transactions, e.g. "food".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
}

/// The fields a user supplies when creating or updating a transaction.
///
/// Updates replace every field, so this type is used for both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The amount of money spent or earned. The sign is not checked.
    pub amount: f64,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// A free text label for grouping transactions.
    #[serde(default)]
    pub category: String,
    /// A text description of what the transaction was for.
    #[serde(default)]
    pub description: String,
    /// When the transaction happened.
    #[serde(deserialize_with = "deserialize_iso_date")]
    pub date: Date,
}

impl NewTransaction {
    /// Shortcut for creating a transaction with an empty description.
    pub fn new(amount: f64, kind: impl Into<TransactionKind>, category: &str, date: Date) -> Self {
        Self {
            amount,
            kind: kind.into(),
            category: category.to_owned(),
            description: String::new(),
            date,
        }
    }

    /// Set the description of the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }
}

/// The years whose `YYYY-MM-DD` text sorts in calendar order.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Deserialize a date, rejecting years that cannot be written as four digits.
///
/// Dates are compared as text in SQL, so a year such as `-0001` or `+10000`
/// would sort out of calendar order.
pub(crate) fn deserialize_iso_date<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let date = Date::deserialize(deserializer)?;

    if !STORABLE_YEARS.contains(&date.year()) {
        return Err(de::Error::custom(format!(
            "the year of {date} must be between 0 and 9999"
        )));
    }

    Ok(date)
}

/// Like [deserialize_iso_date], for optional dates.
pub(crate) fn deserialize_optional_iso_date<'de, D>(
    deserializer: D,
) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|text| {
            let text: de::value::StringDeserializer<D::Error> = text.into_deserializer();
            deserialize_iso_date(text)
        })
        .transpose()
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns of the transaction table, in the order [map_transaction_row] expects.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount, type, category, description, date";

/// Create a new transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownUser] if `user_id` does not refer to a registered user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, amount, type, category, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id,
                new_transaction.amount,
                &new_transaction.kind,
                &new_transaction.category,
                &new_transaction.description,
                new_transaction.date,
            ),
            map_transaction_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::UnknownUser(user_id),
            error => error.into(),
        })?;

    tracing::debug!("Created transaction {} for user {user_id}", transaction.id);

    Ok(transaction)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                type TEXT NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                date TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id)
                )",
        (),
    )?;

    // Every query filters on the owner and most sort or filter by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserID::new(row.get(1)?);
    let amount = row.get(2)?;
    let kind = row.get(3)?;
    let category = row.get(4)?;
    let description = row.get(5)?;
    let date = row.get(6)?;

    Ok(Transaction {
        id,
        user_id,
        amount,
        kind,
        category,
        description,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================



#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        test_utils::{must_create_test_connection, must_create_test_user},
        transaction::{NewTransaction, TransactionKind, create_transaction},
        user::UserID,
    };

    #[test]
    fn create_succeeds() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);
        let new_transaction =
            NewTransaction::new(42.5, "expense", "food", date!(2024 - 01 - 15)).description("lunch");

        let transaction = create_transaction(user.id, new_transaction.clone(), &conn)
            .expect("could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.user_id, user.id);
        assert_eq!(transaction.amount, new_transaction.amount);
        assert_eq!(transaction.kind, TransactionKind::Expense);
        assert_eq!(transaction.category, "food");
        assert_eq!(transaction.description, "lunch");
        assert_eq!(transaction.date, date!(2024 - 01 - 15));
    }

    #[test]
    fn create_accepts_unknown_kind() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);

        let transaction = create_transaction(
            user.id,
            NewTransaction::new(10.0, "transfer", "savings", date!(2024 - 02 - 01)),
            &conn,
        )
        .expect("could not create transaction");

        assert_eq!(transaction.kind, TransactionKind::Other("transfer".to_owned()));
    }

    #[test]
    fn create_fails_for_unknown_user() {
        let conn = must_create_test_connection();
        let user_id = UserID::new(99);

        let result = create_transaction(
            user_id,
            NewTransaction::new(1.0, "income", "", date!(2024 - 01 - 01)),
            &conn,
        );

        assert_eq!(result, Err(Error::UnknownUser(user_id)));
    }

    #[test]
    fn ids_are_not_reused_after_deletion() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);
        let new_transaction = NewTransaction::new(1.0, "income", "", date!(2024 - 01 - 01));
        let first = create_transaction(user.id, new_transaction.clone(), &conn).unwrap();
        conn.execute("DELETE FROM \"transaction\"", ()).unwrap();

        let second = create_transaction(user.id, new_transaction, &conn).unwrap();

        assert!(second.id > first.id);
    }
}

//! Filtered queries over a user's transactions.

use rusqlite::{Connection, ToSql};
use serde::Deserialize;
use time::Date;

use crate::{Error, user::UserID};

use super::core::{
    TRANSACTION_COLUMNS, Transaction, deserialize_optional_iso_date, map_transaction_row,
};

/// An optional, inclusive range of dates.
///
/// Either end may be left open. Dates are compared as ISO `YYYY-MM-DD` text,
/// which orders the same way as the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DateRange {
    /// The earliest date to include.
    #[serde(default, deserialize_with = "deserialize_optional_iso_date")]
    pub start_date: Option<Date>,
    /// The latest date to include.
    #[serde(default, deserialize_with = "deserialize_optional_iso_date")]
    pub end_date: Option<Date>,
}

/// Restricts which transactions [list_transactions] returns.
///
/// Every field is optional and the default filter matches all of a user's
/// transactions. An empty category is treated as no category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionFilter {
    /// Only include transactions with exactly this category.
    pub category: Option<String>,
    /// Only include transactions on or after this date.
    #[serde(default, deserialize_with = "deserialize_optional_iso_date")]
    pub start_date: Option<Date>,
    /// Only include transactions on or before this date.
    #[serde(default, deserialize_with = "deserialize_optional_iso_date")]
    pub end_date: Option<Date>,
}

impl TransactionFilter {
    /// The date bounds of the filter.
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// The conditions of a `WHERE` clause that selects a single user's
/// transactions, along with the named parameters for those conditions.
pub(crate) struct OwnedRowsClause<'a> {
    conditions: Vec<&'static str>,
    params: Vec<(&'static str, &'a dyn ToSql)>,
}

impl<'a> OwnedRowsClause<'a> {
    /// Select rows owned by `user_id`.
    pub(crate) fn new(user_id: &'a UserID) -> Self {
        Self {
            conditions: vec!["user_id = :user_id"],
            params: vec![(":user_id", user_id as &dyn ToSql)],
        }
    }

    /// Only select rows whose date falls inside `range`.
    pub(crate) fn in_range(mut self, range: &'a DateRange) -> Self {
        if let Some(start_date) = &range.start_date {
            self.conditions.push("date >= :start_date");
            self.params.push((":start_date", start_date));
        }

        if let Some(end_date) = &range.end_date {
            self.conditions.push("date <= :end_date");
            self.params.push((":end_date", end_date));
        }

        self
    }

    /// Only select rows with `category`, if it is set and non-empty.
    pub(crate) fn with_category(mut self, category: Option<&'a String>) -> Self {
        if let Some(category) = category.filter(|category| !category.is_empty()) {
            self.conditions.push("category = :category");
            self.params.push((":category", category));
        }

        self
    }

    /// The conditions joined with `AND`, ready to follow `WHERE`.
    pub(crate) fn sql(&self) -> String {
        self.conditions.join(" AND ")
    }

    pub(crate) fn params(&self) -> &[(&'static str, &'a dyn ToSql)] {
        &self.params
    }
}

/// Get the transactions owned by `user_id` that match `filter`.
///
/// Transactions are sorted by date, newest first. Transactions on the same
/// date are ordered by ID, most recently created first.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn list_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let date_range = filter.date_range();
    let clause = OwnedRowsClause::new(&user_id)
        .with_category(filter.category.as_ref())
        .in_range(&date_range);

    let query = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
        WHERE {} \
        ORDER BY date DESC, id DESC",
        clause.sql()
    );

    connection
        .prepare(&query)?
        .query_map(clause.params(), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        test_utils::{must_create_test_connection, must_create_test_user},
        transaction::{NewTransaction, Transaction, TransactionKind, create_transaction},
        user::UserID,
    };

    use super::{TransactionFilter, list_transactions};

    fn create(user_id: UserID, transaction: NewTransaction, conn: &Connection) -> Transaction {
        create_transaction(user_id, transaction, conn).expect("could not create transaction")
    }

    #[test]
    fn list_returns_created_transaction() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);
        let want = create(
            user.id,
            NewTransaction::new(42.50, "expense", "food", date!(2024 - 01 - 15)).description("lunch"),
            &conn,
        );

        let got = list_transactions(user.id, &TransactionFilter::default(), &conn).unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn list_is_empty_for_new_user() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);

        let got = list_transactions(user.id, &TransactionFilter::default(), &conn).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn list_only_returns_own_transactions() {
        let conn = must_create_test_connection();
        let alice = must_create_test_user("alice", &conn);
        let bob = must_create_test_user("bob", &conn);
        let alices = create(
            alice.id,
            NewTransaction::new(1.0, "income", "pay", date!(2024 - 01 - 01)),
            &conn,
        );
        create(
            bob.id,
            NewTransaction::new(2.0, "income", "pay", date!(2024 - 01 - 01)),
            &conn,
        );

        let got = list_transactions(alice.id, &TransactionFilter::default(), &conn).unwrap();

        assert_eq!(got, vec![alices]);
    }

    #[test]
    fn list_sorts_by_date_descending() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);
        for date in [
            date!(2024 - 03 - 01),
            date!(2024 - 01 - 01),
            date!(2024 - 12 - 31),
            date!(2024 - 02 - 29),
        ] {
            create(user.id, NewTransaction::new(1.0, "expense", "", date), &conn);
        }

        let got: Vec<_> = list_transactions(user.id, &TransactionFilter::default(), &conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.date)
            .collect();

        assert_eq!(
            got,
            vec![
                date!(2024 - 12 - 31),
                date!(2024 - 03 - 01),
                date!(2024 - 02 - 29),
                date!(2024 - 01 - 01),
            ]
        );
    }

    #[test]
    fn list_orders_same_day_by_newest_first() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);
        let first = create(
            user.id,
            NewTransaction::new(1.0, "expense", "", date!(2024 - 01 - 01)),
            &conn,
        );
        let second = create(
            user.id,
            NewTransaction::new(2.0, "expense", "", date!(2024 - 01 - 01)),
            &conn,
        );

        let got = list_transactions(user.id, &TransactionFilter::default(), &conn).unwrap();

        assert_eq!(got, vec![second, first]);
    }

    #[test]
    fn list_includes_unrecognised_types() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);
        let transfer = create(
            user.id,
            NewTransaction::new(50.0, "transfer", "savings", date!(2024 - 01 - 01)),
            &conn,
        );

        let got = list_transactions(user.id, &TransactionFilter::default(), &conn).unwrap();

        assert_eq!(got, vec![transfer]);
        assert_eq!(got[0].kind, TransactionKind::Other("transfer".to_owned()));
    }

    #[test]
    fn filter_rejects_dates_outside_four_digit_years() {
        let result = serde_json::from_value::<TransactionFilter>(serde_json::json!({
            "start_date": "-0002-06-01",
        }));

        assert!(result.is_err());
    }

    #[test]
    fn filter_allows_missing_dates() {
        let filter: TransactionFilter =
            serde_json::from_value(serde_json::json!({ "category": "food" })).unwrap();

        assert_eq!(filter.start_date, None);
        assert_eq!(filter.end_date, None);
    }

    #[test]
    fn list_filters_by_category() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);
        let food = create(
            user.id,
            NewTransaction::new(5.0, "expense", "food", date!(2024 - 01 - 01)),
            &conn,
        );
        create(
            user.id,
            NewTransaction::new(5.0, "expense", "Food", date!(2024 - 01 - 01)),
            &conn,
        );
        create(
            user.id,
            NewTransaction::new(5.0, "expense", "rent", date!(2024 - 01 - 01)),
            &conn,
        );
        let filter = TransactionFilter {
            category: Some("food".to_owned()),
            ..Default::default()
        };

        let got = list_transactions(user.id, &filter, &conn).unwrap();

        assert_eq!(got, vec![food]);
    }

    #[test]
    fn list_ignores_empty_category() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);
        create(
            user.id,
            NewTransaction::new(5.0, "expense", "food", date!(2024 - 01 - 01)),
            &conn,
        );
        let filter = TransactionFilter {
            category: Some(String::new()),
            ..Default::default()
        };

        let got = list_transactions(user.id, &filter, &conn).unwrap();

        assert_eq!(got.len(), 1);
    }

    #[test]
    fn list_date_bounds_are_inclusive() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);
        for date in [
            date!(2024 - 01 - 31),
            date!(2024 - 02 - 01),
            date!(2024 - 02 - 15),
            date!(2024 - 02 - 29),
            date!(2024 - 03 - 01),
        ] {
            create(user.id, NewTransaction::new(1.0, "expense", "", date), &conn);
        }
        let filter = TransactionFilter {
            start_date: Some(date!(2024 - 02 - 01)),
            end_date: Some(date!(2024 - 02 - 29)),
            ..Default::default()
        };

        let got: Vec<_> = list_transactions(user.id, &filter, &conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.date)
            .collect();

        assert_eq!(
            got,
            vec![
                date!(2024 - 02 - 29),
                date!(2024 - 02 - 15),
                date!(2024 - 02 - 01),
            ]
        );
    }

    #[test]
    fn list_combines_category_and_open_ended_range() {
        let conn = must_create_test_connection();
        let user = must_create_test_user("alice", &conn);
        create(
            user.id,
            NewTransaction::new(1.0, "expense", "food", date!(2023 - 12 - 31)),
            &conn,
        );
        let want = create(
            user.id,
            NewTransaction::new(2.0, "expense", "food", date!(2024 - 01 - 01)),
            &conn,
        );
        create(
            user.id,
            NewTransaction::new(3.0, "expense", "rent", date!(2024 - 01 - 02)),
            &conn,
        );
        let filter = TransactionFilter {
            category: Some("food".to_owned()),
            start_date: Some(date!(2024 - 01 - 01)),
            end_date: None,
        };

        let got = list_transactions(user.id, &filter, &conn).unwrap();

        assert_eq!(got, vec![want]);
    }
}

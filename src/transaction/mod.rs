//! Transaction management for the expense tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `NewTransaction` for creating and updating transactions
//! - Database functions for storing, querying, and managing a user's transactions
//! - Route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod query;
mod state;

pub use core::{
    NewTransaction, Transaction, TransactionKind, create_transaction, create_transaction_table,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::{delete_transaction, delete_transaction_endpoint};
pub use edit_endpoint::{edit_transaction_endpoint, update_transaction};
pub use list_endpoint::list_transactions_endpoint;
pub use query::{DateRange, TransactionFilter, list_transactions};
pub use state::TransactionState;

pub(crate) use query::OwnedRowsClause;

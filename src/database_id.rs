//! Database ID type definitions.

/// Alias for the integer type used for transaction IDs in the database.
pub type TransactionId = i64;

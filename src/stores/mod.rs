//! Contains the store trait that statements are loaded through and its
//! SQLite implementation.

mod transaction;

pub mod sqlite;

pub use sqlite::SQLiteTransactionStore;
pub use transaction::TransactionStore;

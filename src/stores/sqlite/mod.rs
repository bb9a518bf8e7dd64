//! Contains the SQLite backed implementations of the stores.

pub mod transaction;

pub use transaction::SQLiteTransactionStore;

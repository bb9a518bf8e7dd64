//! Club Ledger keeps the books for a club's bank accounts.
//!
//! This library provides the statement engine, which turns an account and
//! its transactions into a running-balance statement over a date window, and
//! a SQLite store for the accounts and transactions it reads.

#![warn(missing_docs)]

mod account;
mod database_id;
mod db;
mod error;
mod logging;
mod transaction;

pub mod ledger;
pub mod stores;

pub use account::{Account, create_account, get_account, get_accounts};
pub use database_id::{AccountId, DatabaseId, TransactionId};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use ledger::{
    BalanceDrift, Statement, StatementLine, StatementRequest, StatementWindow, WindowPreset,
    assemble_statement, compute_window, load_statement,
};
pub use logging::setup_logging;
pub use stores::{SQLiteTransactionStore, TransactionStore};
pub use transaction::{
    Transaction, TransactionBuilder, TransactionStatus, TransactionType, create_transaction,
    delete_transaction, get_transaction, list_transactions, update_transaction,
};

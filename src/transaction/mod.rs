//! Transactions on club accounts.
//!
//! This module contains the `Transaction` model, the `TransactionBuilder` for
//! creating transactions and the database functions for storing them. Every
//! write also moves the owning account's current balance.

mod core;

pub use core::{
    Transaction, TransactionBuilder, TransactionStatus, TransactionType, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, list_transactions,
    update_transaction,
};

//! Defines the transaction store trait.

use rust_decimal::Decimal;

use crate::{
    Error,
    account::Account,
    database_id::{AccountId, TransactionId},
    transaction::{Transaction, TransactionBuilder},
};

/// Handles the storage of accounts and their transactions.
///
/// Every mutation must keep the account's current balance in step with its
/// transactions, statements are reconciled against that balance.
pub trait TransactionStore {
    /// Create a new account whose current balance starts at `initial_balance`.
    fn create_account(&mut self, label: &str, initial_balance: Decimal)
    -> Result<Account, Error>;

    /// Retrieve an account, failing with [Error::UnknownAccount] if it does
    /// not exist.
    fn get_account(&self, id: AccountId) -> Result<Account, Error>;

    /// Retrieve every transaction for an account, in no particular date order.
    ///
    /// Implementers should skip, rather than fail on, records that cannot be
    /// interpreted.
    fn list_transactions(&self, account_id: AccountId) -> Result<Vec<Transaction>, Error>;

    /// Create a new transaction in the store.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Replace an existing transaction.
    fn update(
        &mut self,
        id: TransactionId,
        builder: TransactionBuilder,
    ) -> Result<Transaction, Error>;

    /// Remove a transaction from the store.
    fn delete(&mut self, id: TransactionId) -> Result<(), Error>;
}

//! Implements a SQLite backed transaction store.
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::{
    Error,
    account::{self, Account},
    database_id::{AccountId, TransactionId},
    stores::TransactionStore,
    transaction::{self, Transaction, TransactionBuilder},
};

/// Stores accounts and transactions in a SQLite database.
///
/// The database must be set up with [initialize](crate::initialize_db) first.
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection.lock().map_err(|error| {
            tracing::error!("Could not acquire database lock: {error}");
            Error::DatabaseLockError
        })
    }
}

impl TransactionStore for SQLiteTransactionStore {
    /// Create a new account in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DuplicateAccountLabel] if the label is taken,
    /// - [Error::DatabaseLockError] if the connection lock is poisoned,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create_account(&mut self, label: &str, initial_balance: Decimal) -> Result<Account, Error> {
        account::create_account(label, initial_balance, &*self.connection()?)
    }

    fn get_account(&self, id: AccountId) -> Result<Account, Error> {
        account::get_account(id, &*self.connection()?)
    }

    /// Retrieve the transactions for an account in the order they were
    /// recorded, skipping rows that cannot be interpreted.
    fn list_transactions(&self, account_id: AccountId) -> Result<Vec<Transaction>, Error> {
        transaction::list_transactions(account_id, &*self.connection()?)
    }

    /// Create a new transaction and update the account's current balance.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidAmount] if the amount is negative,
    /// - [Error::UnknownAccount] if the account does not exist,
    /// - [Error::DatabaseLockError] if the connection lock is poisoned,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error> {
        transaction::create_transaction(builder, &*self.connection()?)
    }

    /// Replace a transaction and move the account balances accordingly.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction,
    /// - [Error::DatabaseLockError] if the connection lock is poisoned,
    /// - or any error [create](Self::create) can return.
    fn update(
        &mut self,
        id: TransactionId,
        builder: TransactionBuilder,
    ) -> Result<Transaction, Error> {
        transaction::update_transaction(id, builder, &*self.connection()?)
    }

    /// Delete a transaction and undo its effect on the account balance.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction,
    /// - [Error::DatabaseLockError] if the connection lock is poisoned,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: TransactionId) -> Result<(), Error> {
        transaction::delete_transaction(id, &*self.connection()?)
    }
}

#[cfg(test)]
mod sqlite_transaction_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        ledger::project_balances,
        stores::TransactionStore,
        transaction::{Transaction, TransactionType},
    };

    use super::SQLiteTransactionStore;

    fn get_test_store() -> SQLiteTransactionStore {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn get_unknown_account_fails() {
        let store = get_test_store();

        assert_eq!(store.get_account(5), Err(Error::UnknownAccount(5)));
    }

    #[test]
    fn current_balance_matches_replayed_ledger_after_writes() {
        let mut store = get_test_store();
        let account = store.create_account("Club Savings", dec!(250.40)).unwrap();
        let first = store
            .create(Transaction::build(
                account.id,
                TransactionType::Income,
                dec!(19.99),
                date!(2025 - 04 - 02),
                "Raffle",
            ))
            .unwrap();
        store
            .create(Transaction::build(
                account.id,
                TransactionType::Expense,
                dec!(120.00),
                date!(2025 - 04 - 01),
                "Umpires",
            ))
            .unwrap();
        let third = store
            .create(Transaction::build(
                account.id,
                TransactionType::Income,
                dec!(0.01),
                date!(2025 - 04 - 03),
                "Interest",
            ))
            .unwrap();
        store
            .update(
                first.id,
                Transaction::build(
                    account.id,
                    TransactionType::Income,
                    dec!(29.99),
                    date!(2025 - 04 - 02),
                    "Raffle",
                ),
            )
            .unwrap();
        store.delete(third.id).unwrap();

        let account = store.get_account(account.id).unwrap();
        let mut ledger = store.list_transactions(account.id).unwrap();
        ledger.sort_by_key(|transaction| transaction.date);
        let replayed = project_balances(account.initial_balance, &ledger)
            .last()
            .copied()
            .unwrap_or(Decimal::ZERO);

        assert_eq!(replayed, dec!(160.39));
        assert_eq!(account.current_balance, replayed);
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let store = get_test_store();
        let connection = store.connection.clone();
        let _ = std::thread::spawn(move || {
            let _guard = connection.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert_eq!(store.get_account(1), Err(Error::DatabaseLockError));
    }
}

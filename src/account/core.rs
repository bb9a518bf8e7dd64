use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{Error, database_id::AccountId, db::get_decimal};

/// A club bank account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// A human readable name for the account, e.g. "Club Savings".
    pub label: String,
    /// The balance of the account before any recorded transaction.
    pub initial_balance: Decimal,
    /// The authoritative balance after every recorded transaction.
    ///
    /// This is maintained by the store on every transaction write and is the
    /// value statements are reconciled against.
    pub current_balance: Decimal,
}

/// Create the account table in the database.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            label TEXT NOT NULL UNIQUE,
            initial_balance TEXT NOT NULL,
            current_balance TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Map a database row to an [Account].
fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let label = row.get(1)?;
    let initial_balance = get_decimal(row, 2)?;
    let current_balance = get_decimal(row, 3)?;

    Ok(Account {
        id,
        label,
        initial_balance,
        current_balance,
    })
}

/// Create a new account whose current balance starts at `initial_balance`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateAccountLabel] if an account called `label` already exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_account(
    label: &str,
    initial_balance: Decimal,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .prepare(
            "INSERT INTO account (label, initial_balance, current_balance)
             VALUES (?1, ?2, ?2)
             RETURNING id, label, initial_balance, current_balance",
        )?
        .query_row((label, initial_balance.to_string()), map_row_to_account)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateAccountLabel(label.to_owned()),
            error => error.into(),
        })
}

/// Retrieve an account by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownAccount] if `id` does not refer to an account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(
            "SELECT id, label, initial_balance, current_balance FROM account WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_row_to_account)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::UnknownAccount(id),
            error => error.into(),
        })
}

/// Retrieve all accounts ordered by label.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn get_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    let mut stmt = connection.prepare(
        "SELECT id, label, initial_balance, current_balance FROM account ORDER BY label ASC",
    )?;

    let accounts = stmt
        .query_map([], map_row_to_account)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect();

    accounts
}

/// Add `change` to the current balance of account `id`.
///
/// Callers should run this inside the same SQL transaction as the write that
/// caused the change so the balance never disagrees with the ledger.
///
/// # Errors
/// This function will return a:
/// - [Error::UnknownAccount] if `id` does not refer to an account,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn apply_balance_change(
    id: AccountId,
    change: Decimal,
    connection: &Connection,
) -> Result<Decimal, Error> {
    let account = get_account(id, connection)?;
    let new_balance = account.current_balance + change;

    connection.execute(
        "UPDATE account SET current_balance = ?1 WHERE id = ?2",
        (new_balance.to_string(), id),
    )?;

    Ok(new_balance)
}

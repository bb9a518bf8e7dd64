//! Defines the core data models and database queries for transactions.

use std::{fmt, str::FromStr};

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    Error,
    account::apply_balance_change,
    database_id::{AccountId, TransactionId},
};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money came into or went out of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money paid into the account, e.g. membership fees.
    Income,
    /// Money paid out of the account, e.g. court hire.
    Expense,
}

impl TransactionType {
    /// The string stored in the database for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// The effect of a transaction of this type with `amount` on a balance.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unrecognised transaction type \"{other}\"")),
        }
    }
}

/// Where a transaction is in its settlement lifecycle.
///
/// Every status counts towards balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The money has moved.
    #[default]
    Completed,
    /// The money is expected to move.
    Pending,
    /// The transaction was called off.
    Cancelled,
}

impl TransactionStatus {
    /// The string stored in the database for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unrecognised transaction status \"{other}\"")),
        }
    }
}

/// An income or expense on a club account.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The account the transaction belongs to.
    pub account_id: AccountId,
    /// Whether the amount was paid in or out.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The unsigned amount of money that moved.
    pub amount: Decimal,
    /// When the transaction happened.
    pub date: Date,
    /// A text description of what the transaction was for.
    pub description: String,
    /// Who paid or was paid, if known.
    pub counterparty: Option<String>,
    /// The settlement status.
    pub status: TransactionStatus,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        account_id: AccountId,
        kind: TransactionType,
        amount: Decimal,
        date: Date,
        description: &str,
    ) -> TransactionBuilder {
        TransactionBuilder {
            account_id,
            kind,
            amount,
            date,
            description: description.to_owned(),
            counterparty: None,
            status: TransactionStatus::default(),
        }
    }

    /// The effect of this transaction on its account's balance.
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// A builder for creating [Transaction] instances.
///
/// # Examples
///
/// ```ignore
/// use rust_decimal_macros::dec;
/// use time::macros::date;
///
/// let builder = Transaction::build(
///         1,
///         TransactionType::Income,
///         dec!(45.00),
///         date!(2025-01-15),
///         "Match fees"
///     )
///     .counterparty(Some("Home team"))
///     .status(TransactionStatus::Pending);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The account the transaction belongs to.
    pub account_id: AccountId,

    /// Whether the amount is paid in or out.
    pub kind: TransactionType,

    /// The amount of money that moved.
    ///
    /// Must not be negative, the direction is given by `kind`.
    pub amount: Decimal,

    /// The date when the transaction occurred.
    ///
    /// Only the calendar date is kept, transactions on the same day are
    /// ordered by when they were recorded.
    pub date: Date,

    /// A human-readable description of the transaction.
    pub description: String,

    /// Who paid or was paid.
    pub counterparty: Option<String>,

    /// The settlement status, defaults to [TransactionStatus::Completed].
    pub status: TransactionStatus,
}

impl TransactionBuilder {
    /// Set the counterparty for the transaction.
    pub fn counterparty(mut self, counterparty: Option<&str>) -> Self {
        self.counterparty = counterparty.map(str::to_owned);
        self
    }

    /// Set the status for the transaction.
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    fn validate(&self) -> Result<(), Error> {
        if self.amount < Decimal::ZERO {
            return Err(Error::InvalidAmount(format!(
                "{} is negative, use the transaction type to record money paid out",
                self.amount
            )));
        }

        Ok(())
    }
}

/// A transaction row as stored, before its text columns are validated.
struct TransactionRow {
    id: TransactionId,
    account_id: AccountId,
    kind: String,
    amount: String,
    date: String,
    description: String,
    counterparty: Option<String>,
    status: String,
}

impl TransactionRow {
    fn into_transaction(self) -> Result<Transaction, Error> {
        let row = self;
        let id = row.id;
        let malformed = move |reason: String| Error::MalformedTransaction { id, reason };

        let kind = row.kind.parse::<TransactionType>().map_err(malformed)?;
        let status = row.status.parse::<TransactionStatus>().map_err(malformed)?;
        let amount = Decimal::from_str(&row.amount)
            .map_err(|error| malformed(format!("invalid amount \"{}\": {error}", row.amount)))?;
        let date = Date::parse(&row.date, format_description!("[year]-[month]-[day]"))
            .map_err(|error| malformed(format!("invalid date \"{}\": {error}", row.date)))?;

        Ok(Transaction {
            id: row.id,
            account_id: row.account_id,
            kind,
            amount,
            date,
            description: row.description,
            counterparty: row.counterparty,
            status,
        })
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_COLUMNS: &str =
    "id, account_id, kind, amount, date, description, counterparty, status";

/// Create a new transaction and apply its effect to the account balance.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is negative,
/// - [Error::UnknownAccount] if the account does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let tx = connection.unchecked_transaction()?;

    let row = tx
        .prepare(&format!(
            "INSERT INTO \"transaction\"
                (account_id, kind, amount, date, description, counterparty, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            (
                builder.account_id,
                builder.kind.as_str(),
                builder.amount.to_string(),
                builder.date,
                &builder.description,
                &builder.counterparty,
                builder.status.as_str(),
            ),
            map_transaction_row,
        )
        .map_err(|error| map_foreign_key_error(error, builder.account_id))?;
    let transaction = row.into_transaction()?;

    apply_balance_change(transaction.account_id, transaction.signed_amount(), &tx)?;
    tx.commit()?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - [Error::MalformedTransaction] if the stored row cannot be interpreted,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let row = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    row.into_transaction()
}

/// Replace the transaction `id` and move the account balance(s) accordingly.
///
/// The old effect is undone on the old account before the new effect is
/// applied, so moving a transaction between accounts keeps both balances
/// consistent. A stored row that cannot be interpreted never counted towards
/// a statement, so it is overwritten without undoing anything.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the new amount is negative,
/// - [Error::UpdateMissingTransaction] if `id` does not refer to a transaction,
/// - [Error::UnknownAccount] if the new account does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    builder.validate()?;

    let tx = connection.unchecked_transaction()?;

    let old = match get_transaction(id, &tx) {
        Err(Error::NotFound) => return Err(Error::UpdateMissingTransaction),
        Err(Error::MalformedTransaction { id, reason }) => {
            tracing::warn!("Replacing malformed transaction {id} without undoing it: {reason}");
            None
        }
        result => Some(result?),
    };

    let row = tx
        .prepare(&format!(
            "UPDATE \"transaction\"
             SET account_id = ?1, kind = ?2, amount = ?3, date = ?4, description = ?5,
                 counterparty = ?6, status = ?7
             WHERE id = ?8
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            (
                builder.account_id,
                builder.kind.as_str(),
                builder.amount.to_string(),
                builder.date,
                &builder.description,
                &builder.counterparty,
                builder.status.as_str(),
                id,
            ),
            map_transaction_row,
        )
        .map_err(|error| map_foreign_key_error(error, builder.account_id))?;
    let transaction = row.into_transaction()?;

    if let Some(old) = old {
        apply_balance_change(old.account_id, -old.signed_amount(), &tx)?;
    }
    apply_balance_change(transaction.account_id, transaction.signed_amount(), &tx)?;
    tx.commit()?;

    Ok(transaction)
}

/// Delete the transaction `id` and undo its effect on the account balance.
///
/// A stored row that cannot be interpreted is removed without touching the
/// balance.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingTransaction] if `id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let tx = connection.unchecked_transaction()?;

    let old = match get_transaction(id, &tx) {
        Err(Error::NotFound) => return Err(Error::DeleteMissingTransaction),
        Err(Error::MalformedTransaction { id, reason }) => {
            tracing::warn!("Deleting malformed transaction {id} without undoing it: {reason}");
            None
        }
        result => Some(result?),
    };

    tx.execute("DELETE FROM \"transaction\" WHERE id = ?1", (id,))?;
    if let Some(old) = old {
        apply_balance_change(old.account_id, -old.signed_amount(), &tx)?;
    }
    tx.commit()?;

    Ok(())
}

/// Get the transactions for an account in the order they were recorded.
///
/// Rows that cannot be interpreted are logged and skipped so that one bad
/// record does not hide the rest of the ledger.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    account_id: AccountId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut stmt = connection.prepare(&format!(
        "SELECT {SELECT_COLUMNS} FROM \"transaction\" WHERE account_id = :account_id ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map(&[(":account_id", &account_id)], map_transaction_row)?;

    let mut transactions = Vec::new();
    for row in rows {
        match row?.into_transaction() {
            Ok(transaction) => transactions.push(transaction),
            Err(error) => tracing::warn!("Skipping transaction on account {account_id}: {error}"),
        }
    }

    Ok(transactions)
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                kind TEXT NOT NULL,
                amount TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                counterparty TEXT,
                status TEXT NOT NULL,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_account_date ON \"transaction\"(account_id, date);",
        (),
    )?;

    Ok(())
}

fn map_transaction_row(row: &Row) -> Result<TransactionRow, rusqlite::Error> {
    Ok(TransactionRow {
        id: row.get(0)?,
        account_id: row.get(1)?,
        kind: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        counterparty: row.get(6)?,
        status: row.get(7)?,
    })
}

fn map_foreign_key_error(error: rusqlite::Error, account_id: AccountId) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::UnknownAccount(account_id),
        error => error.into(),
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::{
        Error,
        account::{Account, create_account, get_account},
        db::initialize,
    };

    use super::{
        Transaction, TransactionStatus, TransactionType, create_transaction, delete_transaction,
        get_transaction, list_transactions, update_transaction,
    };

    fn get_test_connection() -> (Connection, Account) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let account = create_account("Club Savings", dec!(1000), &conn).unwrap();
        (conn, account)
    }

    fn current_balance(conn: &Connection, account: &Account) -> Decimal {
        get_account(account.id, conn).unwrap().current_balance
    }

    #[test]
    fn create_succeeds() {
        let (conn, account) = get_test_connection();

        let transaction = create_transaction(
            Transaction::build(
                account.id,
                TransactionType::Income,
                dec!(200),
                date!(2025 - 01 - 05),
                "Subscriptions",
            )
            .counterparty(Some("Members"))
            .status(TransactionStatus::Pending),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.amount, dec!(200));
        assert_eq!(transaction.counterparty.as_deref(), Some("Members"));
        assert_eq!(transaction.status, TransactionStatus::Pending);
        assert_eq!(get_transaction(transaction.id, &conn), Ok(transaction));
    }

    #[test]
    fn create_updates_current_balance() {
        let (conn, account) = get_test_connection();

        create_transaction(
            Transaction::build(
                account.id,
                TransactionType::Expense,
                dec!(50.25),
                date!(2025 - 01 - 10),
                "Balls",
            ),
            &conn,
        )
        .unwrap();

        assert_eq!(current_balance(&conn, &account), dec!(949.75));
    }

    #[test]
    fn create_fails_on_negative_amount() {
        let (conn, account) = get_test_connection();

        let result = create_transaction(
            Transaction::build(
                account.id,
                TransactionType::Income,
                dec!(-1),
                date!(2025 - 01 - 10),
                "",
            ),
            &conn,
        );

        assert!(matches!(result, Err(Error::InvalidAmount(_))));
        assert_eq!(current_balance(&conn, &account), dec!(1000));
    }

    #[test]
    fn create_fails_on_unknown_account() {
        let (conn, _) = get_test_connection();

        let result = create_transaction(
            Transaction::build(
                999,
                TransactionType::Income,
                dec!(1),
                date!(2025 - 01 - 10),
                "",
            ),
            &conn,
        );

        assert_eq!(result, Err(Error::UnknownAccount(999)));
    }

    #[test]
    fn get_fails_on_missing_transaction() {
        let (conn, _) = get_test_connection();

        assert_eq!(get_transaction(1, &conn), Err(Error::NotFound));
    }

    #[test]
    fn update_replaces_balance_effect() {
        let (conn, account) = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(
                account.id,
                TransactionType::Income,
                dec!(100),
                date!(2025 - 01 - 05),
                "Raffle",
            ),
            &conn,
        )
        .unwrap();

        let updated = update_transaction(
            transaction.id,
            Transaction::build(
                account.id,
                TransactionType::Expense,
                dec!(40),
                date!(2025 - 01 - 06),
                "Raffle prizes",
            ),
            &conn,
        )
        .unwrap();

        assert_eq!(updated.id, transaction.id);
        assert_eq!(updated.kind, TransactionType::Expense);
        assert_eq!(current_balance(&conn, &account), dec!(960));
    }

    #[test]
    fn update_moves_effect_between_accounts() {
        let (conn, savings) = get_test_connection();
        let tour = create_account("Tour Fund", dec!(0), &conn).unwrap();
        let transaction = create_transaction(
            Transaction::build(
                savings.id,
                TransactionType::Income,
                dec!(75),
                date!(2025 - 02 - 01),
                "Donation",
            ),
            &conn,
        )
        .unwrap();

        update_transaction(
            transaction.id,
            Transaction::build(
                tour.id,
                TransactionType::Income,
                dec!(75),
                date!(2025 - 02 - 01),
                "Donation",
            ),
            &conn,
        )
        .unwrap();

        assert_eq!(current_balance(&conn, &savings), dec!(1000));
        assert_eq!(current_balance(&conn, &tour), dec!(75));
    }

    #[test]
    fn update_fails_on_missing_transaction() {
        let (conn, account) = get_test_connection();

        let result = update_transaction(
            7,
            Transaction::build(
                account.id,
                TransactionType::Income,
                dec!(1),
                date!(2025 - 01 - 01),
                "",
            ),
            &conn,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_undoes_balance_effect() {
        let (conn, account) = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(
                account.id,
                TransactionType::Expense,
                dec!(300),
                date!(2025 - 03 - 01),
                "Court hire",
            ),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, &conn).unwrap();

        assert_eq!(current_balance(&conn, &account), dec!(1000));
        assert_eq!(get_transaction(transaction.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_fails_on_missing_transaction() {
        let (conn, _) = get_test_connection();

        assert_eq!(
            delete_transaction(3, &conn),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn list_returns_only_the_accounts_transactions_in_store_order() {
        let (conn, savings) = get_test_connection();
        let tour = create_account("Tour Fund", dec!(0), &conn).unwrap();
        for (account_id, date) in [
            (savings.id, date!(2025 - 01 - 20)),
            (tour.id, date!(2025 - 01 - 01)),
            (savings.id, date!(2025 - 01 - 05)),
        ] {
            create_transaction(
                Transaction::build(account_id, TransactionType::Income, dec!(1), date, ""),
                &conn,
            )
            .unwrap();
        }

        let dates: Vec<_> = list_transactions(savings.id, &conn)
            .unwrap()
            .into_iter()
            .map(|transaction| transaction.date)
            .collect();

        assert_eq!(dates, vec![date!(2025 - 01 - 20), date!(2025 - 01 - 05)]);
    }

    #[test]
    fn list_skips_malformed_rows() {
        let (conn, account) = get_test_connection();
        create_transaction(
            Transaction::build(
                account.id,
                TransactionType::Income,
                dec!(5),
                date!(2025 - 01 - 01),
                "Good",
            ),
            &conn,
        )
        .unwrap();
        conn.execute(
            "INSERT INTO \"transaction\" (account_id, kind, amount, date, description, status)
             VALUES (?1, 'transfer', '5', '2025-01-02', 'Bad type', 'completed'),
                    (?1, 'income', 'five', '2025-01-03', 'Bad amount', 'completed'),
                    (?1, 'income', '5', '01/02/2025', 'Bad date', 'completed')",
            (account.id,),
        )
        .unwrap();

        let got = list_transactions(account.id, &conn).unwrap();

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].description, "Good");
    }

    #[test]
    fn get_reports_malformed_row() {
        let (conn, account) = get_test_connection();
        conn.execute(
            "INSERT INTO \"transaction\" (id, account_id, kind, amount, date, description, status)
             VALUES (9, ?1, 'income', '5', '2025-01-02', '', 'lost')",
            (account.id,),
        )
        .unwrap();

        let result = get_transaction(9, &conn);

        assert!(matches!(
            result,
            Err(Error::MalformedTransaction { id: 9, .. })
        ));
    }

    #[test]
    fn delete_removes_malformed_row_without_moving_balance() {
        let (conn, account) = get_test_connection();
        conn.execute(
            "INSERT INTO \"transaction\" (id, account_id, kind, amount, date, description, status)
             VALUES (9, ?1, 'transfer', '5', '2025-01-02', '', 'completed')",
            (account.id,),
        )
        .unwrap();

        delete_transaction(9, &conn).unwrap();

        assert_eq!(get_transaction(9, &conn), Err(Error::NotFound));
        assert_eq!(current_balance(&conn, &account), dec!(1000));
    }

    #[test]
    fn update_overwrites_malformed_row() {
        let (conn, account) = get_test_connection();
        conn.execute(
            "INSERT INTO \"transaction\" (id, account_id, kind, amount, date, description, status)
             VALUES (4, ?1, 'income', 'five', '2025-01-02', 'Raffle', 'completed')",
            (account.id,),
        )
        .unwrap();

        let updated = update_transaction(
            4,
            Transaction::build(
                account.id,
                TransactionType::Income,
                dec!(5),
                date!(2025 - 01 - 02),
                "Raffle",
            ),
            &conn,
        )
        .unwrap();

        assert_eq!(get_transaction(4, &conn), Ok(updated));
        assert_eq!(current_balance(&conn, &account), dec!(1005));
    }
}

//! Transaction fixtures for ledger tests.

use rust_decimal::Decimal;
use time::Date;

use crate::{
    database_id::{AccountId, TransactionId},
    transaction::{Transaction, TransactionStatus, TransactionType},
};

pub const TEST_ACCOUNT_ID: AccountId = 1;

pub fn income(id: TransactionId, date: Date, amount: Decimal) -> Transaction {
    transaction(id, TransactionType::Income, date, amount)
}

pub fn expense(id: TransactionId, date: Date, amount: Decimal) -> Transaction {
    transaction(id, TransactionType::Expense, date, amount)
}

fn transaction(
    id: TransactionId,
    kind: TransactionType,
    date: Date,
    amount: Decimal,
) -> Transaction {
    Transaction {
        id,
        account_id: TEST_ACCOUNT_ID,
        kind,
        amount,
        date,
        description: format!("T{id}"),
        counterparty: None,
        status: TransactionStatus::Completed,
    }
}

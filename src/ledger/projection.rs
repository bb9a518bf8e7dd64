//! Forward running-balance projection over a ledger.

use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::transaction::Transaction;

use super::window::Dated;

/// A transaction together with the account balance immediately after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementLine {
    /// The transaction on this line.
    pub transaction: Transaction,
    /// The running balance after `transaction` was applied.
    pub balance_after: Decimal,
}

impl Dated for StatementLine {
    fn date(&self) -> Date {
        self.transaction.date
    }
}

/// Order `transactions` by ascending date.
///
/// The sort is stable, transactions on the same day keep the order they were
/// given in.
pub fn sort_ledger(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    transactions.sort_by_key(|transaction| transaction.date);
    transactions
}

/// The running balance after each of `transactions`, starting from
/// `initial_balance`.
///
/// `transactions` must already be in ascending date order.
pub fn project_balances(initial_balance: Decimal, transactions: &[Transaction]) -> Vec<Decimal> {
    transactions
        .iter()
        .scan(initial_balance, |balance, transaction| {
            *balance += transaction.signed_amount();
            Some(*balance)
        })
        .collect()
}

/// Pair each transaction with its projected running balance.
pub fn project_ledger(
    initial_balance: Decimal,
    transactions: Vec<Transaction>,
) -> Vec<StatementLine> {
    let balances = project_balances(initial_balance, &transactions);

    transactions
        .into_iter()
        .zip(balances)
        .map(|(transaction, balance_after)| StatementLine {
            transaction,
            balance_after,
        })
        .collect()
}

#[cfg(test)]
mod projection_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::macros::date;

    use crate::ledger::test_utils::{expense, income};

    use super::{project_balances, project_ledger, sort_ledger};

    #[test]
    fn empty_ledger_has_no_balances() {
        assert!(project_balances(dec!(1000), &[]).is_empty());
    }

    #[test]
    fn adds_income_and_subtracts_expenses() {
        let ledger = [
            income(1, date!(2025 - 01 - 05), dec!(200)),
            expense(2, date!(2025 - 01 - 10), dec!(50)),
            income(3, date!(2025 - 01 - 20), dec!(300)),
        ];

        let got = project_balances(dec!(1000), &ledger);

        assert_eq!(got, vec![dec!(1200), dec!(1150), dec!(1450)]);
    }

    #[test]
    fn does_not_drift_over_long_histories() {
        let ledger: Vec<_> = (0..10_000)
            .map(|i| income(i, date!(2025 - 01 - 01), dec!(0.10)))
            .collect();

        let got = project_balances(Decimal::ZERO, &ledger);

        assert_eq!(got.last(), Some(&dec!(1000.00)));
    }

    #[test]
    fn overdrafts_propagate() {
        let ledger = [expense(1, date!(2025 - 01 - 05), dec!(30))];

        assert_eq!(project_balances(dec!(10), &ledger), vec![dec!(-20)]);
    }

    #[test]
    fn sort_is_stable_for_same_day_transactions() {
        let ledger = vec![
            income(1, date!(2025 - 01 - 20), dec!(1)),
            income(2, date!(2025 - 01 - 10), dec!(10)),
            expense(3, date!(2025 - 01 - 10), dec!(5)),
            income(4, date!(2025 - 01 - 05), dec!(1)),
        ];

        let ids: Vec<_> = sort_ledger(ledger)
            .into_iter()
            .map(|transaction| transaction.id)
            .collect();

        assert_eq!(ids, vec![4, 2, 3, 1]);
    }

    #[test]
    fn ledger_pairs_transactions_with_balances() {
        let ledger = vec![
            income(1, date!(2025 - 01 - 10), dec!(10)),
            expense(2, date!(2025 - 01 - 10), dec!(5)),
        ];

        let got = project_ledger(dec!(0), ledger);

        assert_eq!(got.len(), 2);
        assert_eq!((got[0].transaction.id, got[0].balance_after), (1, dec!(10)));
        assert_eq!((got[1].transaction.id, got[1].balance_after), (2, dec!(5)));
    }
}

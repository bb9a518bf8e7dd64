//! Anchors windowed balances to the account's authoritative current balance.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{
    projection::StatementLine,
    window::{StatementWindow, filter_window},
};

/// A disagreement between the balance projected from the ledger and the
/// balance the store reports for the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceDrift {
    /// The final balance from replaying every transaction on the initial
    /// balance.
    pub projected: Decimal,
    /// The current balance reported by the store.
    pub authoritative: Decimal,
    /// `authoritative - projected`.
    pub difference: Decimal,
}

/// Compare the end of the forward projection against the store's balance.
///
/// Returns `None` when they agree.
pub fn detect_drift(projected: Decimal, authoritative: Decimal) -> Option<BalanceDrift> {
    let difference = authoritative - projected;

    (!difference.is_zero()).then_some(BalanceDrift {
        projected,
        authoritative,
        difference,
    })
}

/// Re-derive the balances of the lines of `ledger` inside `window`, newest
/// first, by walking backwards from `current_balance`.
///
/// `ledger` is the full, ascending ledger of the account. The newest line in
/// the window is anchored to `current_balance` less the effect of every later
/// transaction, so that it shows its true balance even when the window closes
/// before today. Each older line then undoes the effect of the line above it.
pub fn reconcile_window(
    ledger: &[StatementLine],
    window: &StatementWindow,
    current_balance: Decimal,
) -> Vec<StatementLine> {
    let filtered = filter_window(ledger, window);
    let Some(newest) = filtered.last() else {
        return Vec::new();
    };

    // The window is a contiguous date range over a sorted ledger, so the only
    // lines after `newest` are the ones dated after it.
    let later_effect: Decimal = ledger
        .iter()
        .filter(|line| line.transaction.date > newest.transaction.date)
        .map(|line| line.transaction.signed_amount())
        .sum();

    let mut balance = current_balance - later_effect;

    filtered
        .into_iter()
        .rev()
        .map(|line| {
            let balance_after = balance;
            balance -= line.transaction.signed_amount();

            StatementLine {
                transaction: line.transaction.clone(),
                balance_after,
            }
        })
        .collect()
}

#[cfg(test)]
mod detect_drift_tests {
    use rust_decimal_macros::dec;

    use super::{BalanceDrift, detect_drift};

    #[test]
    fn none_when_balances_agree() {
        assert_eq!(detect_drift(dec!(1450.00), dec!(1450)), None);
    }

    #[test]
    fn reports_difference() {
        assert_eq!(
            detect_drift(dec!(1450), dec!(1400)),
            Some(BalanceDrift {
                projected: dec!(1450),
                authoritative: dec!(1400),
                difference: dec!(-50),
            })
        );
    }
}

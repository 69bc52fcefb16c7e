//! Balance arithmetic for wallets.
//!
//! Every change to `Wallet::amount`, `Wallet::total_income` and
//! `Wallet::total_expenses` goes through the functions in this module. They
//! are pure: they take a wallet snapshot and return the would-be snapshot,
//! leaving persistence to the caller.
//!
//! | operation   | income                      | expense                      |
//! |-------------|-----------------------------|------------------------------|
//! | `apply_new` | amount + a, income + a      | amount - a, expenses + a     |
//! | `revert`    | amount - a, income - a      | amount + a, expenses - a     |
//! | `delete`    | as `revert`, must stay >= 0 | as `revert`                  |

use crate::{EngineError, Money, ResultEngine, TransactionKind, Wallet};

fn ensure_positive(amount: Money) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::Validation("amount must be > 0".to_string()));
    }
    Ok(())
}

fn add(a: Money, b: Money) -> ResultEngine<Money> {
    a.checked_add(b)
        .ok_or_else(|| EngineError::Validation("amount too large".to_string()))
}

fn sub(a: Money, b: Money) -> ResultEngine<Money> {
    a.checked_sub(b)
        .ok_or_else(|| EngineError::Validation("amount too large".to_string()))
}

/// Books a new transaction on `wallet`.
///
/// An expense larger than the current balance is rejected with
/// [`EngineError::InsufficientBalance`].
pub fn apply_new(wallet: &Wallet, amount: Money, kind: TransactionKind) -> ResultEngine<Wallet> {
    ensure_positive(amount)?;
    let mut next = wallet.clone();
    match kind {
        TransactionKind::Income => {
            next.amount = add(wallet.amount, amount)?;
            next.total_income = add(wallet.total_income, amount)?;
        }
        TransactionKind::Expense => {
            next.amount = sub(wallet.amount, amount)?;
            next.total_expenses = add(wallet.total_expenses, amount)?;
            if next.amount.is_negative() {
                return Err(EngineError::InsufficientBalance(format!(
                    "wallet '{}' holds {}, cannot spend {}",
                    wallet.name, wallet.amount, amount
                )));
            }
        }
    }
    Ok(next)
}

/// Removes the effect of a previously applied transaction.
///
/// This is bookkeeping only: the result may be negative (an income that was
/// already spent). Callers that commit the result must check it with
/// [`ensure_non_negative`].
pub fn revert(wallet: &Wallet, amount: Money, kind: TransactionKind) -> ResultEngine<Wallet> {
    ensure_positive(amount)?;
    let mut next = wallet.clone();
    match kind {
        TransactionKind::Income => {
            next.amount = sub(wallet.amount, amount)?;
            next.total_income = sub(wallet.total_income, amount)?;
        }
        TransactionKind::Expense => {
            next.amount = add(wallet.amount, amount)?;
            next.total_expenses = sub(wallet.total_expenses, amount)?;
        }
    }
    Ok(next)
}

/// Reverts a transaction that is being deleted.
///
/// Deleting an income whose money has been spent in the meantime would push
/// the wallet below zero; that is rejected, never forced.
pub fn delete(wallet: &Wallet, amount: Money, kind: TransactionKind) -> ResultEngine<Wallet> {
    let next = revert(wallet, amount, kind)?;
    if next.amount.is_negative() {
        return Err(EngineError::InsufficientBalance(format!(
            "deleting this {kind} would leave wallet '{}' at {}",
            wallet.name, next.amount
        )));
    }
    Ok(next)
}

/// Fails with [`EngineError::InsufficientBalance`] if `wallet` is below zero.
pub fn ensure_non_negative(wallet: &Wallet) -> ResultEngine<()> {
    if wallet.amount.is_negative() {
        return Err(EngineError::InsufficientBalance(format!(
            "wallet '{}' would end at {}",
            wallet.name, wallet.amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn wallet(amount: i64) -> Wallet {
        Wallet::new(
            "alice".to_string(),
            "Cash".to_string(),
            Money::new(amount),
            Utc.timestamp_opt(0, 0).unwrap(),
        )
    }

    #[test]
    fn income_increases_amount_and_income_total() {
        let next = apply_new(&wallet(100_00), Money::new(50_00), TransactionKind::Income).unwrap();
        assert_eq!(next.amount, Money::new(150_00));
        assert_eq!(next.total_income, Money::new(50_00));
        assert_eq!(next.total_expenses, Money::ZERO);
    }

    #[test]
    fn expense_decreases_amount_and_grows_expense_total() {
        let next = apply_new(&wallet(100_00), Money::new(30_00), TransactionKind::Expense).unwrap();
        assert_eq!(next.amount, Money::new(70_00));
        assert_eq!(next.total_expenses, Money::new(30_00));
    }

    #[test]
    fn expense_may_empty_the_wallet_but_not_overdraw_it() {
        let w = wallet(10_00);
        let emptied = apply_new(&w, Money::new(10_00), TransactionKind::Expense).unwrap();
        assert_eq!(emptied.amount, Money::ZERO);

        let err = apply_new(&w, Money::new(50_00), TransactionKind::Expense).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientBalance(_)));
    }

    #[test]
    fn rejects_non_positive_amounts() {
        let w = wallet(10_00);
        for amount in [Money::ZERO, Money::new(-1)] {
            assert!(matches!(
                apply_new(&w, amount, TransactionKind::Income),
                Err(EngineError::Validation(_))
            ));
            assert!(matches!(
                revert(&w, amount, TransactionKind::Income),
                Err(EngineError::Validation(_))
            ));
        }
    }

    #[test]
    fn revert_is_exact_inverse_of_apply() {
        let mut start = wallet(12_34);
        start.total_income = Money::new(99_99);
        start.total_expenses = Money::new(87_65);

        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            for cents in [1, 99, 12_34, 7_77_77] {
                let amount = Money::new(cents);
                let Ok(applied) = apply_new(&start, amount, kind) else {
                    continue;
                };
                assert_eq!(revert(&applied, amount, kind).unwrap(), start);
            }
        }
    }

    #[test]
    fn revert_of_spent_income_goes_negative_without_failing() {
        let mut w = wallet(0);
        w = apply_new(&w, Money::new(50_00), TransactionKind::Income).unwrap();
        w = apply_new(&w, Money::new(40_00), TransactionKind::Expense).unwrap();

        let reverted = revert(&w, Money::new(50_00), TransactionKind::Income).unwrap();
        assert_eq!(reverted.amount, Money::new(-40_00));
        assert!(ensure_non_negative(&reverted).is_err());
    }

    #[test]
    fn delete_rejects_spent_income() {
        let mut w = wallet(0);
        w = apply_new(&w, Money::new(50_00), TransactionKind::Income).unwrap();
        w = apply_new(&w, Money::new(40_00), TransactionKind::Expense).unwrap();

        let err = delete(&w, Money::new(50_00), TransactionKind::Income).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientBalance(_)));

        let restored = delete(&w, Money::new(40_00), TransactionKind::Expense).unwrap();
        assert_eq!(restored.amount, Money::new(50_00));
        assert_eq!(restored.total_expenses, Money::ZERO);
    }
}

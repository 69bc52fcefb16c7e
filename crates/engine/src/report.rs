//! Data behind the transaction/balance report.
//!
//! Rendering (PDF, HTML, CSV) is left to the caller; this module computes the
//! rows: for each transaction the wallet balance right before and right after
//! it, obtained by walking back from the wallets' current amounts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, EngineError, Money, ResultEngine, Transaction, TransactionKind, Wallet};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub transaction: Transaction,
    pub wallet_name: String,
    pub category_label: String,
    pub before: Money,
    pub after: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub wallet_id: Uuid,
    pub name: String,
    pub income: Money,
    pub expense: Money,
    /// Balance before the oldest reported transaction.
    pub initial: Money,
    /// Balance after the newest reported transaction.
    pub closing: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Newest first.
    pub rows: Vec<ReportRow>,
    pub total_income: Money,
    pub total_expense: Money,
    pub wallets: Vec<WalletSummary>,
}

fn overflow() -> EngineError {
    EngineError::Validation("amount too large".to_string())
}

/// Builds the report for transactions dated before `until`.
///
/// `transactions` must hold every transaction of the wallets from the start
/// of the reported period up to now, including those after `until`: they are
/// needed to walk balances back from the current amounts, but are not
/// reported. Transactions of unknown wallets are skipped.
pub fn build(
    wallets: &[Wallet],
    transactions: &[Transaction],
    categories: &[Category],
    until: Option<DateTime<Utc>>,
) -> ResultEngine<Report> {
    let names: HashMap<Uuid, &str> = wallets.iter().map(|w| (w.id, w.name.as_str())).collect();
    let labels: HashMap<Uuid, &str> = categories
        .iter()
        .map(|c| (c.id, c.label.as_str()))
        .collect();
    let mut balances: HashMap<Uuid, Money> = wallets.iter().map(|w| (w.id, w.amount)).collect();

    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let mut rows = Vec::new();
    let mut closing: Option<HashMap<Uuid, Money>> = None;
    let mut totals: HashMap<Uuid, (Money, Money)> = HashMap::new();
    let mut total_income = Money::ZERO;
    let mut total_expense = Money::ZERO;

    for tx in sorted {
        let Some(after) = balances.get(&tx.wallet_id).copied() else {
            tracing::debug!("report skips transaction {} of unknown wallet", tx.id);
            continue;
        };
        let before = match tx.kind {
            TransactionKind::Income => after.checked_sub(tx.amount),
            TransactionKind::Expense => after.checked_add(tx.amount),
        }
        .ok_or_else(overflow)?;
        let reported = until.is_none_or(|until| tx.date < until);
        if reported && closing.is_none() {
            closing = Some(balances.clone());
        }
        balances.insert(tx.wallet_id, before);
        if !reported {
            continue;
        }

        let (income, expense) = totals.entry(tx.wallet_id).or_default();
        match tx.kind {
            TransactionKind::Income => {
                *income = income.checked_add(tx.amount).ok_or_else(overflow)?;
                total_income = total_income.checked_add(tx.amount).ok_or_else(overflow)?;
            }
            TransactionKind::Expense => {
                *expense = expense.checked_add(tx.amount).ok_or_else(overflow)?;
                total_expense = total_expense.checked_add(tx.amount).ok_or_else(overflow)?;
            }
        }

        rows.push(ReportRow {
            transaction: tx.clone(),
            wallet_name: names.get(&tx.wallet_id).copied().unwrap_or_default().to_string(),
            category_label: tx
                .category_id
                .and_then(|id| labels.get(&id).copied())
                .unwrap_or_default()
                .to_string(),
            before,
            after,
        });
    }

    let closing = closing.unwrap_or_else(|| balances.clone());
    let wallets = wallets
        .iter()
        .map(|w| {
            let (income, expense) = totals.get(&w.id).copied().unwrap_or_default();
            WalletSummary {
                wallet_id: w.id,
                name: w.name.clone(),
                income,
                expense,
                initial: balances.get(&w.id).copied().unwrap_or(w.amount),
                closing: closing.get(&w.id).copied().unwrap_or(w.amount),
            }
        })
        .collect();

    Ok(Report {
        rows,
        total_income,
        total_expense,
        wallets,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn wallet(name: &str, amount: i64) -> Wallet {
        Wallet::new(
            "alice".to_string(),
            name.to_string(),
            Money::new(amount),
            Utc.timestamp_opt(0, 0).unwrap(),
        )
    }

    fn tx(wallet: &Wallet, kind: TransactionKind, cents: i64, day: u32) -> Transaction {
        Transaction::new(
            "alice".to_string(),
            kind,
            Money::new(cents),
            wallet.id,
            Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn walks_balances_back_from_current_amount() {
        // Opened with 100, then +50 on the 1st and -30 on the 2nd.
        let cash = wallet("Cash", 120_00);
        let food = Category {
            id: Uuid::new_v4(),
            label: "Dining".to_string(),
            icon: "ForkKnife".to_string(),
            bg_color: "#be185d".to_string(),
            kind: TransactionKind::Expense,
            owner_id: None,
        };
        let mut lunch = tx(&cash, TransactionKind::Expense, 30_00, 2);
        lunch.category_id = Some(food.id);
        let txs = vec![tx(&cash, TransactionKind::Income, 50_00, 1), lunch];

        let report = build(&[cash.clone()], &txs, &[food], None).unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].category_label, "Dining");
        assert_eq!(report.rows[0].before, Money::new(150_00));
        assert_eq!(report.rows[0].after, Money::new(120_00));
        assert_eq!(report.rows[1].before, Money::new(100_00));
        assert_eq!(report.rows[1].after, Money::new(150_00));
        assert_eq!(report.total_income, Money::new(50_00));
        assert_eq!(report.total_expense, Money::new(30_00));

        let summary = &report.wallets[0];
        assert_eq!(summary.initial, Money::new(100_00));
        assert_eq!(summary.closing, Money::new(120_00));
        assert_eq!(summary.name, "Cash");
    }

    #[test]
    fn later_transactions_shape_balances_but_are_not_reported() {
        let cash = wallet("Cash", 90_00);
        let txs = vec![
            tx(&cash, TransactionKind::Income, 40_00, 1),
            tx(&cash, TransactionKind::Expense, 10_00, 20),
        ];
        let until = Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap();

        let report = build(&[cash], &txs, &[], Some(until)).unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].after, Money::new(100_00));
        assert_eq!(report.rows[0].before, Money::new(60_00));
        assert_eq!(report.total_expense, Money::ZERO);
        assert_eq!(report.wallets[0].closing, Money::new(100_00));
        assert_eq!(report.wallets[0].initial, Money::new(60_00));
    }

    #[test]
    fn keeps_wallets_apart() {
        let cash = wallet("Cash", 10_00);
        let bank = wallet("Bank", 500_00);
        let txs = vec![
            tx(&bank, TransactionKind::Income, 200_00, 1),
            tx(&cash, TransactionKind::Expense, 5_00, 2),
        ];

        let report = build(&[cash, bank], &txs, &[], None).unwrap();

        assert_eq!(report.rows[0].wallet_name, "Cash");
        assert_eq!(report.rows[0].before, Money::new(15_00));
        assert_eq!(report.rows[1].wallet_name, "Bank");
        assert_eq!(report.rows[1].before, Money::new(300_00));
        assert_eq!(report.wallets[1].expense, Money::ZERO);
        assert_eq!(report.wallets[1].income, Money::new(200_00));
    }
}

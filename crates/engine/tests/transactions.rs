use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    CategoryCmd, DatabaseStore, Engine, EngineError, Granularity, Money, TransactionCmd,
    TransactionKind, TransactionQuery, TransactionStore, Wallet, WalletCmd, WalletStore,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseStore) {
    let db: DatabaseConnection = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let store = DatabaseStore::new(db);
    let engine = Engine::builder()
        .store(Arc::new(store.clone()))
        .build()
        .unwrap();
    (engine, store)
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, d, 12, 0, 0).unwrap()
}

async fn new_wallet(engine: &Engine, name: &str, cents: i64) -> Wallet {
    engine
        .create_or_update_wallet(WalletCmd::create("alice", name, Money::new(cents)))
        .await
        .unwrap()
}

#[tokio::test]
async fn wallet_round_trips_through_sqlite() {
    let (engine, store) = engine_with_db().await;
    let cash = new_wallet(&engine, "Cash", 12_34).await;

    let stored = store.wallet(cash.id).await.unwrap().unwrap();
    assert_eq!(stored, cash);
    assert_eq!(stored.version, 1);
    assert_eq!(engine.wallets("alice").await.unwrap(), vec![cash]);
    assert!(engine.wallets("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn reconciliation_on_the_same_wallet() {
    let (engine, store) = engine_with_db().await;
    let a = new_wallet(&engine, "A", 100_00).await;

    let tx = engine
        .create_transaction(TransactionCmd::income("alice", a.id, Money::new(50_00), day(1)))
        .await
        .unwrap();
    assert_eq!(
        store.wallet(a.id).await.unwrap().unwrap().amount,
        Money::new(150_00)
    );

    engine
        .update_transaction(
            tx.id,
            TransactionCmd::expense("alice", a.id, Money::new(30_00), day(1)).description("rent"),
        )
        .await
        .unwrap();

    let wallet = store.wallet(a.id).await.unwrap().unwrap();
    assert_eq!(wallet.amount, Money::new(70_00));
    assert_eq!(wallet.total_income, Money::ZERO);
    assert_eq!(wallet.total_expenses, Money::new(30_00));
    let stored = store.transaction(tx.id).await.unwrap().unwrap();
    assert_eq!(stored.kind, TransactionKind::Expense);
    assert_eq!(stored.description.as_deref(), Some("rent"));
}

#[tokio::test]
async fn rejected_move_rolls_back_both_wallets() {
    let (engine, store) = engine_with_db().await;
    let a = new_wallet(&engine, "A", 100_00).await;
    let b = new_wallet(&engine, "B", 20_00).await;

    let tx = engine
        .create_transaction(TransactionCmd::expense("alice", a.id, Money::new(40_00), day(2)))
        .await
        .unwrap();
    let err = engine
        .update_transaction(
            tx.id,
            TransactionCmd::expense("alice", b.id, Money::new(40_00), day(2)),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InsufficientBalance(_)));
    assert_eq!(
        store.wallet(a.id).await.unwrap().unwrap().amount,
        Money::new(60_00)
    );
    assert_eq!(
        store.wallet(b.id).await.unwrap().unwrap().amount,
        Money::new(20_00)
    );
}

#[tokio::test]
async fn overspending_leaves_nothing_behind() {
    let (engine, store) = engine_with_db().await;
    let a = new_wallet(&engine, "A", 10_00).await;

    let err = engine
        .create_transaction(TransactionCmd::expense("alice", a.id, Money::new(50_00), day(3)))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::InsufficientBalance(_)));
    assert_eq!(
        store.wallet(a.id).await.unwrap().unwrap().amount,
        Money::new(10_00)
    );
    let listed = store
        .query_transactions(&TransactionQuery::owner("alice"))
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn stale_version_is_rejected_by_the_database() {
    let (engine, store) = engine_with_db().await;
    let a = new_wallet(&engine, "A", 10_00).await;

    // Someone else writes the wallet after we read it.
    store.upsert_wallet(&a).await.unwrap();

    let mut batch = engine::WriteBatch::new();
    batch.put_wallet(a.clone());
    let err = engine::LedgerStore::commit(&store, batch).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    // The engine itself reads again and succeeds.
    engine
        .create_transaction(TransactionCmd::income("alice", a.id, Money::new(1_00), day(4)))
        .await
        .unwrap();
    assert_eq!(
        store.wallet(a.id).await.unwrap().unwrap().amount,
        Money::new(11_00)
    );
}

#[tokio::test]
async fn delete_wallet_cascades_and_repeats_cleanly() {
    let (engine, store) = engine_with_db().await;
    let cash = new_wallet(&engine, "Cash", 0).await;
    let bank = new_wallet(&engine, "Bank", 0).await;
    for d in 1..=3 {
        engine
            .create_transaction(TransactionCmd::income("alice", cash.id, Money::new(5_00), day(d)))
            .await
            .unwrap();
    }
    engine
        .create_transaction(TransactionCmd::income("alice", bank.id, Money::new(5_00), day(1)))
        .await
        .unwrap();

    assert_eq!(engine.delete_wallet(cash.id, "alice").await.unwrap(), 3);
    assert_eq!(engine.delete_wallet(cash.id, "alice").await.unwrap(), 0);
    assert!(store.wallet(cash.id).await.unwrap().is_none());
    let left = store
        .query_transactions(&TransactionQuery::owner("alice"))
        .await
        .unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].wallet_id, bank.id);
}

#[tokio::test]
async fn query_filters_by_kind_and_range() {
    let (engine, _store) = engine_with_db().await;
    let cash = new_wallet(&engine, "Cash", 100_00).await;
    engine
        .create_transaction(TransactionCmd::income("alice", cash.id, Money::new(1_00), day(1)))
        .await
        .unwrap();
    engine
        .create_transaction(TransactionCmd::expense("alice", cash.id, Money::new(2_00), day(2)))
        .await
        .unwrap();
    engine
        .create_transaction(TransactionCmd::expense("alice", cash.id, Money::new(3_00), day(3)))
        .await
        .unwrap();

    let expenses = engine
        .transactions(&TransactionQuery::owner("alice").kind(TransactionKind::Expense))
        .await
        .unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(expenses[0].amount, Money::new(3_00));

    let second = engine
        .transactions(&TransactionQuery::owner("alice").range(Some(day(2)), Some(day(3))))
        .await
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].amount, Money::new(2_00));
}

#[tokio::test]
async fn seeded_categories_are_global_and_guarded() {
    let (engine, _store) = engine_with_db().await;
    let categories = engine.categories("alice", false).await.unwrap();
    let groceries = categories
        .iter()
        .find(|c| c.label == "Groceries")
        .unwrap()
        .clone();
    assert!(groceries.is_global());
    assert!(engine.categories("alice", true).await.unwrap().is_empty());

    let cash = new_wallet(&engine, "Cash", 10_00).await;
    engine
        .create_transaction(
            TransactionCmd::expense("alice", cash.id, Money::new(1_00), day(1)).category(groceries.id),
        )
        .await
        .unwrap();
    let err = engine.delete_category(groceries.id, None).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    let mut flip = CategoryCmd::new(
        None,
        "Groceries",
        "ShoppingCart",
        "#4B5563",
        TransactionKind::Income,
    )
    .id(groceries.id);
    let err = engine
        .create_or_update_category(flip.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    flip.kind = TransactionKind::Expense;
    flip.bg_color = "#111827".to_string();
    let updated = engine.create_or_update_category(flip).await.unwrap();
    assert_eq!(updated.bg_color, "#111827");
}

#[tokio::test]
async fn monthly_stats_from_sqlite() {
    let (engine, _store) = engine_with_db().await;
    let cash = new_wallet(&engine, "Cash", 100_00).await;
    engine
        .create_transaction(TransactionCmd::expense(
            "alice",
            cash.id,
            Money::new(25_00),
            Utc.with_ymd_and_hms(2026, 9, 30, 23, 0, 0).unwrap(),
        ))
        .await
        .unwrap();

    let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
    let stats = engine
        .fetch_stats_at("alice", Granularity::Month, chrono_tz::Asia::Tokyo, now)
        .await
        .unwrap();

    assert_eq!(stats.buckets.len(), 12);
    // 23:00 UTC on Sep 30 is October 1st in Tokyo.
    assert_eq!(stats.buckets[11].label, "Oct 26");
    assert_eq!(stats.buckets[11].expense, Money::new(25_00));
    assert!(stats.buckets[10].expense.is_zero());
}

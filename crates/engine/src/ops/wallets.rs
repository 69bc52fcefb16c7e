use chrono::Utc;
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, SortOrder, TransactionQuery, Wallet, WalletCmd, WriteBatch,
    util::normalize_required_name,
};

use super::{Engine, WALLET_IMAGES, require_owner, retry_on_conflict};

impl Engine {
    /// Return a wallet snapshot.
    pub async fn wallet(&self, wallet_id: Uuid, owner_id: &str) -> ResultEngine<Wallet> {
        self.owned_wallet(wallet_id, owner_id).await
    }

    /// Wallets of `owner_id`, oldest first.
    pub async fn wallets(&self, owner_id: &str) -> ResultEngine<Vec<Wallet>> {
        require_owner(owner_id)?;
        self.store.wallets_for_owner(owner_id).await
    }

    /// Creates a wallet (`cmd.id == None`) or renames / re-images one.
    ///
    /// The opening `amount` is only read on creation and must not be
    /// negative. Balances of an existing wallet are never touched here.
    pub async fn create_or_update_wallet(&self, cmd: WalletCmd) -> ResultEngine<Wallet> {
        require_owner(&cmd.owner_id)?;
        let name = normalize_required_name(&cmd.name, "wallet name")?;
        if cmd.id.is_none() && cmd.amount.is_negative() {
            return Err(EngineError::Validation(
                "opening amount must be >= 0".to_string(),
            ));
        }
        let image = self.resolve_image(cmd.image.as_ref(), WALLET_IMAGES).await?;

        let wallet_id = match cmd.id {
            None => {
                let mut wallet = Wallet::new(cmd.owner_id.clone(), name, cmd.amount, Utc::now());
                wallet.image = image;
                let mut batch = WriteBatch::new();
                batch.put_wallet(wallet.clone());
                self.store.commit(batch).await?;
                tracing::info!("wallet {} created with {}", wallet.id, wallet.amount);
                wallet.id
            }
            Some(id) => {
                retry_on_conflict!(
                    self,
                    "update wallet",
                    self.try_update_wallet(id, &cmd.owner_id, &name, image.as_deref())
                        .await
                )?;
                tracing::info!("wallet {id} updated");
                id
            }
        };

        self.owned_wallet(wallet_id, &cmd.owner_id).await
    }

    async fn try_update_wallet(
        &self,
        id: Uuid,
        owner_id: &str,
        name: &str,
        image: Option<&str>,
    ) -> ResultEngine<()> {
        let mut wallet = self.owned_wallet(id, owner_id).await?;
        wallet.name = name.to_string();
        if let Some(image) = image {
            wallet.image = Some(image.to_string());
        }

        let mut batch = WriteBatch::new();
        batch.put_wallet(wallet);
        self.store.commit(batch).await
    }

    /// Deletes a wallet together with its transactions.
    ///
    /// Returns the number of transactions removed. The wallet record goes
    /// first; if the cascade fails halfway, calling this again finishes it.
    pub async fn delete_wallet(&self, wallet_id: Uuid, owner_id: &str) -> ResultEngine<usize> {
        require_owner(owner_id)?;
        match self.store.wallet(wallet_id).await? {
            Some(wallet) if wallet.owner_id != owner_id => {
                return Err(EngineError::NotFound(format!("wallet {wallet_id}")));
            }
            Some(_) => {
                let mut batch = WriteBatch::new();
                batch.delete_wallet(wallet_id);
                self.store.commit(batch).await?;
                tracing::info!("wallet {wallet_id} deleted");
            }
            None => tracing::debug!("wallet {wallet_id} already gone, purging leftovers"),
        }

        self.purge_wallet_transactions(wallet_id, owner_id).await
    }

    /// Deletes every transaction of `owner_id` booked on `wallet_id`, one
    /// batch of `cascade_batch_size` at a time. No wallet balance is touched.
    pub async fn purge_wallet_transactions(
        &self,
        wallet_id: Uuid,
        owner_id: &str,
    ) -> ResultEngine<usize> {
        require_owner(owner_id)?;
        let query = TransactionQuery::owner(owner_id)
            .wallet(wallet_id)
            .order(SortOrder::OldestFirst)
            .limit(self.options.cascade_batch_size.max(1));

        let mut removed = 0;
        loop {
            let page = self.store.query_transactions(&query).await?;
            if page.is_empty() {
                break;
            }
            let mut batch = WriteBatch::new();
            for tx in &page {
                batch.delete_transaction(tx.id);
            }
            self.store.commit(batch).await?;
            removed += page.len();
            tracing::debug!("wallet {wallet_id}: {removed} transactions purged so far");
        }

        if removed > 0 {
            tracing::info!("wallet {wallet_id}: {removed} transactions purged");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::{date, engine, wallet};
    use crate::{
        EngineOptions, ImageSource, MemoryStore, Money, TransactionCmd, TransactionStore,
        WalletStore,
    };

    use super::*;

    #[tokio::test]
    async fn create_starts_with_zero_totals() {
        let engine = engine(Arc::new(MemoryStore::new()));
        let created = engine
            .create_or_update_wallet(
                WalletCmd::create("alice", "  Savings ", Money::new(250_00))
                    .image(ImageSource::Url("https://img.test/piggy.png".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(created.name, "Savings");
        assert_eq!(created.amount, Money::new(250_00));
        assert_eq!(created.total_income, Money::ZERO);
        assert_eq!(created.total_expenses, Money::ZERO);
        assert_eq!(created.image.as_deref(), Some("https://img.test/piggy.png"));
        assert_eq!(engine.wallets("alice").await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn create_rejects_bad_input() {
        let engine = engine(Arc::new(MemoryStore::new()));

        let negative = engine
            .create_or_update_wallet(WalletCmd::create("alice", "Debt", Money::new(-1)))
            .await
            .unwrap_err();
        assert!(matches!(negative, EngineError::Validation(_)));

        let unnamed = engine
            .create_or_update_wallet(WalletCmd::create("alice", "   ", Money::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(unnamed, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn update_only_renames() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let cash = wallet(&engine, "alice", "Cash", 100_00).await;
        engine
            .create_transaction(TransactionCmd::expense("alice", cash.id, Money::new(30_00), date(1)))
            .await
            .unwrap();

        let mut cmd = WalletCmd::update(cash.id, "alice", "Pocket");
        cmd.amount = Money::new(1_000_00);
        let renamed = engine.create_or_update_wallet(cmd).await.unwrap();

        assert_eq!(renamed.name, "Pocket");
        assert_eq!(renamed.amount, Money::new(70_00));
        assert_eq!(renamed.total_expenses, Money::new(30_00));
    }

    #[tokio::test]
    async fn update_of_foreign_wallet_is_not_found() {
        let engine = engine(Arc::new(MemoryStore::new()));
        let cash = wallet(&engine, "alice", "Cash", 1_00).await;

        let err = engine
            .create_or_update_wallet(WalletCmd::update(cash.id, "bob", "Mine"))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_cascades_in_batches_and_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let engine = Engine::builder()
            .store(store.clone())
            .options(EngineOptions {
                cascade_batch_size: 2,
                ..Default::default()
            })
            .build()
            .unwrap();
        let cash = wallet(&engine, "alice", "Cash", 0).await;
        let bank = wallet(&engine, "alice", "Bank", 0).await;
        for day in 1..=5 {
            engine
                .create_transaction(TransactionCmd::income("alice", cash.id, Money::new(1_00), date(day)))
                .await
                .unwrap();
        }
        let kept = engine
            .create_transaction(TransactionCmd::income("alice", bank.id, Money::new(1_00), date(1)))
            .await
            .unwrap();

        assert_eq!(engine.delete_wallet(cash.id, "alice").await.unwrap(), 5);
        assert!(store.wallet(cash.id).await.unwrap().is_none());
        let left = store
            .query_transactions(&TransactionQuery::owner("alice"))
            .await
            .unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, kept.id);

        assert_eq!(engine.delete_wallet(cash.id, "alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_finishes_a_partial_cascade() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let cash = wallet(&engine, "alice", "Cash", 0).await;
        engine
            .create_transaction(TransactionCmd::income("alice", cash.id, Money::new(1_00), date(1)))
            .await
            .unwrap();
        // Wallet record gone, transactions left behind.
        store.delete_wallet(cash.id).await.unwrap();

        assert_eq!(engine.delete_wallet(cash.id, "alice").await.unwrap(), 1);
        assert!(
            store
                .query_transactions(&TransactionQuery::owner("alice"))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn delete_of_foreign_wallet_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine(store.clone());
        let cash = wallet(&engine, "alice", "Cash", 0).await;

        let err = engine.delete_wallet(cash.id, "bob").await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
        assert!(store.wallet(cash.id).await.unwrap().is_some());
    }
}

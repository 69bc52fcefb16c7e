use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{Category, EngineError, ResultEngine, Transaction, Wallet};

use super::{
    CategoryStore, LedgerStore, SortOrder, TransactionQuery, TransactionStore, WalletStore, Write,
    WriteBatch,
};

#[derive(Clone, Debug, Default)]
struct State {
    wallets: HashMap<Uuid, Wallet>,
    transactions: HashMap<Uuid, Transaction>,
    categories: HashMap<Uuid, Category>,
}

impl State {
    fn put_wallet_checked(&mut self, mut wallet: Wallet) -> ResultEngine<()> {
        let stored = self.wallets.get(&wallet.id).map_or(0, |w| w.version);
        if stored != wallet.version {
            return Err(EngineError::Conflict(format!(
                "wallet {} is at version {stored}, write was based on {}",
                wallet.id, wallet.version
            )));
        }
        wallet.version += 1;
        self.wallets.insert(wallet.id, wallet);
        Ok(())
    }

    fn apply(&mut self, write: Write) -> ResultEngine<()> {
        match write {
            Write::PutWallet(wallet) => self.put_wallet_checked(wallet)?,
            Write::DeleteWallet(id) => {
                self.wallets.remove(&id);
            }
            Write::PutTransaction(tx) => {
                self.transactions.insert(tx.id, tx);
            }
            Write::DeleteTransaction(id) => {
                self.transactions.remove(&id);
            }
        }
        Ok(())
    }
}

/// In-process store keeping every record in memory.
///
/// A batch is applied to a copy of the state which replaces the current one
/// only when every write succeeded.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletStore for MemoryStore {
    async fn wallet(&self, id: Uuid) -> ResultEngine<Option<Wallet>> {
        Ok(self.state.lock().await.wallets.get(&id).cloned())
    }

    async fn upsert_wallet(&self, wallet: &Wallet) -> ResultEngine<Uuid> {
        let mut state = self.state.lock().await;
        let mut stored = wallet.clone();
        stored.version = state.wallets.get(&wallet.id).map_or(0, |w| w.version) + 1;
        state.wallets.insert(stored.id, stored);
        Ok(wallet.id)
    }

    async fn delete_wallet(&self, id: Uuid) -> ResultEngine<()> {
        self.state.lock().await.wallets.remove(&id);
        Ok(())
    }

    async fn wallets_for_owner(&self, owner_id: &str) -> ResultEngine<Vec<Wallet>> {
        let state = self.state.lock().await;
        let mut wallets: Vec<Wallet> = state
            .wallets
            .values()
            .filter(|w| w.owner_id == owner_id)
            .cloned()
            .collect();
        wallets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(wallets)
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn transaction(&self, id: Uuid) -> ResultEngine<Option<Transaction>> {
        Ok(self.state.lock().await.transactions.get(&id).cloned())
    }

    async fn upsert_transaction(&self, tx: &Transaction) -> ResultEngine<Uuid> {
        self.state
            .lock()
            .await
            .transactions
            .insert(tx.id, tx.clone());
        Ok(tx.id)
    }

    async fn delete_transaction(&self, id: Uuid) -> ResultEngine<()> {
        self.state.lock().await.transactions.remove(&id);
        Ok(())
    }

    async fn query_transactions(&self, query: &TransactionQuery) -> ResultEngine<Vec<Transaction>> {
        let state = self.state.lock().await;
        let mut items: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|tx| query.matches(tx))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        if query.order == SortOrder::NewestFirst {
            items.reverse();
        }
        if let Some(limit) = query.limit {
            items.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }
        Ok(items)
    }

    async fn category_in_use(&self, category_id: Uuid) -> ResultEngine<bool> {
        let state = self.state.lock().await;
        Ok(state
            .transactions
            .values()
            .any(|tx| tx.category_id == Some(category_id)))
    }
}

#[async_trait]
impl CategoryStore for MemoryStore {
    async fn category(&self, id: Uuid) -> ResultEngine<Option<Category>> {
        Ok(self.state.lock().await.categories.get(&id).cloned())
    }

    async fn upsert_category(&self, category: &Category) -> ResultEngine<Uuid> {
        self.state
            .lock()
            .await
            .categories
            .insert(category.id, category.clone());
        Ok(category.id)
    }

    async fn delete_category(&self, id: Uuid) -> ResultEngine<()> {
        self.state.lock().await.categories.remove(&id);
        Ok(())
    }

    async fn categories_for_owner(&self, owner_id: Option<&str>) -> ResultEngine<Vec<Category>> {
        let state = self.state.lock().await;
        let mut categories: Vec<Category> = state
            .categories
            .values()
            .filter(|c| c.owner_id.as_deref() == owner_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(categories)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn commit(&self, batch: WriteBatch) -> ResultEngine<()> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        for write in batch {
            next.apply(write)?;
        }
        *state = next;
        Ok(())
    }
}

//! Persistence seams of the engine.
//!
//! The engine owns no data. Wallets, transactions and categories live behind
//! the traits in this module; two implementations ship with the crate:
//!
//! - [`MemoryStore`]: everything in a mutex-guarded map, for embedding and tests.
//! - [`DatabaseStore`]: sea-orm over SQLite.
//!
//! Single-record methods (`upsert_*`, `delete_*`) write unconditionally. The
//! engine itself only mutates through [`LedgerStore::commit`], which applies a
//! [`WriteBatch`] atomically and checks wallet versions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{Category, ResultEngine, Transaction, TransactionKind, Wallet};

mod database;
mod memory;

pub use database::DatabaseStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn wallet(&self, id: Uuid) -> ResultEngine<Option<Wallet>>;

    async fn upsert_wallet(&self, wallet: &Wallet) -> ResultEngine<Uuid>;

    /// Deleting a missing wallet is a no-op.
    async fn delete_wallet(&self, id: Uuid) -> ResultEngine<()>;

    /// Wallets of `owner_id`, oldest first.
    async fn wallets_for_owner(&self, owner_id: &str) -> ResultEngine<Vec<Wallet>>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn transaction(&self, id: Uuid) -> ResultEngine<Option<Transaction>>;

    async fn upsert_transaction(&self, tx: &Transaction) -> ResultEngine<Uuid>;

    /// Deleting a missing transaction is a no-op.
    async fn delete_transaction(&self, id: Uuid) -> ResultEngine<()>;

    async fn query_transactions(&self, query: &TransactionQuery) -> ResultEngine<Vec<Transaction>>;

    /// `true` if any transaction, of any owner, references `category_id`.
    async fn category_in_use(&self, category_id: Uuid) -> ResultEngine<bool>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn category(&self, id: Uuid) -> ResultEngine<Option<Category>>;

    async fn upsert_category(&self, category: &Category) -> ResultEngine<Uuid>;

    async fn delete_category(&self, id: Uuid) -> ResultEngine<()>;

    /// `Some(owner)` returns that owner's categories, `None` the global ones.
    async fn categories_for_owner(&self, owner_id: Option<&str>) -> ResultEngine<Vec<Category>>;
}

#[async_trait]
pub trait LedgerStore: WalletStore + TransactionStore {
    /// Applies every write of `batch` or none of them.
    ///
    /// A [`Write::PutWallet`] whose `version` differs from the stored one (or
    /// is `0` while the wallet already exists) aborts the batch with
    /// [`EngineError::Conflict`](crate::EngineError::Conflict).
    async fn commit(&self, batch: WriteBatch) -> ResultEngine<()>;
}

/// Everything the engine needs from a backend.
pub trait Store: LedgerStore + CategoryStore {}

impl<T: LedgerStore + CategoryStore> Store for T {}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionQuery {
    pub owner_id: String,
    pub wallet_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub order: SortOrder,
    pub limit: Option<u64>,
}

impl TransactionQuery {
    #[must_use]
    pub fn owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn wallet(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn range(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    #[must_use]
    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// In-process evaluation of the filters (ordering and limit excluded).
    pub fn matches(&self, tx: &Transaction) -> bool {
        tx.owner_id == self.owner_id
            && self.wallet_id.is_none_or(|id| tx.wallet_id == id)
            && self.category_id.is_none_or(|id| tx.category_id == Some(id))
            && self.kind.is_none_or(|kind| tx.kind == kind)
            && self.from.is_none_or(|from| tx.date >= from)
            && self.to.is_none_or(|to| tx.date < to)
    }
}

/// A single record write inside a [`WriteBatch`].
#[derive(Clone, Debug, PartialEq)]
pub enum Write {
    PutWallet(Wallet),
    DeleteWallet(Uuid),
    PutTransaction(Transaction),
    DeleteTransaction(Uuid),
}

/// Ordered list of writes committed as one unit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_wallet(&mut self, wallet: Wallet) -> &mut Self {
        self.writes.push(Write::PutWallet(wallet));
        self
    }

    pub fn delete_wallet(&mut self, id: Uuid) -> &mut Self {
        self.writes.push(Write::DeleteWallet(id));
        self
    }

    pub fn put_transaction(&mut self, tx: Transaction) -> &mut Self {
        self.writes.push(Write::PutTransaction(tx));
        self
    }

    pub fn delete_transaction(&mut self, id: Uuid) -> &mut Self {
        self.writes.push(Write::DeleteTransaction(id));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn writes(&self) -> &[Write] {
        &self.writes
    }
}

impl IntoIterator for WriteBatch {
    type Item = Write;
    type IntoIter = std::vec::IntoIter<Write>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

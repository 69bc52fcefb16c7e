use std::{fmt, sync::Arc};

use serde::Deserialize;
use uuid::Uuid;

use crate::{
    EngineError, ImageSource, ImageUploader, ResultEngine, Store, Transaction, Wallet,
};

mod categories;
mod statistics;
mod transactions;
mod wallets;

/// Re-run a ledger operation from fresh reads while the store reports a stale
/// wallet version, up to `max_conflict_retries` extra attempts.
macro_rules! retry_on_conflict {
    ($self:expr, $label:expr, $body:expr) => {{
        let mut attempt: u32 = 0;
        loop {
            match $body {
                Err(EngineError::Conflict(reason))
                    if attempt < $self.options.max_conflict_retries =>
                {
                    attempt += 1;
                    tracing::debug!("{}: {reason}, retrying ({attempt})", $label);
                }
                result => break result,
            }
        }
    }};
}

pub(crate) use retry_on_conflict;

const TRANSACTION_IMAGES: &str = "transactions";
const WALLET_IMAGES: &str = "wallets";

/// Tunables of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Extra attempts after a wallet version conflict.
    pub max_conflict_retries: u32,
    /// Transactions deleted per commit when a wallet is removed.
    pub cascade_batch_size: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_conflict_retries: 3,
            cascade_batch_size: 100,
        }
    }
}

pub struct Engine {
    store: Arc<dyn Store>,
    uploader: Option<Arc<dyn ImageUploader>>,
    options: EngineOptions,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("uploader", &self.uploader.is_some())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Wallet `wallet_id` if it exists and belongs to `owner_id`.
    async fn owned_wallet(&self, wallet_id: Uuid, owner_id: &str) -> ResultEngine<Wallet> {
        self.store
            .wallet(wallet_id)
            .await?
            .filter(|wallet| wallet.owner_id == owner_id)
            .ok_or_else(|| EngineError::NotFound(format!("wallet {wallet_id}")))
    }

    async fn owned_transaction(&self, id: Uuid, owner_id: &str) -> ResultEngine<Transaction> {
        self.store
            .transaction(id)
            .await?
            .filter(|tx| tx.owner_id == owner_id)
            .ok_or_else(|| EngineError::NotFound(format!("transaction {id}")))
    }

    /// Turns an image attachment into the URL to store.
    async fn resolve_image(
        &self,
        image: Option<&ImageSource>,
        folder: &str,
    ) -> ResultEngine<Option<String>> {
        match image {
            None => Ok(None),
            Some(ImageSource::Url(url)) => Ok(Some(url.clone())),
            Some(ImageSource::File(path)) => {
                let uploader = self.uploader.as_ref().ok_or_else(|| {
                    EngineError::Upload("no image uploader configured".to_string())
                })?;
                let url = uploader.upload(path, folder).await?;
                tracing::debug!("uploaded {} to {url}", path.display());
                Ok(Some(url))
            }
        }
    }
}

fn warn_if_rejected(label: &str, err: &EngineError) {
    if let EngineError::InsufficientBalance(reason) = err {
        tracing::warn!("{label} rejected: {reason}");
    }
}

fn require_owner(owner_id: &str) -> ResultEngine<()> {
    if owner_id.trim().is_empty() {
        return Err(EngineError::Validation("owner must not be empty".to_string()));
    }
    Ok(())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    store: Option<Arc<dyn Store>>,
    uploader: Option<Arc<dyn ImageUploader>>,
    options: EngineOptions,
}

impl EngineBuilder {
    /// Pass the required store
    pub fn store(mut self, store: Arc<dyn Store>) -> EngineBuilder {
        self.store = Some(store);
        self
    }

    /// Pass the uploader used for `ImageSource::File` attachments
    pub fn uploader(mut self, uploader: Arc<dyn ImageUploader>) -> EngineBuilder {
        self.uploader = Some(uploader);
        self
    }

    pub fn options(mut self, options: EngineOptions) -> EngineBuilder {
        self.options = options;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let store = self
            .store
            .ok_or_else(|| EngineError::Validation("engine needs a store".to_string()))?;
        Ok(Engine {
            store,
            uploader: self.uploader,
            options: self.options,
        })
    }
}

//! `success`/`msg` answers for callers that do not handle [`EngineError`].
//!
//! [`Service`] exposes the write operations of the [`Engine`]; every method
//! returns a [`Response`] and never an error.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Category, CategoryCmd, Engine, EngineError, Granularity, Report, ResultEngine, Stats,
    Transaction, TransactionCmd, Wallet, WalletCmd,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Response<T> {
    pub success: bool,
    pub data: Option<T>,
    pub msg: String,
}

impl<T> Response<T> {
    pub fn ok(data: T, msg: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            msg: msg.into(),
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            msg: msg.into(),
        }
    }

    fn from_result(result: ResultEngine<T>, msg: &str) -> Self {
        match result {
            Ok(data) => Self::ok(data, msg),
            Err(err) => Self::from(err),
        }
    }
}

impl<T> From<EngineError> for Response<T> {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Database(db_err) => {
                tracing::error!("database error: {db_err}");
                Self::failure("internal error")
            }
            other => {
                tracing::debug!("request rejected: {other}");
                Self::failure(other.to_string())
            }
        }
    }
}

impl<T> From<ResultEngine<T>> for Response<T> {
    fn from(result: ResultEngine<T>) -> Self {
        Self::from_result(result, "")
    }
}

/// Boundary over an [`Engine`].
#[derive(Debug)]
pub struct Service {
    engine: Engine,
}

impl Service {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub async fn create_transaction(&self, cmd: TransactionCmd) -> Response<Transaction> {
        Response::from_result(
            self.engine.create_transaction(cmd).await,
            "Transaction created",
        )
    }

    pub async fn update_transaction(&self, id: Uuid, cmd: TransactionCmd) -> Response<Transaction> {
        Response::from_result(
            self.engine.update_transaction(id, cmd).await,
            "Transaction updated",
        )
    }

    pub async fn delete_transaction(
        &self,
        id: Uuid,
        wallet_id: Uuid,
        owner_id: &str,
    ) -> Response<()> {
        Response::from_result(
            self.engine.delete_transaction(id, wallet_id, owner_id).await,
            "Transaction deleted",
        )
    }

    pub async fn create_or_update_wallet(&self, cmd: WalletCmd) -> Response<Wallet> {
        let msg = if cmd.id.is_some() {
            "Wallet updated"
        } else {
            "Wallet created"
        };
        Response::from_result(self.engine.create_or_update_wallet(cmd).await, msg)
    }

    /// `data` is the number of transactions removed with the wallet.
    pub async fn delete_wallet(&self, wallet_id: Uuid, owner_id: &str) -> Response<usize> {
        Response::from_result(
            self.engine.delete_wallet(wallet_id, owner_id).await,
            "Wallet deleted",
        )
    }

    pub async fn fetch_stats(
        &self,
        owner_id: &str,
        granularity: Granularity,
        tz: Tz,
    ) -> Response<Stats> {
        Response::from_result(
            self.engine.fetch_stats(owner_id, granularity, tz).await,
            "Stats fetched",
        )
    }

    pub async fn create_or_update_category(&self, cmd: CategoryCmd) -> Response<Category> {
        let msg = if cmd.id.is_some() {
            "Category updated"
        } else {
            "Category created"
        };
        Response::from_result(self.engine.create_or_update_category(cmd).await, msg)
    }

    pub async fn delete_category(&self, id: Uuid, owner_id: Option<&str>) -> Response<()> {
        Response::from_result(
            self.engine.delete_category(id, owner_id).await,
            "Category deleted",
        )
    }

    pub async fn report(
        &self,
        owner_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Response<Report> {
        Response::from_result(
            self.engine.report(owner_id, from, to).await,
            "Report generated",
        )
    }
}

//! Wallet and transaction bookkeeping.
//!
//! The [`Engine`] keeps every wallet's balance and income/expense totals in
//! step with its transactions. Records live behind the [`store`] traits; the
//! balance arithmetic lives in [`ledger`]; [`Service`] wraps the engine for
//! callers that want a `success`/`msg` answer instead of a `Result`.

pub use categories::Category;
pub use commands::{CategoryCmd, TransactionCmd, WalletCmd};
pub use error::EngineError;
pub use money::Money;
pub use ops::{Engine, EngineBuilder, EngineOptions};
pub use report::{Report, ReportRow, WalletSummary};
pub use response::{Response, Service};
pub use statistics::{Granularity, StatBucket, Stats};
pub use store::{
    CategoryStore, DatabaseStore, LedgerStore, MemoryStore, SortOrder, Store, TransactionQuery,
    TransactionStore, WalletStore, Write, WriteBatch,
};
pub use transactions::{Transaction, TransactionKind};
pub use upload::{HttpImageUploader, ImageSource, ImageUploader};
pub use wallets::Wallet;

mod categories;
mod commands;
mod error;
pub mod ledger;
mod money;
mod ops;
pub mod report;
mod response;
pub mod statistics;
pub mod store;
mod transactions;
mod upload;
mod util;
mod wallets;

pub type ResultEngine<T> = Result<T, EngineError>;

//! The module contains the errors the engine can return.
//!
//! The errors are:
//!
//! - [`Validation`] when a command is rejected before touching any store.
//! - [`InsufficientBalance`] when a wallet would end up below zero.
//! - [`NotFound`] when a wallet, transaction or category id does not resolve.
//! - [`Conflict`] when a wallet changed between read and write.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`InsufficientBalance`]: EngineError::InsufficientBalance
//!  [`NotFound`]: EngineError::NotFound
//!  [`Conflict`]: EngineError::Conflict
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid data: {0}")]
    Validation(String),
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Concurrent update: {0}")]
    Conflict(String),
    #[error("Corrupted record: {0}")]
    InvalidData(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::InsufficientBalance(a), Self::InsufficientBalance(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::InvalidData(a), Self::InvalidData(b)) => a == b,
            (Self::Upload(a), Self::Upload(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upload(err.to_string())
    }
}

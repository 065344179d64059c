//! The module contains the error the engine can throw.
//!
//! Errors fall in two groups:
//!
//! - input errors ([`InvalidAmount`], [`TransferMissingDestination`],
//!   [`InvalidTransfer`], [`InvalidField`], [`NotFound`], [`ExistingKey`],
//!   [`HasTransactions`]),
//!   always detected before anything is written;
//! - backend errors ([`Database`], [`Export`], [`Timeout`]); one raised inside
//!   a unit of work rolls it back.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`TransferMissingDestination`]: EngineError::TransferMissingDestination
//!  [`InvalidTransfer`]: EngineError::InvalidTransfer
//!  [`InvalidField`]: EngineError::InvalidField
//!  [`NotFound`]: EngineError::NotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`HasTransactions`]: EngineError::HasTransactions
//!  [`Database`]: EngineError::Database
//!  [`Export`]: EngineError::Export
//!  [`Timeout`]: EngineError::Timeout
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("transfer requires destination_account_id")]
    TransferMissingDestination,
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} already exists")]
    ExistingKey(String),
    #[error("account has transactions, cannot delete")]
    HasTransactions,
    #[error("export failed: {0}")]
    Export(String),
    #[error("operation timed out after {0} ms")]
    Timeout(u64),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Returns `true` for errors caused by the caller's input.
    ///
    /// Everything else is a backend failure the caller may retry.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Export(_) | Self::Timeout(_)
        )
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::TransferMissingDestination, Self::TransferMissingDestination) => true,
            (Self::InvalidTransfer(a), Self::InvalidTransfer(b)) => a == b,
            (Self::InvalidField(a), Self::InvalidField(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::HasTransactions, Self::HasTransactions) => true,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

//! Household ledger engine.
//!
//! Accounts belong to a household and move only through income, expense and
//! transfer transactions. Every write goes through [`Engine`], which runs the
//! record change and the balance deltas it implies as one unit of work.

pub use accounts::{Account, AccountKind};
pub use currency::Currency;
pub use error::EngineError;
pub use household_members::HouseholdRole;
pub use households::Household;
pub use ledger::TransactionInput;
pub use legs::Leg;
pub use money::Amount;
pub use ops::{
    BoxFuture, DEFAULT_OPERATION_TIMEOUT, DEFAULT_PAGE_LIMIT, EXPORT_HEADER, Engine,
    EngineBuilder, ExportRow, MAX_PAGE_LIMIT, NewAccountInput, Page, export_rows,
};
pub use store::{
    AccountPatch, AccountStore, NewAccount, Stores, TransactionDraft, TransactionFilter,
    TransactionStore,
};
pub use transactions::{Transaction, TransactionKind};
pub use users::User;

pub mod accounts;
mod currency;
mod error;
pub mod household_members;
pub mod households;
pub mod ledger;
pub mod legs;
mod money;
mod ops;
pub mod store;
pub mod transactions;
pub mod users;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;

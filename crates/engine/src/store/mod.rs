//! Record stores.
//!
//! Each store borrows a connection: the pool for plain reads, or the active
//! [`DatabaseTransaction`](sea_orm::DatabaseTransaction) inside
//! [`Engine::atomically`](crate::Engine::atomically), so several stores can
//! mutate data as one unit of work.

use sea_orm::ConnectionTrait;

mod accounts;
mod transactions;

pub use accounts::{AccountPatch, AccountStore, NewAccount};
pub use transactions::{TransactionDraft, TransactionFilter, TransactionStore};

/// Both stores bound to the same connection.
pub struct Stores<'c, C> {
    pub accounts: AccountStore<'c, C>,
    pub transactions: TransactionStore<'c, C>,
}

impl<C> Clone for Stores<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Stores<'_, C> {}

impl<'c, C: ConnectionTrait> Stores<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self {
            accounts: AccountStore::new(db),
            transactions: TransactionStore::new(db),
        }
    }
}

use uuid::Uuid;

use crate::{
    ResultEngine, Transaction,
    ledger::{self, TransactionInput},
    store::TransactionFilter,
};

use super::Engine;

/// Page size used when the caller asks for none.
pub const DEFAULT_PAGE_LIMIT: u64 = 50;
/// Largest page served.
pub const MAX_PAGE_LIMIT: u64 = 500;

/// One page of a listing plus the total number of matches.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

fn page_limit(limit: i64) -> u64 {
    match u64::try_from(limit) {
        Ok(0) | Err(_) => DEFAULT_PAGE_LIMIT,
        Ok(limit) => limit.min(MAX_PAGE_LIMIT),
    }
}

impl Engine {
    /// Records an income, expense or transfer and moves the balances it
    /// touches.
    ///
    /// Validation happens before the unit of work starts; nothing is written
    /// when it fails.
    pub async fn create_transaction(
        &self,
        household_id: Uuid,
        user_id: Uuid,
        input: &TransactionInput,
    ) -> ResultEngine<Transaction> {
        let draft = ledger::validate(input)?;
        let tx = self
            .atomically(move |stores| {
                Box::pin(async move {
                    ledger::create_transaction(stores, household_id, user_id, &draft).await
                })
            })
            .await?;
        tracing::info!(
            transaction_id = %tx.id,
            household_id = %household_id,
            kind = tx.kind.as_str(),
            amount = %tx.amount,
            "transaction created"
        );
        Ok(tx)
    }

    /// Replaces every field of a transaction, reversing the stored deltas and
    /// applying the new ones in one unit of work.
    pub async fn update_transaction(
        &self,
        id: Uuid,
        household_id: Uuid,
        input: &TransactionInput,
    ) -> ResultEngine<Transaction> {
        let draft = ledger::validate(input)?;
        let tx = self
            .atomically(move |stores| {
                Box::pin(async move {
                    ledger::update_transaction(stores, id, household_id, &draft).await
                })
            })
            .await?;
        tracing::info!(transaction_id = %id, kind = tx.kind.as_str(), "transaction updated");
        Ok(tx)
    }

    /// Deletes a transaction and undoes its balance deltas.
    pub async fn delete_transaction(&self, id: Uuid, household_id: Uuid) -> ResultEngine<()> {
        let previous = self
            .atomically(move |stores| {
                Box::pin(async move { ledger::delete_transaction(stores, id, household_id).await })
            })
            .await?;
        tracing::info!(
            transaction_id = %id,
            kind = previous.kind.as_str(),
            "transaction deleted"
        );
        Ok(())
    }

    /// Return a transaction of the household.
    pub async fn transaction(&self, id: Uuid, household_id: Uuid) -> ResultEngine<Transaction> {
        self.stores().transactions.get(id, household_id).await
    }

    /// Lists transactions newest first.
    ///
    /// A non-positive `limit` falls back to [`DEFAULT_PAGE_LIMIT`]; larger
    /// ones are capped at [`MAX_PAGE_LIMIT`]. A negative `offset` counts as 0.
    pub async fn list_transactions(
        &self,
        household_id: Uuid,
        filter: &TransactionFilter,
        limit: i64,
        offset: i64,
    ) -> ResultEngine<Page<Transaction>> {
        let limit = page_limit(limit);
        let offset = u64::try_from(offset).unwrap_or(0);
        let stores = self.stores();
        let data = stores
            .transactions
            .list(household_id, filter, limit, offset)
            .await?;
        let total = stores.transactions.count(household_id, filter).await?;
        Ok(Page {
            data,
            total,
            limit,
            offset,
        })
    }
}

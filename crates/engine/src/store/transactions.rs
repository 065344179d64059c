use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Amount, EngineError, ResultEngine, Transaction, TransactionKind,
    transactions::{self, tags_to_json},
};

/// Filters for listing transactions.
///
/// `from` and `to` are both inclusive bounds on `transacted_at`.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub kind: Option<TransactionKind>,
    /// Matches the source or the destination account.
    pub account_id: Option<Uuid>,
}

impl TransactionFilter {
    fn condition(&self, household_id: Uuid) -> Condition {
        let mut cond =
            Condition::all().add(transactions::Column::HouseholdId.eq(household_id.to_string()));
        if let Some(from) = self.from {
            cond = cond.add(transactions::Column::TransactedAt.gte(from));
        }
        if let Some(to) = self.to {
            cond = cond.add(transactions::Column::TransactedAt.lte(to));
        }
        if let Some(kind) = self.kind {
            cond = cond.add(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(account_id) = self.account_id {
            let id = account_id.to_string();
            cond = cond.add(
                Condition::any()
                    .add(transactions::Column::AccountId.eq(id.clone()))
                    .add(transactions::Column::DestinationAccountId.eq(id)),
            );
        }
        cond
    }
}

/// Every mutable field of a transaction, already validated.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Amount,
    pub account_id: Uuid,
    pub destination_account_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub note: Option<String>,
    pub transacted_at: DateTime<Utc>,
}

/// Transaction record capability, scoped by household.
pub struct TransactionStore<'c, C> {
    db: &'c C,
}

impl<C> Clone for TransactionStore<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for TransactionStore<'_, C> {}

impl<'c, C: ConnectionTrait> TransactionStore<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        household_id: Uuid,
        created_by: Uuid,
        draft: &TransactionDraft,
    ) -> ResultEngine<Transaction> {
        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            household_id,
            kind: draft.kind,
            description: draft.description.clone(),
            amount: draft.amount,
            account_id: draft.account_id,
            destination_account_id: draft.destination_account_id,
            tags: draft.tags.clone(),
            note: draft.note.clone(),
            transacted_at: draft.transacted_at,
            created_by,
            created_at: now,
            updated_at: now,
        };
        transactions::ActiveModel::try_from(&tx)?
            .insert(self.db)
            .await?;
        Ok(tx)
    }

    async fn find_model(&self, id: Uuid, household_id: Uuid) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(id.to_string())
            .filter(transactions::Column::HouseholdId.eq(household_id.to_string()))
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::NotFound("transaction".to_string()))
    }

    pub async fn get(&self, id: Uuid, household_id: Uuid) -> ResultEngine<Transaction> {
        Transaction::try_from(self.find_model(id, household_id).await?)
    }

    /// Newest first by `transacted_at`.
    pub async fn list(
        &self,
        household_id: Uuid,
        filter: &TransactionFilter,
        limit: u64,
        offset: u64,
    ) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(filter.condition(household_id))
            .order_by_desc(transactions::Column::TransactedAt)
            .order_by_desc(transactions::Column::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(self.db)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Every matching transaction, newest first (no paging).
    pub async fn list_all(
        &self,
        household_id: Uuid,
        filter: &TransactionFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(filter.condition(household_id))
            .order_by_desc(transactions::Column::TransactedAt)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(self.db)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    pub async fn count(&self, household_id: Uuid, filter: &TransactionFilter) -> ResultEngine<u64> {
        transactions::Entity::find()
            .filter(filter.condition(household_id))
            .count(self.db)
            .await
            .map_err(Into::into)
    }

    /// Replaces every mutable field of a transaction.
    pub async fn update(
        &self,
        id: Uuid,
        household_id: Uuid,
        draft: &TransactionDraft,
    ) -> ResultEngine<Transaction> {
        let model = self.find_model(id, household_id).await?;
        let mut active: transactions::ActiveModel = model.into();
        active.kind = ActiveValue::Set(draft.kind.as_str().to_string());
        active.description = ActiveValue::Set(draft.description.clone());
        active.amount = ActiveValue::Set(draft.amount.to_units()?);
        active.account_id = ActiveValue::Set(draft.account_id.to_string());
        active.destination_account_id =
            ActiveValue::Set(draft.destination_account_id.map(|id| id.to_string()));
        active.tags = ActiveValue::Set(tags_to_json(&draft.tags));
        active.note = ActiveValue::Set(draft.note.clone());
        active.transacted_at = ActiveValue::Set(draft.transacted_at);
        active.updated_at = ActiveValue::Set(Utc::now());
        Transaction::try_from(active.update(self.db).await?)
    }

    /// Deletes a transaction and returns the record as it was, so the
    /// caller can undo its balance effect.
    pub async fn delete(&self, id: Uuid, household_id: Uuid) -> ResultEngine<Transaction> {
        let previous = self.get(id, household_id).await?;
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(id.to_string()))
            .filter(transactions::Column::HouseholdId.eq(household_id.to_string()))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound("transaction".to_string()));
        }
        Ok(previous)
    }
}

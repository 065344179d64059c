use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, SqlErr,
    prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, AccountKind, Amount, Currency, EngineError, ResultEngine, accounts, transactions,
};

/// Fields of a new account. The balance is the opening balance.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub household_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub balance: Amount,
    pub currency: Currency,
    pub created_by: Uuid,
}

/// Partial account update. The balance is deliberately absent.
#[derive(Clone, Debug, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub currency: Option<Currency>,
}

/// Account capability over any connection (a pool for reads, a database
/// transaction inside a unit of work).
pub struct AccountStore<'c, C> {
    db: &'c C,
}

impl<C> Clone for AccountStore<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for AccountStore<'_, C> {}

impl<'c, C: ConnectionTrait> AccountStore<'c, C> {
    pub fn new(db: &'c C) -> Self {
        Self { db }
    }

    /// Inserts an account. The only place a balance is written directly.
    pub async fn create(&self, new: NewAccount) -> ResultEngine<Account> {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            household_id: new.household_id,
            name: new.name,
            kind: new.kind,
            balance: new.balance,
            currency: new.currency,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        let model = accounts::ActiveModel::try_from(&account)?;
        model.insert(self.db).await?;
        Ok(account)
    }

    async fn find_model(&self, id: Uuid, household_id: Uuid) -> ResultEngine<accounts::Model> {
        // A household mismatch is indistinguishable from absence.
        accounts::Entity::find_by_id(id.to_string())
            .filter(accounts::Column::HouseholdId.eq(household_id.to_string()))
            .one(self.db)
            .await?
            .ok_or_else(|| EngineError::NotFound("account".to_string()))
    }

    pub async fn get(&self, id: Uuid, household_id: Uuid) -> ResultEngine<Account> {
        Account::try_from(self.find_model(id, household_id).await?)
    }

    /// Accounts of a household, oldest first.
    pub async fn list(&self, household_id: Uuid) -> ResultEngine<Vec<Account>> {
        accounts::Entity::find()
            .filter(accounts::Column::HouseholdId.eq(household_id.to_string()))
            .order_by_asc(accounts::Column::CreatedAt)
            .order_by_asc(accounts::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    pub async fn update(
        &self,
        id: Uuid,
        household_id: Uuid,
        patch: AccountPatch,
    ) -> ResultEngine<Account> {
        let model = self.find_model(id, household_id).await?;
        let mut active: accounts::ActiveModel = model.into();
        if let Some(name) = patch.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(kind) = patch.kind {
            active.kind = ActiveValue::Set(kind.as_str().to_string());
        }
        if let Some(currency) = patch.currency {
            active.currency = ActiveValue::Set(currency.code().to_string());
        }
        active.updated_at = ActiveValue::Set(Utc::now());
        Account::try_from(active.update(self.db).await?)
    }

    /// Atomically adds `delta` to the stored balance.
    ///
    /// Runs as a single `balance = balance + ?` statement so concurrent
    /// writers never lose each other's updates; later reads on the same
    /// connection observe the new balance.
    pub async fn apply_delta(&self, id: Uuid, delta: Amount) -> ResultEngine<()> {
        let units = delta.to_units()?;
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(units),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(id.to_string()))
            .exec(self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound("account".to_string()));
        }
        Ok(())
    }

    /// Number of transactions using the account as source or destination.
    pub async fn count_transactions_referencing(&self, account_id: Uuid) -> ResultEngine<u64> {
        let id = account_id.to_string();
        transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::AccountId.eq(id.clone()))
                    .add(transactions::Column::DestinationAccountId.eq(id)),
            )
            .count(self.db)
            .await
            .map_err(Into::into)
    }

    /// Deletes an account that no transaction references.
    ///
    /// The foreign keys from `transactions` back the check: a reference
    /// inserted concurrently makes the delete itself fail.
    pub async fn delete(&self, id: Uuid, household_id: Uuid) -> ResultEngine<()> {
        self.find_model(id, household_id).await?;
        if self.count_transactions_referencing(id).await? > 0 {
            return Err(EngineError::HasTransactions);
        }
        let result = accounts::Entity::delete_many()
            .filter(accounts::Column::Id.eq(id.to_string()))
            .filter(accounts::Column::HouseholdId.eq(household_id.to_string()))
            .exec(self.db)
            .await
            .map_err(|err| match err.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => EngineError::HasTransactions,
                _ => EngineError::Database(err),
            })?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound("account".to_string()));
        }
        Ok(())
    }
}

use uuid::Uuid;

use crate::{
    Account, AccountKind, Amount, Currency, ResultEngine,
    store::{AccountPatch, NewAccount},
    util::normalize_required_name,
};

use super::Engine;

/// Raw fields of a new account.
#[derive(Clone, Debug)]
pub struct NewAccountInput {
    pub name: String,
    pub kind: String,
    /// Opening balance as a decimal string; may be zero or negative.
    pub balance: String,
    /// Three-letter code; `UAH` when absent.
    pub currency: Option<String>,
}

impl Engine {
    /// Opens an account in a household.
    pub async fn create_account(
        &self,
        household_id: Uuid,
        user_id: Uuid,
        input: NewAccountInput,
    ) -> ResultEngine<Account> {
        let name = normalize_required_name(&input.name, "account name")?;
        let kind = AccountKind::try_from(input.kind.trim())?;
        let balance: Amount = input.balance.parse()?;
        let currency = match input.currency.as_deref().map(str::trim) {
            None | Some("") => Currency::default(),
            Some(code) => Currency::try_from(code)?,
        };

        let account = self
            .stores()
            .accounts
            .create(NewAccount {
                household_id,
                name,
                kind,
                balance,
                currency,
                created_by: user_id,
            })
            .await?;
        tracing::info!(
            account_id = %account.id,
            household_id = %household_id,
            "account created"
        );
        Ok(account)
    }

    /// Return an account of the household.
    pub async fn account(&self, id: Uuid, household_id: Uuid) -> ResultEngine<Account> {
        self.stores().accounts.get(id, household_id).await
    }

    /// Accounts of the household, oldest first.
    pub async fn list_accounts(&self, household_id: Uuid) -> ResultEngine<Vec<Account>> {
        self.stores().accounts.list(household_id).await
    }

    /// Renames, re-kinds or re-denominates an account. The balance never
    /// changes here.
    pub async fn update_account(
        &self,
        id: Uuid,
        household_id: Uuid,
        name: Option<&str>,
        kind: Option<&str>,
        currency: Option<&str>,
    ) -> ResultEngine<Account> {
        let patch = AccountPatch {
            name: name
                .map(|name| normalize_required_name(name, "account name"))
                .transpose()?,
            kind: kind.map(|k| AccountKind::try_from(k.trim())).transpose()?,
            currency: currency.map(Currency::try_from).transpose()?,
        };
        let account = self
            .stores()
            .accounts
            .update(id, household_id, patch)
            .await?;
        tracing::info!(account_id = %id, "account updated");
        Ok(account)
    }

    /// Deletes an account no transaction refers to.
    ///
    /// The reference check and the delete share one unit of work.
    pub async fn delete_account(&self, id: Uuid, household_id: Uuid) -> ResultEngine<()> {
        let result = self
            .atomically(move |stores| {
                Box::pin(async move { stores.accounts.delete(id, household_id).await })
            })
            .await;
        match &result {
            Ok(()) => tracing::info!(account_id = %id, "account deleted"),
            Err(err) => tracing::warn!(account_id = %id, error = %err, "account not deleted"),
        }
        result
    }
}

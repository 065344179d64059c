//! Ledger mutations.
//!
//! Every function here takes [`Stores`] bound to one connection and leaves
//! committing to the caller, so a whole create/update/delete (record write
//! plus balance deltas) can run inside a single
//! [`Engine::atomically`](crate::Engine::atomically) call.
//!
//! Input is validated by [`validate`] before any store is touched.

use chrono::{DateTime, Utc};
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::{
    Amount, EngineError, ResultEngine, Transaction, TransactionKind,
    legs::{self, Leg},
    store::{Stores, TransactionDraft},
    util::{normalize_optional_text, normalize_required_name, normalize_tags},
};

/// Longest tag accepted, in characters.
pub const MAX_TAG_LEN: usize = 64;

/// Raw transaction fields as received from a caller.
#[derive(Clone, Debug)]
pub struct TransactionInput {
    pub kind: TransactionKind,
    pub description: String,
    /// Decimal string, e.g. `"12.50"`.
    pub amount: String,
    pub account_id: Uuid,
    pub destination_account_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub note: Option<String>,
    pub transacted_at: DateTime<Utc>,
}

/// Checks `input` and turns it into a storable draft.
///
/// - the amount must parse and be strictly positive;
/// - a transfer needs a destination different from its source;
/// - income and expense must not carry a destination.
pub fn validate(input: &TransactionInput) -> ResultEngine<TransactionDraft> {
    let amount: Amount = input.amount.parse()?;
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(
            "amount must be greater than zero".to_string(),
        ));
    }
    let description = normalize_required_name(&input.description, "description")?;

    match (input.kind, input.destination_account_id) {
        (TransactionKind::Transfer, None) => return Err(EngineError::TransferMissingDestination),
        (TransactionKind::Transfer, Some(destination)) if destination == input.account_id => {
            return Err(EngineError::InvalidTransfer(
                "source and destination accounts must differ".to_string(),
            ));
        }
        (TransactionKind::Income | TransactionKind::Expense, Some(_)) => {
            return Err(EngineError::InvalidTransfer(format!(
                "{} must not have a destination account",
                input.kind.as_str()
            )));
        }
        _ => {}
    }

    let tags = normalize_tags(&input.tags);
    if let Some(tag) = tags.iter().find(|tag| tag.chars().count() > MAX_TAG_LEN) {
        return Err(EngineError::InvalidField(format!(
            "tag too long (max {MAX_TAG_LEN} characters): {tag}"
        )));
    }

    Ok(TransactionDraft {
        kind: input.kind,
        description,
        amount,
        account_id: input.account_id,
        destination_account_id: input.destination_account_id,
        tags,
        note: normalize_optional_text(input.note.as_deref()),
        transacted_at: input.transacted_at,
    })
}

async fn ensure_accounts<C: ConnectionTrait>(
    stores: Stores<'_, C>,
    household_id: Uuid,
    draft: &TransactionDraft,
) -> ResultEngine<()> {
    stores.accounts.get(draft.account_id, household_id).await?;
    if let Some(destination) = draft.destination_account_id {
        stores.accounts.get(destination, household_id).await?;
    }
    Ok(())
}

async fn apply_legs<C: ConnectionTrait>(stores: Stores<'_, C>, legs: &[Leg]) -> ResultEngine<()> {
    for leg in legs {
        stores.accounts.apply_delta(leg.account_id, leg.delta).await?;
    }
    Ok(())
}

/// Records a transaction and applies its balance deltas.
pub async fn create_transaction<C: ConnectionTrait>(
    stores: Stores<'_, C>,
    household_id: Uuid,
    user_id: Uuid,
    draft: &TransactionDraft,
) -> ResultEngine<Transaction> {
    ensure_accounts(stores, household_id, draft).await?;
    let tx = stores
        .transactions
        .create(household_id, user_id, draft)
        .await?;
    apply_legs(stores, &legs::legs_of(&tx)?).await?;
    Ok(tx)
}

/// Replaces a transaction.
///
/// The stored record is read first and its own deltas are reversed, so the
/// new kind, amount and accounts may all differ from the old ones.
pub async fn update_transaction<C: ConnectionTrait>(
    stores: Stores<'_, C>,
    id: Uuid,
    household_id: Uuid,
    draft: &TransactionDraft,
) -> ResultEngine<Transaction> {
    let previous = stores.transactions.get(id, household_id).await?;
    apply_legs(stores, &legs::reversal_of(&previous)?).await?;
    ensure_accounts(stores, household_id, draft).await?;
    let tx = stores.transactions.update(id, household_id, draft).await?;
    apply_legs(stores, &legs::legs_of(&tx)?).await?;
    Ok(tx)
}

/// Deletes a transaction and undoes its balance deltas.
pub async fn delete_transaction<C: ConnectionTrait>(
    stores: Stores<'_, C>,
    id: Uuid,
    household_id: Uuid,
) -> ResultEngine<Transaction> {
    let previous = stores.transactions.delete(id, household_id).await?;
    apply_legs(stores, &legs::reversal_of(&previous)?).await?;
    Ok(previous)
}

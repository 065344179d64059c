//! Accounts API endpoints.

use api_types::account::{AccountKind, AccountNew, AccountUpdate, AccountView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{Identity, ServerState},
};

fn kind_view(kind: engine::AccountKind) -> AccountKind {
    match kind {
        engine::AccountKind::Card => AccountKind::Card,
        engine::AccountKind::Deposit => AccountKind::Deposit,
        engine::AccountKind::Cash => AccountKind::Cash,
    }
}

pub(crate) fn account_view(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        household_id: account.household_id,
        name: account.name,
        kind: kind_view(account.kind),
        balance: account.balance.to_fixed(2),
        currency: account.currency.code().to_string(),
        created_by: account.created_by,
        created_at: account.created_at,
        updated_at: account.updated_at,
    }
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountView>), ServerError> {
    if payload.name.trim().is_empty() {
        return Err(ServerError::Generic("name is required".to_string()));
    }
    let account = state
        .engine
        .create_account(
            identity.household_id,
            identity.user_id,
            engine::NewAccountInput {
                name: payload.name,
                kind: payload.kind.as_str().to_string(),
                balance: payload.balance.unwrap_or_else(|| "0".to_string()),
                currency: payload.currency,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(account_view(account))))
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.engine.list_accounts(identity.household_id).await?;
    Ok(Json(accounts.into_iter().map(account_view).collect()))
}

pub async fn get(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(id, identity.household_id).await?;
    Ok(Json(account_view(account)))
}

pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state
        .engine
        .update_account(
            id,
            identity.household_id,
            payload.name.as_deref(),
            payload.kind.map(AccountKind::as_str),
            payload.currency.as_deref(),
        )
        .await?;
    Ok(Json(account_view(account)))
}

pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_account(id, identity.household_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

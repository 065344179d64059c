//! Transactions API endpoints.

use api_types::transaction::{
    TransactionKind, TransactionList, TransactionListQuery, TransactionNew, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    ServerError,
    server::{Identity, ServerState},
};

fn kind_to_engine(kind: TransactionKind) -> engine::TransactionKind {
    match kind {
        TransactionKind::Income => engine::TransactionKind::Income,
        TransactionKind::Expense => engine::TransactionKind::Expense,
        TransactionKind::Transfer => engine::TransactionKind::Transfer,
    }
}

fn kind_view(kind: engine::TransactionKind) -> TransactionKind {
    match kind {
        engine::TransactionKind::Income => TransactionKind::Income,
        engine::TransactionKind::Expense => TransactionKind::Expense,
        engine::TransactionKind::Transfer => TransactionKind::Transfer,
    }
}

fn transaction_view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        household_id: tx.household_id,
        kind: kind_view(tx.kind),
        description: tx.description,
        amount: tx.amount.to_fixed(2),
        account_id: tx.account_id,
        destination_account_id: tx.destination_account_id,
        tags: tx.tags,
        note: tx.note,
        transacted_at: tx.transacted_at,
        created_by: tx.created_by,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

fn to_input(payload: TransactionNew) -> Result<engine::TransactionInput, ServerError> {
    if payload.description.trim().is_empty() {
        return Err(ServerError::Generic("description is required".to_string()));
    }
    if payload.amount.trim().is_empty() {
        return Err(ServerError::Generic("amount is required".to_string()));
    }
    Ok(engine::TransactionInput {
        kind: kind_to_engine(payload.kind),
        description: payload.description,
        amount: payload.amount,
        account_id: payload.account_id,
        destination_account_id: payload.destination_account_id,
        tags: payload.tags,
        note: payload.note,
        transacted_at: payload.transacted_at.with_timezone(&Utc),
    })
}

pub async fn create(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let input = to_input(payload)?;
    let tx = state
        .engine
        .create_transaction(identity.household_id, identity.user_id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction_view(tx))))
}

pub async fn list(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionList>, ServerError> {
    let filter = engine::TransactionFilter {
        from: query.from.map(|from| from.with_timezone(&Utc)),
        to: query.to.map(|to| to.with_timezone(&Utc)),
        kind: query.kind.map(kind_to_engine),
        account_id: query.account_id,
    };
    let page = state
        .engine
        .list_transactions(
            identity.household_id,
            &filter,
            query.limit.unwrap_or(0),
            query.offset.unwrap_or(0),
        )
        .await?;

    Ok(Json(TransactionList {
        data: page.data.into_iter().map(transaction_view).collect(),
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    }))
}

pub async fn get(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id, identity.household_id).await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn update(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<Json<TransactionView>, ServerError> {
    let input = to_input(payload)?;
    let tx = state
        .engine
        .update_transaction(id, identity.household_id, &input)
        .await?;
    Ok(Json(transaction_view(tx)))
}

pub async fn delete(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_transaction(id, identity.household_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

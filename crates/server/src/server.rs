use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use serde_json::{Value, json};
use uuid::Uuid;

use std::sync::Arc;

use crate::{accounts, export, transactions};
use engine::Engine;

static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");
static HOUSEHOLD_ID_HEADER: HeaderName = HeaderName::from_static("x-household-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Caller identity, resolved by [`auth`] and stored in request extensions.
#[derive(Clone, Copy, Debug)]
pub struct Identity {
    pub user_id: Uuid,
    pub household_id: Uuid,
}

fn decode_uuid<'i, I>(values: &mut I) -> Result<Uuid, AxumError>
where
    I: Iterator<Item = &'i HeaderValue>,
{
    let value = values.next().ok_or_else(AxumError::invalid)?;
    let Ok(value) = value.to_str() else {
        return Err(AxumError::invalid());
    };
    Uuid::parse_str(value.trim()).map_err(|_| AxumError::invalid())
}

fn encode_uuid<E: Extend<HeaderValue>>(id: Uuid, values: &mut E) {
    match HeaderValue::from_str(&id.to_string()) {
        Ok(value) => values.extend(std::iter::once(value)),
        Err(_) => tracing::error!("failed to encode id header"),
    }
}

/// `TypedHeader` for the authenticated user.
///
/// The upstream gateway puts the user id in "x-user-id".
#[derive(Debug)]
struct UserIdHeader(Uuid);

impl Header for UserIdHeader {
    fn name() -> &'static HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        decode_uuid(values).map(UserIdHeader)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        encode_uuid(self.0, values);
    }
}

/// `TypedHeader` for the active household ("x-household-id").
#[derive(Debug)]
struct HouseholdIdHeader(Uuid);

impl Header for HouseholdIdHeader {
    fn name() -> &'static HeaderName {
        &HOUSEHOLD_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        decode_uuid(values).map(HouseholdIdHeader)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        encode_uuid(self.0, values);
    }
}

async fn auth(
    TypedHeader(user): TypedHeader<UserIdHeader>,
    TypedHeader(household): TypedHeader<HouseholdIdHeader>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let is_member = state
        .engine
        .is_member(household.0, user.0)
        .await
        .map_err(|err| {
            tracing::error!("membership check failed: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    if !is_member {
        tracing::warn!(user_id = %user.0, household_id = %household.0, "not a household member");
        return Err(StatusCode::FORBIDDEN);
    }

    request.extensions_mut().insert(Identity {
        user_id: user.0,
        household_id: household.0,
    });
    Ok(next.run(request).await)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(state: ServerState) -> Router {
    let api = Router::new()
        .route("/api/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/api/accounts/{id}",
            get(accounts::get)
                .put(accounts::update)
                .delete(accounts::delete),
        )
        .route("/api/transactions", get(transactions::list).post(transactions::create))
        .route(
            "/api/transactions/{id}",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/api/export/csv", get(export::csv))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
}

pub async fn run(engine: Engine, bind: &str, port: u16) {
    let listener = match tokio::net::TcpListener::bind((bind, port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

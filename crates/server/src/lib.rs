use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{Identity, ServerState, router, run, run_with_listener};

mod accounts;
mod export;
mod server;
mod transactions;

pub mod types {
    pub mod account {
        pub use api_types::account::{AccountKind, AccountNew, AccountUpdate, AccountView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionKind, TransactionList, TransactionListQuery, TransactionNew,
            TransactionView,
        };
    }

    pub mod export {
        pub use api_types::export::ExportQuery;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::HasTransactions => StatusCode::CONFLICT,
        EngineError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        EngineError::Database(_) | EngineError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::TransferMissingDestination
        | EngineError::InvalidTransfer(_)
        | EngineError::InvalidField(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Export(detail) => {
            tracing::error!("export error: {detail}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

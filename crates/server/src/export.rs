//! CSV export endpoint.

use api_types::export::ExportQuery;
use axum::{
    Extension,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    ServerError,
    server::{Identity, ServerState},
};

pub async fn csv(
    Extension(identity): Extension<Identity>,
    State(state): State<ServerState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, ServerError> {
    let mut body = Vec::new();
    state
        .engine
        .export_csv(
            identity.household_id,
            query.from.map(|from| from.with_timezone(&Utc)),
            query.to.map(|to| to.with_timezone(&Utc)),
            &mut body,
        )
        .await?;

    let filename = format!("homeledger_export_{}.csv", Utc::now().format("%Y-%m-%d"));
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    ))
}

//! Transactions API endpoint

use api_types::transaction::{RecordKind as ApiKind, TransactionView};
use axum::{Json, extract::State};

use crate::{ServerError, caller::Caller, records::record_view, server::ServerState};

fn map_kind(kind: engine::RecordKind) -> ApiKind {
    match kind {
        engine::RecordKind::Income => ApiKind::Income,
        engine::RecordKind::Expense => ApiKind::Expense,
    }
}

/// Handle requests for the merged income/expense feed, most recent date first
pub async fn list(
    State(state): State<ServerState>,
    caller: Caller,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let entries = state.engine.transactions(caller.owner()).await?;

    let transactions = entries
        .into_iter()
        .map(|entry| TransactionView {
            kind: map_kind(entry.kind),
            record: record_view(entry.record),
        })
        .collect();

    Ok(Json(transactions))
}

//! Summary API endpoint

use api_types::summary::Summary;
use axum::{Json, extract::State};

use crate::{ServerError, caller::Caller, server::ServerState};

/// Handle requests for total income, total expense and balance
pub async fn get_summary(
    State(state): State<ServerState>,
    caller: Caller,
) -> Result<Json<Summary>, ServerError> {
    let summary = state.engine.summary(caller.owner()).await?;

    Ok(Json(Summary {
        total_income: summary.total_income,
        total_expense: summary.total_expense,
        balance: summary.balance,
    }))
}

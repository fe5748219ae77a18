//! Income and expense API endpoints.
//!
//! The same handlers serve `/incomes` and `/expenses`; the router attaches
//! the `RecordKind` of each collection as an extension.

use api_types::{
    record::{Amount, RecordNew, RecordUpdate, RecordView},
    response::MessageResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{RecordKind, UpdateOutcome};

use crate::{ServerError, caller::Caller, server::ServerState};

pub(crate) fn map_amount(amount: Amount) -> engine::Amount {
    match amount {
        Amount::Number(value) => engine::Amount::Number(value),
        Amount::Text(text) => engine::Amount::Text(text),
    }
}

pub(crate) fn record_view(record: engine::Record) -> RecordView {
    RecordView {
        id: record.id,
        source: record.source,
        amount: record.amount,
        date: record.date,
        icon: record.icon,
        user_email: record.user_email,
        created_at: record.created_at,
    }
}

fn label(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Income => "Income",
        RecordKind::Expense => "Expense",
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ServerError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ServerError::Generic(rejection.body_text()))
}

/// Handle requests for listing the records in scope, newest first
pub async fn list(
    Extension(kind): Extension<RecordKind>,
    State(state): State<ServerState>,
    caller: Caller,
) -> Result<Json<Vec<RecordView>>, ServerError> {
    let records = state.engine.list(kind, caller.owner()).await?;

    Ok(Json(records.into_iter().map(record_view).collect()))
}

/// Handle requests for creating a new record
pub async fn create(
    Extension(kind): Extension<RecordKind>,
    State(state): State<ServerState>,
    caller: Caller,
    payload: Result<Json<RecordNew>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordView>), ServerError> {
    let payload = json_body(payload)?;
    let owner = caller.owner_or(payload.user_email.as_deref());

    let record = state
        .engine
        .add(
            kind,
            engine::RecordNew {
                source: payload.source,
                amount: map_amount(payload.amount),
                date: payload.date,
                icon: payload.emoji.or(payload.icon),
            },
            owner,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(record_view(record))))
}

/// Handle requests for a single record
pub async fn get(
    Extension(kind): Extension<RecordKind>,
    State(state): State<ServerState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<RecordView>, ServerError> {
    let record = state.engine.get(kind, &id, caller.owner()).await?;

    Ok(Json(record_view(record)))
}

/// Handle requests for updating a record
pub async fn update(
    Extension(kind): Extension<RecordKind>,
    State(state): State<ServerState>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<RecordUpdate>, JsonRejection>,
) -> Result<Json<MessageResponse>, ServerError> {
    let payload = json_body(payload)?;
    let patch = engine::RecordPatch {
        source: payload.source,
        amount: payload.amount.map(map_amount),
        date: payload.date,
        icon: payload.emoji.or(payload.icon),
    };

    let outcome = state.engine.update(kind, &id, patch, caller.owner()).await?;
    let response = match outcome {
        UpdateOutcome::Modified => MessageResponse {
            modified: Some(true),
            ..MessageResponse::ok(format!("{} updated successfully", label(kind)))
        },
        UpdateOutcome::Unchanged => MessageResponse {
            modified: Some(false),
            ..MessageResponse::ok(format!("{} already up to date", label(kind)))
        },
    };

    Ok(Json(response))
}

/// Handle requests for deleting a record
pub async fn delete(
    Extension(kind): Extension<RecordKind>,
    State(state): State<ServerState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServerError> {
    state.engine.delete(kind, &id, caller.owner()).await?;

    Ok(Json(MessageResponse::ok(format!(
        "{} deleted successfully",
        label(kind)
    ))))
}

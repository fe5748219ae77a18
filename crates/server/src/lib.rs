use api_types::response::MessageResponse;
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use engine::EngineError;

pub use identity::{Identity, IdentityError, IdentityVerifier, JwtVerifier};
pub use server::{ServerState, router, run_with_listener};

mod caller;
mod identity;
mod records;
mod server;
mod summary;
mod transactions;

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Identity(IdentityError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    if err.is_transient() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::MissingParameter(_) | EngineError::InvalidId(_) => StatusCode::BAD_REQUEST,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidDate(_)
        | EngineError::TotalOverflow(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::StoreUnavailable(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::StoreUnavailable(db_err) => {
            tracing::error!("store unavailable: {db_err}");
            "service temporarily unavailable".to_string()
        }
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

fn status_for_identity_error(err: &IdentityError) -> StatusCode {
    match err {
        IdentityError::MissingToken | IdentityError::InvalidToken => StatusCode::UNAUTHORIZED,
        IdentityError::MissingEmail => StatusCode::FORBIDDEN,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Identity(err) => (status_for_identity_error(&err), err.to_string()),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        let mut response = (status, Json(MessageResponse::failed(message))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<IdentityError> for ServerError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

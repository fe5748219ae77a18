use axum::{
    Extension, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use std::{future::Future, sync::Arc};

use crate::{IdentityError, IdentityVerifier, ServerError, records, summary, transactions};
use engine::{Engine, RecordKind};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// When present, every scoped route requires a verified bearer token.
    pub verifier: Option<Arc<dyn IdentityVerifier>>,
}

impl ServerState {
    pub fn new(engine: Engine, verifier: Option<Arc<dyn IdentityVerifier>>) -> Self {
        Self {
            engine: Arc::new(engine),
            verifier,
        }
    }
}

async fn auth(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(verifier) = state.verifier.as_ref() else {
        return Ok(next.run(request).await);
    };

    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(IdentityError::MissingToken.into());
    };
    let identity = verifier.verify(bearer.token())?;
    tracing::debug!(email = %identity.email, "caller verified");

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

async fn root() -> &'static str {
    "Expense tracker server"
}

fn record_routes(path: &str, kind: RecordKind) -> Router<ServerState> {
    Router::new()
        .route(path, get(records::list).post(records::create))
        .route(
            &format!("{path}/{{id}}"),
            get(records::get)
                .put(records::update)
                .delete(records::delete),
        )
        .layer(Extension(kind))
}

/// Build the application router.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(record_routes("/incomes", RecordKind::Income))
        .merge(record_routes("/expenses", RecordKind::Expense))
        .route("/summary", get(summary::get_summary))
        .route("/transactions", get(transactions::list))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/", get(root))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_with_listener<F>(
    state: ServerState,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

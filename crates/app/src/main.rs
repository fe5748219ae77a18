use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use server::{IdentityVerifier, JwtVerifier, ServerState};
use settings::{Auth, Database};
use tokio::signal;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "fintrack={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let http = settings.server;
    let db = parse_database(&http.database).await?;

    let engine = engine::Engine::builder()
        .database(db.clone())
        .multi_tenant(http.multi_tenant)
        .lenient_dates(http.lenient_dates)
        .build()
        .await?;
    engine.ping().await?;
    tracing::info!("Pinged your deployment. Successfully connected to the database");

    let verifier = settings.auth.as_ref().map(build_verifier);
    if http.multi_tenant && verifier.is_none() {
        tracing::warn!("multi-tenant mode without [auth]: owners are taken from the request");
    }

    let bind = http.bind.as_deref().unwrap_or("127.0.0.1");
    let listener = tokio::net::TcpListener::bind((bind, http.port)).await?;

    let served = server::run_with_listener(
        ServerState::new(engine, verifier),
        listener,
        shutdown_signal(),
    )
    .await;

    tracing::info!("closing database connection");
    db.close().await?;
    served?;

    Ok(())
}

async fn parse_database(
    config: &Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

fn build_verifier(auth: &Auth) -> Arc<dyn IdentityVerifier> {
    let mut verifier = JwtVerifier::new(auth.jwt_secret.as_bytes());
    if let Some(issuer) = &auth.issuer {
        verifier = verifier.with_issuer(issuer);
    }
    if let Some(audience) = &auth.audience {
        verifier = verifier.with_audience(audience);
    }
    Arc::new(verifier)
}

/// Resolves on ctrl+c or SIGTERM, whichever comes first.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::debug!("Received ctrl+c signal."),
        _ = terminate => tracing::debug!("Received terminate signal."),
    }
}

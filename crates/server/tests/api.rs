use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header};
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{IdentityVerifier, JwtVerifier, ServerState};

const SECRET: &[u8] = b"integration-secret";

async fn app_with(multi_tenant: bool, verifier: Option<Arc<dyn IdentityVerifier>>) -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db)
        .multi_tenant(multi_tenant)
        .build()
        .await
        .unwrap();
    server::router(ServerState::new(engine, verifier))
}

async fn global_app() -> Router {
    app_with(false, None).await
}

async fn authenticated_app() -> Router {
    app_with(true, Some(Arc::new(JwtVerifier::new(SECRET)))).await
}

fn token_for(email: Option<&str>) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &json!({ "email": email, "exp": 4_102_444_800u64 }),
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

fn income(source: &str, amount: Value, date: &str) -> Value {
    json!({ "source": source, "amount": amount, "date": date })
}

#[tokio::test]
async fn root_describes_the_service() {
    let app = global_app().await;
    let (status, body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Expense tracker server");
}

#[tokio::test]
async fn create_returns_assigned_id_and_timestamp() {
    let app = global_app().await;

    let (status, first) = send(
        &app,
        "POST",
        "/incomes",
        Some(income("Salary", json!("1200.50"), "2024-01-31")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["amount"], 1200.5);
    assert_eq!(first["icon"], engine::DEFAULT_ICON);
    assert!(first["createdAt"].is_string());
    assert!(first.get("userEmail").is_none());

    let (_, second) = send(
        &app,
        "POST",
        "/incomes",
        Some(json!({ "source": "Gift", "amount": 50, "date": "2024-02-01", "emoji": "🎁", "createdAt": "1999-01-01T00:00:00Z" })),
        None,
    )
    .await;
    assert_ne!(first["id"], second["id"]);
    assert_eq!(second["icon"], "🎁");
    assert_ne!(second["createdAt"], "1999-01-01T00:00:00Z");

    let (status, listed) = send(&app, "GET", "/incomes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    // newest first
    assert_eq!(listed[0]["id"], second["id"]);
}

#[tokio::test]
async fn update_then_delete_lifecycle() {
    let app = global_app().await;
    let (_, created) = send(
        &app,
        "POST",
        "/expenses",
        Some(income("Groceries", json!(42), "2024-03-01")),
        None,
    )
    .await;
    let uri = format!("/expenses/{}", created["id"].as_str().unwrap());
    let (_, stored) = send(&app, "GET", &uri, None, None).await;

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({ "amount": "45.5", "emoji": "🛒" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["modified"], true);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "amount": 45.5 })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modified"], false);

    let (_, fetched) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(fetched["amount"], 45.5);
    assert_eq!(fetched["icon"], "🛒");
    assert_eq!(fetched["source"], "Groceries");
    assert_eq!(fetched["createdAt"], stored["createdAt"]);
    assert_eq!(fetched["id"], created["id"]);

    let (status, body) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, "DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "source": "x" })), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_ids_are_client_errors() {
    let app = global_app().await;
    for method in ["GET", "DELETE"] {
        let (status, body) = send(&app, method, "/incomes/not-an-id", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }
    let (status, _) = send(
        &app,
        "PUT",
        "/incomes/not-an-id",
        Some(json!({ "source": "x" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_payloads_are_rejected() {
    let app = global_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/incomes",
        Some(income("Salary", json!("a lot"), "2024-01-01")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "POST",
        "/incomes",
        Some(income("Salary", json!(10), "next tuesday")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, "POST", "/incomes", Some(json!({ "source": 1 })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn summary_and_transactions() {
    let app = global_app().await;

    let (_, summary) = send(&app, "GET", "/summary", None, None).await;
    assert_eq!(
        summary,
        json!({ "totalIncome": 0.0, "totalExpense": 0.0, "balance": 0.0 })
    );

    send(&app, "POST", "/incomes", Some(income("Salary", json!(10), "2024-01-01")), None).await;
    send(&app, "POST", "/incomes", Some(income("Bonus", json!("20"), "2023-12-01")), None).await;
    send(&app, "POST", "/expenses", Some(income("Rent", json!(5), "2024-02-01")), None).await;

    let (status, summary) = send(&app, "GET", "/summary", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        summary,
        json!({ "totalIncome": 30.0, "totalExpense": 5.0, "balance": 25.0 })
    );

    let (status, feed) = send(&app, "GET", "/transactions", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let feed = feed.as_array().unwrap();
    let order: Vec<(&str, &str)> = feed
        .iter()
        .map(|t| (t["type"].as_str().unwrap(), t["source"].as_str().unwrap()))
        .collect();
    assert_eq!(
        order,
        [("expense", "Rent"), ("income", "Salary"), ("income", "Bonus")]
    );
}

#[tokio::test]
async fn overflowing_summary_is_rejected() {
    let app = global_app().await;
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "POST",
            "/incomes",
            Some(income("Windfall", json!(1e308), "2024-01-01")),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/summary", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn multi_tenant_without_verifier_scopes_by_email_query() {
    let app = app_with(true, None).await;

    let (status, body) = send(&app, "GET", "/summary", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, created) = send(
        &app,
        "POST",
        "/incomes",
        Some(json!({ "source": "Salary", "amount": 100, "date": "2024-01-01", "userEmail": "alice@example.com" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["userEmail"], "alice@example.com");

    send(
        &app,
        "POST",
        "/incomes?email=bob%40example.com",
        Some(income("Freelance", json!(40), "2024-01-02")),
        None,
    )
    .await;

    let (_, alice) = send(&app, "GET", "/incomes?email=alice%40example.com", None, None).await;
    let alice = alice.as_array().unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0]["source"], "Salary");

    let (_, summary) = send(&app, "GET", "/summary?email=bob%40example.com", None, None).await;
    assert_eq!(summary["totalIncome"], 40.0);
}

#[tokio::test]
async fn bearer_token_is_required_and_checked() {
    let app = authenticated_app().await;

    let (status, _) = send(&app, "GET", "/incomes", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/incomes", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let no_email = token_for(None);
    let (status, _) = send(&app, "GET", "/incomes", None, Some(&no_email)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // root stays public
    let (status, _) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn token_identity_overrides_query_and_isolates_owners() {
    let app = authenticated_app().await;
    let alice = token_for(Some("alice@example.com"));
    let bob = token_for(Some("bob@example.com"));

    let (_, alice_income) = send(
        &app,
        "POST",
        "/incomes?email=bob%40example.com",
        Some(json!({ "source": "Salary", "amount": 100, "date": "2024-01-01", "userEmail": "bob@example.com" })),
        Some(&alice),
    )
    .await;
    assert_eq!(alice_income["userEmail"], "alice@example.com");

    send(
        &app,
        "POST",
        "/incomes",
        Some(income("Freelance", json!(40), "2024-01-02")),
        Some(&bob),
    )
    .await;

    let (_, listed) = send(
        &app,
        "GET",
        "/incomes?email=bob%40example.com",
        None,
        Some(&alice),
    )
    .await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["userEmail"], "alice@example.com");

    let uri = format!("/incomes/{}", alice_income["id"].as_str().unwrap());
    let (status, _) = send(&app, "DELETE", &uri, None, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "amount": 1 })), Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, summary) = send(&app, "GET", "/summary", None, Some(&bob)).await;
    assert_eq!(summary["totalIncome"], 40.0);

    let (status, _) = send(&app, "DELETE", &uri, None, Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
}

//! HttpClient against an in-process fake backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use bakery_client::{BakeryApi, ClientError, ConsoleConfig, HttpClient, SharedToken};
use bakery_core::{Credentials, DateRange, Money, ProductDraft};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tokio::net::TcpListener;

// =============================================================================
// Fake Backend
// =============================================================================

#[derive(Default)]
struct Seen {
    auth: Mutex<Vec<Option<String>>>,
    request_ids: Mutex<Vec<String>>,
    requests: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

type Shared = Arc<Seen>;

fn record(seen: &Seen, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.auth.lock().unwrap().push(auth);
    if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        seen.request_ids.lock().unwrap().push(id.to_string());
    }
}

async fn record_request(State(seen): State<Shared>, request: Request, next: Next) -> Response {
    seen.requests
        .lock()
        .unwrap()
        .push(format!("{} {}", request.method(), request.uri()));
    next.run(request).await
}

fn product_json(id: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "category": "Bread",
        "costPrice": 40.5,
        "currentStock": 12
    })
}

fn user_json() -> Value {
    json!({ "_id": "u1", "name": "Asha", "email": "asha@bakery.test" })
}

async fn list_products(State(seen): State<Shared>, headers: HeaderMap) -> Json<Value> {
    record(&seen, &headers);
    Json(json!({ "data": { "products": [product_json("p1", "Pav"), product_json("p2", "Rusk")] } }))
}

async fn create_product(State(seen): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&seen, &headers);
    let name = body["name"].as_str().unwrap_or_default();
    if name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": "name required" }))).into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({ "data": { "product": product_json("p9", name) } })),
    )
        .into_response()
}

async fn delete_product(State(seen): State<Shared>, Path(id): Path<String>) -> Response {
    seen.deleted.lock().unwrap().push(id.clone());
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "No product with that id" }))).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({ "token": "tok-123", "user": user_json() })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" }))).into_response()
    }
}

async fn verify(headers: HeaderMap) -> Response {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer good") => Json(json!({ "user": user_json() })).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid token" }))).into_response(),
    }
}

async fn daily_income(Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let start = q.get("startDate").cloned().unwrap_or_default();
    let end = q.get("endDate").cloned().unwrap_or_default();
    Json(json!({ "data": { "stats": [
        { "date": start, "totalIncome": 100.0, "count": 2 },
        { "date": end, "totalIncome": 50.25 }
    ] } }))
}

async fn broken_bills() -> Json<Value> {
    Json(json!({ "data": { "bills": "not-a-list" } }))
}

async fn today_income() -> Json<Value> {
    Json(json!({ "data": { "income": 1250.5 } }))
}

async fn set_today_income(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "data": { "income": body["income"] } }))
}

async fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, Json(json!({ "message": "Admins only" }))).into_response()
}

async fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn spawn_backend() -> (String, Shared) {
    let seen = Shared::default();
    let api = Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", delete(delete_product))
        .route("/products/inventory/total", get(server_error))
        .route("/products/daily-income", get(daily_income))
        .route("/products/category-wise-value", get(forbidden))
        .route("/auth/login", post(login))
        .route("/auth/verify", get(verify))
        .route("/bills", get(broken_bills))
        .route("/bills/today/income", get(today_income).post(set_today_income))
        .with_state(seen.clone());
    let app = Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(seen.clone(), record_request));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api", addr), seen)
}

async fn client_for(base_url: &str, token: Option<&str>) -> (HttpClient, SharedToken) {
    let mut config = ConsoleConfig::default();
    config.api.base_url = base_url.to_string();
    let slot = SharedToken::new(token.map(str::to_string));
    (HttpClient::new(&config, slot.clone()).unwrap(), slot)
}

fn draft(name: &str) -> ProductDraft {
    ProductDraft {
        name: name.to_string(),
        category: "Bread".to_string(),
        cost_price: Money::from_paise(4050),
        current_stock: 12,
        is_active: true,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_bearer_follows_shared_slot() {
    let (base, seen) = spawn_backend().await;
    let (client, slot) = client_for(&base, None).await;

    let products = client.list_products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].cost_price.paise(), 4050);

    slot.set(Some("tok-abc".into()));
    client.list_products().await.unwrap();

    let auth = seen.auth.lock().unwrap().clone();
    assert_eq!(auth, vec![None, Some("Bearer tok-abc".to_string())]);

    let ids = seen.request_ids.lock().unwrap().clone();
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_create_product_rejection_carries_server_message() {
    let (base, _) = spawn_backend().await;
    let (client, _) = client_for(&base, Some("tok")).await;

    let created = client.create_product(&draft("Brioche")).await.unwrap();
    assert_eq!(created.name, "Brioche");

    let err = client.create_product(&draft("")).await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected { status: 400, .. }));
    assert_eq!(err.server_message(), Some("name required"));
}

#[tokio::test]
async fn test_delete_missing_product_is_not_found() {
    let (base, _) = spawn_backend().await;
    let (client, _) = client_for(&base, Some("tok")).await;

    client.delete_product("p1").await.unwrap();
    let err = client.delete_product("missing").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_ids_stay_inside_their_path_segment() {
    let (base, seen) = spawn_backend().await;
    let (client, _) = client_for(&base, Some("tok")).await;

    client.delete_product("../bills").await.unwrap();
    client.delete_product("p1?force=true").await.unwrap();

    assert_eq!(
        *seen.requests.lock().unwrap(),
        vec![
            "DELETE /api/products/..%2Fbills".to_string(),
            "DELETE /api/products/p1%3Fforce=true".to_string(),
        ]
    );
    assert_eq!(
        *seen.deleted.lock().unwrap(),
        vec!["../bills".to_string(), "p1?force=true".to_string()]
    );
}

#[tokio::test]
async fn test_dot_id_is_refused_before_sending() {
    let (base, seen) = spawn_backend().await;
    let (client, _) = client_for(&base, Some("tok")).await;

    let err = client.delete_product("..").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidId(_)), "{:?}", err);
    assert!(client.get_bill(".").await.is_err());
    assert!(seen.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_and_verify() {
    let (base, _) = spawn_backend().await;
    let (client, _) = client_for(&base, None).await;

    let auth = client
        .login(&Credentials {
            email: "asha@bakery.test".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(auth.token, "tok-123");
    assert_eq!(auth.user.id, "u1");

    let err = client
        .login(&Credentials {
            email: "asha@bakery.test".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.server_message(), Some("Invalid credentials"));

    // verify uses the explicit token, not the (empty) slot
    let user = client.verify_token("good").await.unwrap();
    assert_eq!(user.email, "asha@bakery.test");
    assert!(client.verify_token("bad").await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn test_daily_income_query_string() {
    let (base, _) = spawn_backend().await;
    let (client, _) = client_for(&base, Some("tok")).await;

    let range = DateRange {
        start: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        end: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
    };
    let series = client.daily_income(&range).await.unwrap();
    assert_eq!(series.stats.len(), 2);
    assert_eq!(series.stats[0].date, range.start);
    assert_eq!(series.stats[1].date, range.end);
    assert_eq!(series.total().paise(), 15_025);
}

#[tokio::test]
async fn test_schema_mismatch_is_parse_error() {
    let (base, _) = spawn_backend().await;
    let (client, _) = client_for(&base, Some("tok")).await;

    let err = client.list_bills().await.unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)), "{:?}", err);
}

#[tokio::test]
async fn test_non_json_error_body_has_no_message() {
    let (base, _) = spawn_backend().await;
    let (client, _) = client_for(&base, Some("tok")).await;

    let err = client.inventory_total().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.server_message(), None);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_forbidden_is_a_rejection_not_an_expired_token() {
    let (base, _) = spawn_backend().await;
    let (client, _) = client_for(&base, Some("tok")).await;

    let err = client.category_values().await.unwrap_err();
    assert!(!err.is_unauthorized());
    assert_eq!(err.status(), Some(403));
    assert_eq!(err.server_message(), Some("Admins only"));
}

#[tokio::test]
async fn test_today_income_round_trip() {
    let (base, _) = spawn_backend().await;
    let (client, _) = client_for(&base, Some("tok")).await;

    assert_eq!(client.today_income().await.unwrap().paise(), 125_050);
    let updated = client
        .update_today_income(Money::from_paise(99_900))
        .await
        .unwrap();
    assert_eq!(updated.paise(), 99_900);
}

use std::sync::Arc;

use axum::http::HeaderValue;
use reqwest::StatusCode;
use serde_json::{json, Value};

use tracify_api::app::{build_app, AppServices};
use tracify_infra::seed_if_empty;

const FRONTEND_ORIGIN: &str = "http://localhost:3000";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Same router as prod over a fresh in-memory store, bound to an ephemeral port.
    async fn spawn() -> Self {
        Self::spawn_with(AppServices::in_memory()).await
    }

    /// Like `spawn`, but the store is seeded first, as on a real first start.
    async fn spawn_seeded() -> Self {
        let services = AppServices::in_memory();
        seed_if_empty(services.store().as_ref())
            .await
            .expect("seeding failed");
        Self::spawn_with(services).await
    }

    async fn spawn_with(services: AppServices) -> Self {
        let origins = vec![HeaderValue::from_static(FRONTEND_ORIGIN)];
        let app = build_app(Arc::new(services), &origins);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn widget() -> Value {
    json!({
        "name": "Widget",
        "description": "A small widget",
        "price": 9.99,
        "quantity": 3,
    })
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: &Value) -> Value {
    let res = client
        .post(srv.url("/products/"))
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn assert_not_found(res: reqwest::Response) {
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn seeded_store_lists_the_five_sample_products() {
    let srv = TestServer::spawn_seeded().await;

    let res = reqwest::get(srv.url("/products/")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let products: Vec<Value> = res.json().await.unwrap();
    let summary: Vec<(String, f64, i64)> = products
        .iter()
        .map(|p| {
            (
                p["name"].as_str().unwrap().to_string(),
                p["price"].as_f64().unwrap(),
                p["quantity"].as_i64().unwrap(),
            )
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("Apple iPhone 15 Pro Max".to_string(), 1299.99, 25),
            ("Samsung Galaxy S24 Ultra".to_string(), 1199.99, 30),
            ("Google Pixel 8 Pro".to_string(), 999.99, 20),
            ("OnePlus 12".to_string(), 899.99, 35),
            ("Xiaomi 14 Pro".to_string(), 799.99, 40),
        ]
    );
    assert!(products.iter().all(|p| p["id"].is_i64()));
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, &widget()).await;
    let id = created["id"].as_i64().unwrap();

    let res = client
        .get(srv.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched["name"], "Widget");
    assert_eq!(fetched["description"], "A small widget");
    assert_eq!(fetched["price"], 9.99);
    assert_eq!(fetched["quantity"], 3);
}

#[tokio::test]
async fn collection_route_works_without_trailing_slash() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .json(&widget())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let listed: Vec<Value> = client
        .get(srv.url("/products"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn update_replaces_every_mutable_field() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, &widget()).await;
    let id = created["id"].as_i64().unwrap();

    let replacement = json!({
        "name": "Gadget",
        "description": "",
        "price": 19.5,
        "quantity": 0,
    });
    let res = client
        .put(srv.url(&format!("/products/{id}")))
        .json(&replacement)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["id"], id);

    let fetched: Value = client
        .get(srv.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["name"], "Gadget");
    assert_eq!(fetched["description"], "");
    assert_eq!(fetched["price"], 19.5);
    assert_eq!(fetched["quantity"], 0);
}

#[tokio::test]
async fn delete_then_get_reports_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, &widget()).await;
    let id = created["id"].as_i64().unwrap();

    let res = client
        .delete(srv.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Product deleted successfully");

    let res = client
        .get(srv.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_not_found(res).await;
}

#[tokio::test]
async fn missing_ids_report_not_found_for_every_verb() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let url = srv.url("/products/999");

    assert_not_found(client.get(&url).send().await.unwrap()).await;
    assert_not_found(client.put(&url).json(&widget()).send().await.unwrap()).await;
    assert_not_found(client.delete(&url).send().await.unwrap()).await;
}

#[tokio::test]
async fn list_count_tracks_creates_minus_deletes() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for _ in 0..4 {
        let created = create(&client, &srv, &widget()).await;
        ids.push(created["id"].as_i64().unwrap());
    }
    for id in &ids[..2] {
        let res = client
            .delete(srv.url(&format!("/products/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let listed: Vec<Value> = client
        .get(srv.url("/products/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed_ids: Vec<i64> = listed.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(listed_ids, ids[2..].to_vec());
}

#[tokio::test]
async fn malformed_bodies_are_validation_errors() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cases = [
        json!({ "name": "Widget", "description": "x", "quantity": 1 }),
        json!({ "name": "Widget", "description": "x", "price": "cheap", "quantity": 1 }),
        json!({ "name": "Widget", "description": "x", "price": 1.0, "quantity": 1.5 }),
        json!({ "name": 7, "description": "x", "price": 1.0, "quantity": 1 }),
    ];

    for body in cases {
        let res = client
            .post(srv.url("/products/"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "body: {body}");
        let err: Value = res.json().await.unwrap();
        assert_eq!(err["error"], "validation_error");
    }

    let res = client
        .post(srv.url("/products/"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was stored.
    let listed: Vec<Value> = client
        .get(srv.url("/products/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn negative_and_empty_values_round_trip() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let bodies = [
        json!({ "name": "Refund", "description": "", "price": -5.0, "quantity": 1 }),
        json!({ "name": "Backorder", "description": "x", "price": 1.0, "quantity": -2 }),
        json!({ "name": "", "description": "", "price": 0.0, "quantity": 0 }),
    ];

    for body in bodies {
        let created = create(&client, &srv, &body).await;
        let id = created["id"].as_i64().unwrap();

        let fetched: Value = client
            .get(srv.url(&format!("/products/{id}")))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(fetched, created);
        for field in ["name", "description", "price", "quantity"] {
            assert_eq!(fetched[field], body[field], "field {field} of {body}");
        }
    }
}

#[tokio::test]
async fn invalid_update_leaves_the_record_unchanged() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, &widget()).await;
    let id = created["id"].as_i64().unwrap();

    let res = client
        .put(srv.url(&format!("/products/{id}")))
        .json(&json!({ "name": "Gadget" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let fetched: Value = client
        .get(srv.url(&format!("/products/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn non_numeric_ids_are_bad_requests() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/products/abc")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/products/")).send().await.unwrap();
    assert!(res.headers().contains_key("x-request-id"));

    let res = client
        .get(srv.url("/products/"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");
}

#[tokio::test]
async fn cors_allows_the_frontend_origin_with_credentials() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, srv.url("/products/"))
        .header("origin", FRONTEND_ORIGIN)
        .header("access-control-request-method", "PUT")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let headers = res.headers();
    assert_eq!(headers["access-control-allow-origin"], FRONTEND_ORIGIN);
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert_eq!(headers["access-control-allow-methods"], "PUT");
    assert_eq!(headers["access-control-allow-headers"], "content-type");
}

#[tokio::test]
async fn cors_ignores_unknown_origins() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/products/"))
        .header("origin", "https://evil.example")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(!res.headers().contains_key("access-control-allow-origin"));
}

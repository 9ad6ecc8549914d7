//! Tests for the `POST /api/deisishop/buy` checkout proxy.
//!
//! Run with: cargo test -p deisishop-integration-tests

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use deisishop_integration_tests::{
    CannedResponse, FakeDeisishop, TestContext, sample_catalog, test_config, unreachable_addr,
};
use serde_json::{Value, json};

fn cart_body() -> Value {
    json!({
        "products": [
            { "id": 1, "title": "Caneca DEISI", "price": 10.5, "image": "caneca.png" }
        ]
    })
}

#[tokio::test]
async fn test_buy_relays_order_id() {
    let fake = FakeDeisishop::start(sample_catalog()).await;
    let ctx = TestContext::with_fake(&fake).await;

    let resp = ctx
        .client
        .post(ctx.url("/api/deisishop/buy"))
        .json(&cart_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["orderId"], 42);

    let requests = fake.buy_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["products"][0]["title"], "Caneca DEISI");
}

#[tokio::test]
async fn test_buy_empty_cart_is_rejected_locally() {
    let fake = FakeDeisishop::start(sample_catalog()).await;
    let ctx = TestContext::with_fake(&fake).await;

    let resp = ctx
        .client
        .post(ctx.url("/api/deisishop/buy"))
        .json(&json!({ "products": [] }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "O carrinho está vazio!");
    assert!(fake.buy_requests().is_empty());
}

#[tokio::test]
async fn test_buy_relays_backend_rejection() {
    let fake = FakeDeisishop::start(sample_catalog()).await;
    fake.respond_to_buy(CannedResponse::json(
        StatusCode::BAD_REQUEST,
        &json!({ "error": "stock esgotado" }),
    ));
    let ctx = TestContext::with_fake(&fake).await;

    let resp = ctx
        .client
        .post(ctx.url("/api/deisishop/buy"))
        .json(&cart_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "stock esgotado");
}

#[tokio::test]
async fn test_buy_json_failure_without_message_is_relayed() {
    let fake = FakeDeisishop::start(sample_catalog()).await;
    fake.respond_to_buy(CannedResponse::json(
        StatusCode::INTERNAL_SERVER_ERROR,
        &json!({ "detail": "oops" }),
    ));
    let ctx = TestContext::with_fake(&fake).await;

    let resp = ctx
        .client
        .post(ctx.url("/api/deisishop/buy"))
        .json(&cart_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "oops");
}

#[tokio::test]
async fn test_buy_non_json_failure_is_connection_error() {
    let fake = FakeDeisishop::start(sample_catalog()).await;
    fake.respond_to_buy(CannedResponse {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "<html>down</html>".to_string(),
    });
    let ctx = TestContext::with_fake(&fake).await;

    let resp = ctx
        .client
        .post(ctx.url("/api/deisishop/buy"))
        .json(&cart_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Erro ao conectar com o servidor.");
}

#[tokio::test]
async fn test_buy_backend_unreachable() {
    let dead = unreachable_addr().await;
    let config = test_config(
        &format!("http://{dead}/products"),
        &format!("http://{dead}/buy"),
    );
    let ctx = TestContext::start(config).await;

    let resp = ctx
        .client
        .post(ctx.url("/api/deisishop/buy"))
        .json(&cart_body())
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Erro ao conectar com o servidor.");
}

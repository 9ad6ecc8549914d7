//! End-to-end tests for the fingerprinted static assets linked by the layout.
//!
//! Run with: cargo test -p deisishop-integration-tests

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use deisishop_integration_tests::{FakeDeisishop, TestContext, sample_catalog};
use deisishop_storefront::STATIC_DIR;

/// The quoted `/static/...` link that starts with `prefix`.
fn asset_link<'a>(page: &'a str, prefix: &str) -> &'a str {
    let start = page.find(prefix).unwrap();
    let end = start + page[start..].find('"').unwrap();
    &page[start..end]
}

async fn assert_serves_source(ctx: &TestContext, link: &str, source: &str) {
    let resp = ctx.client.get(ctx.url(link)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "{link}");

    let expected = std::fs::read_to_string(format!("{STATIC_DIR}/{source}")).unwrap();
    assert_eq!(resp.text().await.unwrap(), expected, "{link}");
}

#[tokio::test]
async fn test_layout_links_stylesheet_that_resolves() {
    let fake = FakeDeisishop::start(sample_catalog()).await;
    let ctx = TestContext::with_fake(&fake).await;
    let page = ctx.products_page().await;

    let link = asset_link(&page, "/static/css/");
    assert!(link.ends_with(".css"));
    assert_serves_source(&ctx, link, "css/main.css").await;
}

#[tokio::test]
async fn test_layout_links_script_that_resolves() {
    let fake = FakeDeisishop::start(sample_catalog()).await;
    let ctx = TestContext::with_fake(&fake).await;
    let page = ctx.products_page().await;

    let link = asset_link(&page, "/static/js/");
    assert!(link.ends_with(".js"));
    assert!(
        link == "/static/js/status-message.js"
            || link.starts_with("/static/js/derived/status-message.")
    );
    assert_serves_source(&ctx, link, "js/status-message.js").await;
}

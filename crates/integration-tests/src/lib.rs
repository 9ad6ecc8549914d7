//! Integration test harness for the DeisiShop storefront.
//!
//! Each test runs the real storefront router on an ephemeral port, pointed
//! at an in-process fake of the DeisiShop API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p deisishop-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use deisishop_storefront::config::{DeisishopConfig, StorefrontConfig};
use deisishop_storefront::state::AppState;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Response the fake purchase endpoint answers with.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub body: String,
}

impl CannedResponse {
    /// A JSON body with the given status.
    #[must_use]
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Default)]
struct FakeState {
    products: Mutex<Value>,
    buy_response: Mutex<Option<CannedResponse>>,
    buy_delay: Mutex<Duration>,
    buy_requests: Mutex<Vec<Value>>,
}

/// In-process stand-in for the DeisiShop API.
///
/// `GET /products` serves the configured catalog; `POST /buy` records the
/// request body, waits for the configured delay, and answers with the canned
/// response (default `{"orderId": 42}`).
#[derive(Clone)]
pub struct FakeDeisishop {
    addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeDeisishop {
    /// Start the fake with the given catalog.
    pub async fn start(products: Value) -> Self {
        let state = Arc::new(FakeState {
            products: Mutex::new(products),
            ..FakeState::default()
        });

        let app = Router::new()
            .route("/products", get(fake_products))
            .route("/buy", post(fake_buy))
            .with_state(Arc::clone(&state));

        let addr = serve(app).await;
        Self { addr, state }
    }

    /// Catalog endpoint URL.
    #[must_use]
    pub fn catalog_url(&self) -> String {
        format!("http://{}/products", self.addr)
    }

    /// Purchase endpoint URL.
    #[must_use]
    pub fn checkout_url(&self) -> String {
        format!("http://{}/buy", self.addr)
    }

    /// Answer subsequent purchases with `response`.
    pub fn respond_to_buy(&self, response: CannedResponse) {
        *self.state.buy_response.lock().expect("lock") = Some(response);
    }

    /// Hold every purchase for `delay` before answering.
    pub fn delay_buy(&self, delay: Duration) {
        *self.state.buy_delay.lock().expect("lock") = delay;
    }

    /// Bodies received by the purchase endpoint, oldest first.
    #[must_use]
    pub fn buy_requests(&self) -> Vec<Value> {
        self.state.buy_requests.lock().expect("lock").clone()
    }
}

async fn fake_products(State(state): State<Arc<FakeState>>) -> Json<Value> {
    Json(state.products.lock().expect("lock").clone())
}

async fn fake_buy(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.buy_requests.lock().expect("lock").push(body);

    let delay = *state.buy_delay.lock().expect("lock");
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let canned = state.buy_response.lock().expect("lock").clone();
    match canned {
        Some(CannedResponse { status, body }) => (status, body).into_response(),
        None => Json(json!({ "orderId": 42 })).into_response(),
    }
}

/// Two-product catalog shaped like the public DeisiShop API.
#[must_use]
pub fn sample_catalog() -> Value {
    json!([
        {
            "id": 1,
            "title": "Caneca DEISI",
            "price": 10.5,
            "description": "Caneca de cerâmica",
            "category": "Acessórios",
            "image": "https://deisishop.pythonanywhere.com/static/caneca.png",
            "rating": { "rate": 4.5, "count": 12 }
        },
        {
            "id": 2,
            "title": "T-shirt DEISI",
            "price": 20,
            "description": "T-shirt de algodão",
            "category": "Roupa",
            "image": "https://deisishop.pythonanywhere.com/static/tshirt.png",
            "rating": { "rate": 4.0, "count": 3 }
        }
    ])
}

/// Storefront configuration pointing at the given endpoints, rate limiting off.
#[must_use]
pub fn test_config(catalog_url: &str, checkout_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://localhost".to_string(),
        deisishop: DeisishopConfig {
            catalog_url: catalog_url.parse().expect("catalog url"),
            checkout_url: checkout_url.parse().expect("checkout url"),
        },
        message_ttl: Duration::from_secs(5),
        catalog_cache_ttl: Duration::from_secs(60),
        rate_limit: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A running storefront and the client driving it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a storefront against `config`.
    pub async fn start(config: StorefrontConfig) -> Self {
        let app = deisishop_storefront::build_router(AppState::new(config));
        let addr = serve(app).await;

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("http://{addr}"),
        }
    }

    /// Start a storefront against a fake DeisiShop.
    pub async fn with_fake(fake: &FakeDeisishop) -> Self {
        Self::start(test_config(&fake.catalog_url(), &fake.checkout_url())).await
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Fetch the products page body.
    pub async fn products_page(&self) -> String {
        let resp = self
            .client
            .get(self.url("/produtos"))
            .send()
            .await
            .expect("Failed to get products page");
        assert_eq!(resp.status(), StatusCode::OK);
        resp.text().await.expect("Failed to read products page")
    }

    /// Post a form naming `product_id` to `path`, following the redirect.
    pub async fn post_product(&self, path: &str, product_id: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(&[("product_id", product_id)])
            .send()
            .await
            .expect("Failed to post product form")
    }

    /// Add `product_id` to the cart and return the rendered page.
    pub async fn add_to_cart(&self, product_id: &str) -> String {
        let resp = self.post_product("/produtos/cart/add", product_id).await;
        assert_eq!(resp.status(), StatusCode::OK);
        resp.text().await.expect("Failed to read products page")
    }

    /// Submit the cart and return the rendered page.
    pub async fn checkout(&self) -> String {
        let resp = self
            .client
            .post(self.url("/produtos/checkout"))
            .send()
            .await
            .expect("Failed to post checkout");
        assert_eq!(resp.status(), StatusCode::OK);
        resp.text().await.expect("Failed to read products page")
    }
}

/// Address that refuses connections.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server error");
    });

    addr
}

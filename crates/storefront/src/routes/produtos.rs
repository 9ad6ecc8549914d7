//! Products page route handlers.
//!
//! The page is fully server-rendered. Cart and checkout actions are plain
//! form posts answered with a redirect back to the page; the status message
//! survives the redirect in the session. The cart itself is stored per
//! visitor ID, outside the session record.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, extract::State, response::Redirect};
use chrono::{DateTime, Utc};
use deisishop_core::{Cart, Product, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session_keys;
use crate::services::{CatalogSource, ProductsPage, StatusMessage, VisitorSnapshots};
use crate::state::AppState;

/// Path of the products page.
pub const PRODUCTS_PATH: &str = "/produtos";

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub image: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            price: product.price.display(),
            image: product.image.clone(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<ProductView>,
    pub total: String,
    pub item_count: usize,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(ProductView::from).collect(),
            total: cart.total().display(),
            item_count: cart.len(),
        }
    }
}

/// Status message display data for templates.
#[derive(Clone)]
pub struct MessageView {
    pub text: String,
    /// Milliseconds until the browser should hide the message.
    pub expires_in_ms: Option<i64>,
}

/// Products page template.
#[derive(Template, WebTemplate)]
#[template(path = "produtos/index.html")]
pub struct ProdutosTemplate {
    pub products: Vec<ProductView>,
    pub cart: CartView,
    pub message: Option<MessageView>,
    pub checkout_pending: bool,
}

/// Form body naming one product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: String,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// The visitor's stable ID, minted and stored in the session on first use.
///
/// Keys both the cart snapshot and the checkout guard, so it must not change
/// between requests of the same visitor.
async fn visitor_id(session: &Session) -> Result<String> {
    if let Some(id) = session.get::<String>(session_keys::VISITOR_ID).await? {
        return Ok(id);
    }

    let id = Uuid::new_v4().to_string();
    session.insert(session_keys::VISITOR_ID, &id).await?;
    tracing::debug!(visitor_id = %id, "New visitor");
    Ok(id)
}

/// The cart store belonging to this session's visitor.
async fn visitor_cart(state: &AppState, session: &Session) -> Result<(String, VisitorSnapshots)> {
    let visitor = visitor_id(session).await?;
    let store = state.carts().for_visitor(&visitor).await;
    Ok((visitor, store))
}

/// Read the pending status message.
///
/// Sticky messages are consumed by the read; transient ones stay in the
/// session until they expire.
async fn take_status_message(
    session: &Session,
    now: DateTime<Utc>,
) -> Result<Option<StatusMessage>> {
    let Some(message) = session
        .get::<StatusMessage>(session_keys::STATUS_MESSAGE)
        .await?
    else {
        return Ok(None);
    };

    let visible = message.is_visible_at(now);
    if !visible || !message.is_transient() {
        session
            .remove::<StatusMessage>(session_keys::STATUS_MESSAGE)
            .await?;
    }

    Ok(visible.then_some(message))
}

async fn store_status_message(session: &Session, message: Option<&StatusMessage>) -> Result<()> {
    if let Some(message) = message {
        session
            .insert(session_keys::STATUS_MESSAGE, message)
            .await?;
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the products page.
///
/// Each view is a fresh activation: the catalog is fetched and the cart is
/// restored from the session.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<ProdutosTemplate> {
    let now = Utc::now();
    let message = take_status_message(&session, now).await?;
    let (visitor, store) = visitor_cart(&state, &session).await?;
    let checkout_pending = state.checkout_guard().is_pending(&visitor);

    let mut page = ProductsPage::activate(state.deisishop(), store).await?;
    page.set_message(message);

    Ok(ProdutosTemplate {
        products: page.products().iter().map(ProductView::from).collect(),
        cart: CartView::from(page.cart()),
        message: page.message().map(|message| MessageView {
            text: message.text.clone(),
            expires_in_ms: message.remaining_millis(now),
        }),
        checkout_pending,
    })
}

/// Add a catalog product to the cart.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    let id = ProductId::new(form.product_id);
    let product = state
        .deisishop()
        .find(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let (_, store) = visitor_cart(&state, &session).await?;
    let mut page = ProductsPage::restore(store).await?;
    page.add_to_cart(product).await?;
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));

    Ok(Redirect::to(PRODUCTS_PATH))
}

/// Remove every cart line for a product.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    let id = ProductId::new(form.product_id);

    let (_, store) = visitor_cart(&state, &session).await?;
    let mut page = ProductsPage::restore(store).await?;
    page.remove_from_cart(&id).await?;
    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("product_id", id.as_str())]),
    );

    Ok(Redirect::to(PRODUCTS_PATH))
}

/// Submit the cart as an order.
#[instrument(skip(state, session))]
pub async fn checkout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let (visitor, store) = visitor_cart(&state, &session).await?;

    let mut page = ProductsPage::restore(store).await?;
    let outcome = page
        .checkout(
            state.deisishop(),
            state.checkout_guard(),
            &visitor,
            Utc::now(),
            state.config().message_ttl,
        )
        .await?;
    tracing::info!(?outcome, "Checkout finished");

    store_status_message(&session, page.message()).await?;

    Ok(Redirect::to(PRODUCTS_PATH))
}

//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `storage` - Per-visitor snapshot store (keyed by the session's visitor ID)
//! - `cart` - Cart manager: restore, add, remove, persist
//! - `catalog` - Catalog loading with silent failure
//! - `checkout` - Purchase submission and the in-flight guard
//! - `message` - Status messages and their expiry
//! - `page` - The products page controller tying the above together

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod message;
pub mod page;
pub mod storage;

pub use cart::{CART_KEY, CartManager};
pub use catalog::{CatalogSource, load_catalog};
pub use checkout::{CheckoutGuard, CheckoutOutcome, OrderBackend};
pub use message::StatusMessage;
pub use page::ProductsPage;
pub use storage::{SnapshotCache, SnapshotStore, StorageError, VisitorSnapshots};

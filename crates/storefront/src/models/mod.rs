//! Domain models for the storefront.
//!
//! Catalog and cart types live in `deisishop-core`; this module only holds
//! what is specific to the web layer.

pub mod session;

pub use session::keys as session_keys;

//! Core types for the DeisiShop storefront.
//!
//! This module provides type-safe wrappers for catalog and cart concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod product;

pub use cart::Cart;
pub use id::{OrderId, ProductId};
pub use price::{Price, PriceError};
pub use product::{CartItem, Product};

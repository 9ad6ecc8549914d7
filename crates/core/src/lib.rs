//! DeisiShop Core - Shared types library.
//!
//! This crate provides the domain types used by the storefront:
//! - [`Product`] - a read-only catalog entry
//! - [`Cart`] - the visitor's ordered list of cart lines
//! - [`Price`] - a non-negative euro amount with exact decimal arithmetic
//! - [`ProductId`] / [`OrderId`] - string identifiers tolerant of numeric JSON
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no sessions, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

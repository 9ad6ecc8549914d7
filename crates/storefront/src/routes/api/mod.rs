//! JSON API routes.

pub mod deisishop;

//! Session keys.
//!
//! The session identifies the visitor across requests and carries the
//! pending status message. Cart snapshots are stored per visitor ID outside
//! the session record.

/// Session keys for storefront data.
pub mod keys {
    /// Key for the visitor ID that cart snapshots and the checkout guard use.
    pub const VISITOR_ID: &str = "visitor_id";

    /// Key for the status message shown on the next page view.
    pub const STATUS_MESSAGE: &str = "status_message";
}

pub mod feed;
pub mod image_fetch;
pub mod image_processing;

/// Sent with every upstream request; the feed host rejects anonymous agents.
pub const USER_AGENT: &str = "wallfeed/1.0";

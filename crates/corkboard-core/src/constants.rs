//! Application-wide constants
//!
//! Centralized location for magic strings and configuration values
//! that are used across multiple modules.

/// Collection holding every message document.
pub const MESSAGES_COLLECTION: &str = "messages";

/// Maximum documents a top-level feed subscription returns.
pub const TOP_LEVEL_LIMIT: usize = 1000;

/// Maximum documents a thread feed subscription returns.
pub const THREAD_LIMIT: usize = 100;

/// Shown in place of a display name when the identity has none.
pub const ANONYMOUS_NAME: &str = "anonymous";

/// Default blob server for image uploads.
pub const BLOB_SERVER: &str = "https://blobs.corkboard.chat";

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod live;
pub mod logging;
pub mod models;
pub mod runtime;
pub mod storage;
pub mod store;

// Re-export the types the UI touches on every frame
pub use auth::{Identity, SessionStorage};
pub use error::StoreError;
pub use live::{LiveQuery, QueryState};
pub use models::{Message, NewMessage, Scope};
pub use store::{MessageFeed, MessageStore};

pub mod db;
pub mod messages;
pub mod worker;

pub use db::{DocStore, Document, Snapshot, Subscription};
pub use messages::{MessageFeed, MessageStore};
pub use worker::{StoreCommand, StoreUpdate, StoreWorker};

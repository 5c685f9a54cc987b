pub mod message;
pub mod scope;

pub use message::{Message, NewMessage};
pub use scope::Scope;

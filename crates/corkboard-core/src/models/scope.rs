use crate::constants::{MESSAGES_COLLECTION, THREAD_LIMIT, TOP_LEVEL_LIMIT};

/// Query path selecting either the top-level message feed or one
/// message's reply thread.
///
/// The thread relation is an explicit parent id on the document, so a
/// scope is just a filter over a flat collection. A reply belongs to
/// exactly one parent and is never promoted to the top level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    TopLevel,
    Thread { parent_id: String },
}

impl Scope {
    pub fn thread(parent_id: impl Into<String>) -> Self {
        Self::Thread {
            parent_id: parent_id.into(),
        }
    }

    pub fn parent_id(&self) -> Option<&str> {
        match self {
            Self::TopLevel => None,
            Self::Thread { parent_id } => Some(parent_id),
        }
    }

    /// Subscription cap used when the caller doesn't pick one.
    pub fn default_limit(&self) -> usize {
        match self {
            Self::TopLevel => TOP_LEVEL_LIMIT,
            Self::Thread { .. } => THREAD_LIMIT,
        }
    }

    /// Human-readable query path, for logs and errors.
    pub fn path(&self) -> String {
        match self {
            Self::TopLevel => MESSAGES_COLLECTION.to_string(),
            Self::Thread { parent_id } => {
                format!("{MESSAGES_COLLECTION}/{parent_id}/thread")
            }
        }
    }
}

use std::sync::Arc;

use tokio::sync::mpsc::error::TryRecvError;

use crate::error::StoreError;
use crate::models::{Message, NewMessage, Scope};
use crate::store::db::{DocStore, Snapshot, Subscription};

/// Live, typed view of one scope's messages, newest first.
///
/// Wraps a raw document subscription and converts each snapshot to typed
/// records. Documents that fail conversion are skipped, not surfaced.
pub struct MessageFeed {
    subscription: Subscription,
}

impl MessageFeed {
    /// Next full-replacement message set; `None` once the store shuts down.
    pub async fn recv(&mut self) -> Option<Vec<Message>> {
        self.subscription.recv().await.map(|s| decode(&s))
    }

    /// Non-blocking variant for callers that poll on a tick.
    pub fn try_recv(&mut self) -> Result<Vec<Message>, TryRecvError> {
        self.subscription.try_recv().map(|s| decode(&s))
    }
}

fn decode(snapshot: &Snapshot) -> Vec<Message> {
    snapshot.iter().filter_map(Message::from_document).collect()
}

/// Typed facade over the document store; the only store surface the views
/// use. Converts between wire documents and `Message` records.
#[derive(Clone)]
pub struct MessageStore {
    db: Arc<DocStore>,
}

impl MessageStore {
    pub fn new(db: Arc<DocStore>) -> Self {
        Self { db }
    }

    /// Open the live feed for a scope, capped at the scope's default limit
    /// (1000 top-level, 100 per thread).
    pub fn list(&self, scope: Scope) -> Result<MessageFeed, StoreError> {
        let limit = scope.default_limit();
        self.list_with_limit(scope, limit)
    }

    pub fn list_with_limit(&self, scope: Scope, limit: usize) -> Result<MessageFeed, StoreError> {
        Ok(MessageFeed {
            subscription: self.db.subscribe(scope, limit)?,
        })
    }

    /// Persist a new message into the given scope and return the assigned
    /// id. The caller has already populated `time`; failures are not
    /// retried here.
    pub fn append(&self, scope: &Scope, message: &NewMessage) -> Result<String, StoreError> {
        self.db.append(scope, message.to_fields())
    }
}

use tokio::sync::mpsc::error::TryRecvError;

use crate::error::StoreError;
use crate::models::{Message, Scope};
use crate::store::{MessageFeed, MessageStore};

/// Lifecycle of one live query instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// Subscription registered, no snapshot delivered yet.
    Loading,
    /// At least one snapshot delivered; stays here across later pushes.
    Loaded,
    /// Subscription failed or was interrupted. Terminal: open a fresh
    /// instance to resubscribe.
    Errored,
}

/// Reactive subscription as a view consumes it: `(messages, loading,
/// error)`, re-emitted on every push. The message set is replaced
/// wholesale each time; there is no incremental diffing.
///
/// Dropping the query tears the subscription down, so a view that goes
/// away does not leak a live connection.
pub struct LiveQuery {
    feed: Option<MessageFeed>,
    state: QueryState,
    messages: Vec<Message>,
    error: Option<StoreError>,
}

impl LiveQuery {
    /// Subscribe to a scope at its default limit.
    pub fn open(store: &MessageStore, scope: Scope) -> Self {
        let limit = scope.default_limit();
        Self::open_with_limit(store, scope, limit)
    }

    pub fn open_with_limit(store: &MessageStore, scope: Scope, limit: usize) -> Self {
        match store.list_with_limit(scope, limit) {
            Ok(feed) => Self {
                feed: Some(feed),
                state: QueryState::Loading,
                messages: Vec::new(),
                error: None,
            },
            Err(error) => Self::errored(error),
        }
    }

    fn errored(error: StoreError) -> Self {
        Self {
            feed: None,
            state: QueryState::Errored,
            messages: Vec::new(),
            error: Some(error),
        }
    }

    /// Await the next push. Resolves `true` when the visible state
    /// changed; pends forever once the query is errored.
    pub async fn next(&mut self) -> bool {
        let Some(feed) = self.feed.as_mut() else {
            return std::future::pending().await;
        };
        match feed.recv().await {
            Some(messages) => {
                self.messages = messages;
                self.state = QueryState::Loaded;
                true
            }
            None => {
                self.interrupt();
                true
            }
        }
    }

    /// Drain pending pushes without blocking; for callers that poll on a
    /// tick. Returns `true` when the visible state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Some(feed) = self.feed.as_mut() {
            match feed.try_recv() {
                Ok(messages) => {
                    self.messages = messages;
                    self.state = QueryState::Loaded;
                    changed = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.interrupt();
                    changed = true;
                }
            }
        }
        changed
    }

    fn interrupt(&mut self) {
        self.feed = None;
        self.state = QueryState::Errored;
        self.error = Some(StoreError::Subscription(
            "live query interrupted".to_string(),
        ));
    }

    /// Current message set, newest first, replaced wholesale per push.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == QueryState::Loading
    }

    pub fn error(&self) -> Option<&StoreError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewMessage;
    use crate::store::DocStore;

    fn message_at(time: u64) -> NewMessage {
        NewMessage {
            text: format!("t{time}"),
            author_name: "Ada".to_string(),
            uid: "u1".to_string(),
            time,
        }
    }

    #[test]
    fn test_loading_until_first_poll() {
        let store = MessageStore::new(DocStore::new());
        let mut query = LiveQuery::open(&store, Scope::TopLevel);
        assert!(query.is_loading());
        assert!(query.messages().is_empty());

        assert!(query.poll());
        assert_eq!(query.state(), QueryState::Loaded);
    }

    #[test]
    fn test_pushes_replace_wholesale() {
        let store = MessageStore::new(DocStore::new());
        let mut query = LiveQuery::open(&store, Scope::TopLevel);
        query.poll();

        store.append(&Scope::TopLevel, &message_at(100)).unwrap();
        store.append(&Scope::TopLevel, &message_at(200)).unwrap();
        assert!(query.poll());

        let times: Vec<u64> = query.messages().iter().map(|m| m.time).collect();
        assert_eq!(times, vec![200, 100]);
        assert_eq!(query.state(), QueryState::Loaded);
    }

    #[test]
    fn test_invalid_subscription_is_errored_immediately() {
        let store = MessageStore::new(DocStore::new());
        let query = LiveQuery::open_with_limit(&store, Scope::TopLevel, 0);
        assert_eq!(query.state(), QueryState::Errored);
        assert!(matches!(query.error(), Some(StoreError::Subscription(_))));
    }

    #[test]
    fn test_store_shutdown_is_terminal() {
        let db = DocStore::new();
        let store = MessageStore::new(db.clone());
        let mut query = LiveQuery::open(&store, Scope::TopLevel);
        query.poll();

        db.shutdown();
        assert!(query.poll());
        assert_eq!(query.state(), QueryState::Errored);

        // Terminal: nothing further arrives, state stays errored.
        assert!(!query.poll());
        assert_eq!(query.state(), QueryState::Errored);
    }

    #[test]
    fn test_reopen_creates_fresh_subscription() {
        let db = DocStore::new();
        let store = MessageStore::new(db.clone());
        let parent = store.append(&Scope::TopLevel, &message_at(100)).unwrap();

        let mut first = LiveQuery::open(&store, Scope::thread(parent.clone()));
        store
            .append(&Scope::thread(parent.clone()), &message_at(200))
            .unwrap();
        first.poll();
        assert_eq!(first.messages().len(), 1);
        drop(first);
        assert_eq!(db.subscriber_count(), 0);

        // Re-expanding gives a fresh Loading instance with no stale data.
        let second = LiveQuery::open(&store, Scope::thread(parent));
        assert!(second.is_loading());
        assert!(second.messages().is_empty());
    }

    #[tokio::test]
    async fn test_next_awaits_pushes() {
        let store = MessageStore::new(DocStore::new());
        let mut query = LiveQuery::open(&store, Scope::TopLevel);

        assert!(query.next().await); // initial snapshot
        assert_eq!(query.state(), QueryState::Loaded);

        store.append(&Scope::TopLevel, &message_at(100)).unwrap();
        assert!(query.next().await);
        assert_eq!(query.messages().len(), 1);
    }
}

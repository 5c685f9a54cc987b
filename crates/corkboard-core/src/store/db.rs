use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::Scope;

/// A raw wire document: opaque store-assigned id plus JSON fields.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    /// Append sequence, monotonic per store. Breaks ordering ties between
    /// documents whose `time` field collides.
    pub seq: u64,
    /// Explicit thread relation: id of the parent message, absent for
    /// top-level documents.
    pub parent_id: Option<String>,
    pub fields: Map<String, Value>,
}

impl Document {
    fn time(&self) -> u64 {
        self.fields.get("time").and_then(|v| v.as_u64()).unwrap_or(0)
    }
}

/// Full-replacement result set pushed to subscribers on every change.
pub type Snapshot = Vec<Document>;

struct Subscriber {
    id: u64,
    scope: Scope,
    limit: usize,
    tx: mpsc::UnboundedSender<Snapshot>,
}

#[derive(Default)]
struct Inner {
    docs: Vec<Document>,
    by_id: HashMap<String, usize>,
    /// Index per parent id; `None` keys the top-level feed.
    by_parent: HashMap<Option<String>, Vec<usize>>,
    subscribers: Vec<Subscriber>,
    next_seq: u64,
    next_sub_id: u64,
    closed: bool,
}

impl Inner {
    /// Matching documents ordered by `time` descending, then `seq`
    /// descending, capped at `limit`.
    fn query(&self, scope: &Scope, limit: usize) -> Snapshot {
        let key = scope.parent_id().map(str::to_string);
        let mut docs: Snapshot = self
            .by_parent
            .get(&key)
            .map(|indexes| indexes.iter().map(|&i| self.docs[i].clone()).collect())
            .unwrap_or_default();
        docs.sort_by(|a, b| b.time().cmp(&a.time()).then(b.seq.cmp(&a.seq)));
        docs.truncate(limit);
        docs
    }

    /// Push a fresh snapshot to every subscriber of `scope`. Subscribers
    /// whose receiver is gone are dropped.
    fn notify(&mut self, scope: &Scope) {
        let mut dead: Vec<u64> = Vec::new();
        for i in 0..self.subscribers.len() {
            if self.subscribers[i].scope != *scope {
                continue;
            }
            let snapshot = self.query(&self.subscribers[i].scope, self.subscribers[i].limit);
            if self.subscribers[i].tx.send(snapshot).is_err() {
                dead.push(self.subscribers[i].id);
            }
        }
        if !dead.is_empty() {
            self.subscribers.retain(|s| !dead.contains(&s.id));
        }
    }
}

/// In-process document store with live queries.
///
/// Append-only and multi-writer: documents are immutable once accepted and
/// there is no update or delete. Each subscription receives the current
/// matching set on registration and a full-replacement snapshot after
/// every matching append; within one subscription snapshots arrive in
/// emission order. A single append is one lock region, so writers never
/// observe a half-inserted document.
pub struct DocStore {
    inner: Mutex<Inner>,
}

impl DocStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner::default()),
        })
    }

    /// Persist a new document in the given scope and return its id.
    /// A reply's parent must already exist.
    pub fn append(&self, scope: &Scope, fields: Map<String, Value>) -> Result<String, StoreError> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(StoreError::Write("store is shut down".to_string()));
        }
        if let Some(parent_id) = scope.parent_id() {
            if !inner.by_id.contains_key(parent_id) {
                return Err(StoreError::Write(format!(
                    "unknown parent message {parent_id}"
                )));
            }
        }

        let id = Uuid::new_v4().to_string();
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let index = inner.docs.len();
        inner.docs.push(Document {
            id: id.clone(),
            seq,
            parent_id: scope.parent_id().map(str::to_string),
            fields,
        });
        inner.by_id.insert(id.clone(), index);
        inner
            .by_parent
            .entry(scope.parent_id().map(str::to_string))
            .or_default()
            .push(index);

        inner.notify(scope);
        Ok(id)
    }

    /// Open a live query over a scope. The current snapshot is delivered
    /// immediately; dropping the returned handle unsubscribes.
    pub fn subscribe(
        self: &Arc<Self>,
        scope: Scope,
        limit: usize,
    ) -> Result<Subscription, StoreError> {
        if limit == 0 {
            return Err(StoreError::Subscription(
                "limit must be non-zero".to_string(),
            ));
        }
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(StoreError::Subscription("store is shut down".to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let id = inner.next_sub_id;
        inner.next_sub_id += 1;

        // Initial snapshot lands before any later append can notify, so a
        // subscriber never misses a change between registration and first
        // delivery.
        let snapshot = inner.query(&scope, limit);
        let _ = tx.send(snapshot);
        inner.subscribers.push(Subscriber {
            id,
            scope,
            limit,
            tx,
        });

        Ok(Subscription {
            id,
            store: Arc::downgrade(self),
            rx,
        })
    }

    /// One-shot read used by tools and tests; live consumers subscribe.
    pub fn query(&self, scope: &Scope, limit: usize) -> Snapshot {
        self.inner.lock().query(scope, limit)
    }

    /// Number of registered live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    /// Close every subscription channel and reject further writes.
    /// Consumers observe the closed channel as an interrupted feed.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.subscribers.clear();
    }

    fn unsubscribe(&self, sub_id: u64) {
        self.inner.lock().subscribers.retain(|s| s.id != sub_id);
    }
}

/// Live handle to one query. Dropping it deregisters the subscriber.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    store: Weak<DocStore>,
    rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl Subscription {
    /// Next full-replacement snapshot; `None` once the store shuts down.
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    /// Non-blocking variant for callers that poll on a tick.
    pub fn try_recv(&mut self) -> Result<Snapshot, TryRecvError> {
        self.rx.try_recv()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}

use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Result;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::CoreConfig;
use crate::store::{DocStore, MessageStore, StoreCommand, StoreUpdate, StoreWorker};

/// Cloneable handle the UI uses to reach the store worker.
#[derive(Clone)]
pub struct CoreHandle {
    command_tx: Sender<StoreCommand>,
}

impl CoreHandle {
    pub fn send(&self, command: StoreCommand) -> Result<(), mpsc::SendError<StoreCommand>> {
        self.command_tx.send(command)
    }
}

/// Owns the document store and the writer thread, and hands out the
/// pieces the UI needs: a typed store for subscriptions, a command handle
/// for writes, and the update channel for write outcomes.
pub struct CoreRuntime {
    db: Arc<DocStore>,
    store: MessageStore,
    handle: CoreHandle,
    update_rx: Option<UnboundedReceiver<StoreUpdate>>,
    worker_handle: Option<JoinHandle<()>>,
    config: CoreConfig,
}

impl CoreRuntime {
    pub fn new(config: CoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let db = DocStore::new();
        let store = MessageStore::new(db.clone());

        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (update_tx, update_rx) = tokio::sync::mpsc::unbounded_channel::<StoreUpdate>();

        let worker = StoreWorker::new(store.clone(), command_rx, update_tx);
        let worker_handle = std::thread::spawn(move || worker.run());

        Ok(Self {
            db,
            store,
            handle: CoreHandle { command_tx },
            update_rx: Some(update_rx),
            worker_handle: Some(worker_handle),
            config,
        })
    }

    pub fn handle(&self) -> CoreHandle {
        self.handle.clone()
    }

    pub fn store(&self) -> MessageStore {
        self.store.clone()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn take_update_rx(&mut self) -> Option<UnboundedReceiver<StoreUpdate>> {
        self.update_rx.take()
    }

    /// Stop the worker, then close every live subscription.
    pub fn shutdown(&mut self) {
        let _ = self.handle.send(StoreCommand::Shutdown);
        if let Some(worker_handle) = self.worker_handle.take() {
            let _ = worker_handle.join();
        }
        self.db.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::{LiveQuery, QueryState};
    use crate::models::{NewMessage, Scope};
    use tempfile::tempdir;

    #[test]
    fn test_runtime_wires_store_and_worker() {
        let dir = tempdir().unwrap();
        let mut runtime = CoreRuntime::new(CoreConfig::new(dir.path())).unwrap();
        let store = runtime.store();
        let mut query = LiveQuery::open(&store, Scope::TopLevel);
        query.poll();

        runtime
            .handle()
            .send(StoreCommand::Append {
                scope: Scope::TopLevel,
                message: NewMessage {
                    text: "hello".to_string(),
                    author_name: "Ada".to_string(),
                    uid: "u1".to_string(),
                    time: 100,
                },
            })
            .unwrap();

        let mut update_rx = runtime.take_update_rx().unwrap();
        let update = update_rx.blocking_recv().unwrap();
        assert!(matches!(update, StoreUpdate::Appended { .. }));

        assert!(query.poll());
        assert_eq!(query.messages().len(), 1);

        runtime.shutdown();
        // Shutdown interrupts the surviving subscription.
        query.poll();
        assert_eq!(query.state(), QueryState::Errored);
    }
}

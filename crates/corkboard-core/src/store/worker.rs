use std::sync::mpsc::Receiver;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::{NewMessage, Scope};
use crate::store::MessageStore;

/// Commands the UI thread sends to the store worker.
pub enum StoreCommand {
    /// Fire-and-forget append. The composer does not wait on the result;
    /// the outcome comes back over the update channel.
    Append { scope: Scope, message: NewMessage },
    Shutdown,
}

/// Outcomes the worker pushes back to the UI.
#[derive(Debug)]
pub enum StoreUpdate {
    Appended { scope: Scope, id: String },
    AppendFailed { scope: Scope, error: StoreError },
}

/// Dedicated writer thread. Appends issued here are never cancelled once
/// received; the channel drains in order.
pub struct StoreWorker {
    store: MessageStore,
    command_rx: Receiver<StoreCommand>,
    update_tx: UnboundedSender<StoreUpdate>,
}

impl StoreWorker {
    pub fn new(
        store: MessageStore,
        command_rx: Receiver<StoreCommand>,
        update_tx: UnboundedSender<StoreUpdate>,
    ) -> Self {
        Self {
            store,
            command_rx,
            update_tx,
        }
    }

    pub fn run(self) {
        while let Ok(command) = self.command_rx.recv() {
            match command {
                StoreCommand::Append { scope, message } => {
                    match self.store.append(&scope, &message) {
                        Ok(id) => {
                            debug!(path = %scope.path(), id = %id, "message appended");
                            let _ = self.update_tx.send(StoreUpdate::Appended { scope, id });
                        }
                        Err(error) => {
                            warn!(path = %scope.path(), %error, "append rejected");
                            let _ = self
                                .update_tx
                                .send(StoreUpdate::AppendFailed { scope, error });
                        }
                    }
                }
                StoreCommand::Shutdown => break,
            }
        }
    }
}

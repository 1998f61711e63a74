//! Actor runtime: one task per attached session owning its controller.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::context_menu::{ClickBus, OutsideClick};
use super::controller::{BrowserCommand, BrowserController, BrowserSnapshot, ModalKind, Outcome};
use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::error::{FsError, Result};
use crate::fs::{RemoteDirectory, SortSpec};
use crate::progress::UploadProgress;

/// Cheap, cloneable handle to a running browser.
#[derive(Clone)]
pub struct BrowserHandle {
    tx: mpsc::Sender<ActorMessage>,
    snapshots: watch::Receiver<BrowserSnapshot>,
    listing: Arc<Mutex<CancellationToken>>,
    click_bus: ClickBus,
}

enum ActorMessage {
    Command {
        command: BrowserCommand,
        cancel: CancellationToken,
        reply: oneshot::Sender<Outcome>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

struct BrowserActor {
    controller: BrowserController,
    rx: mpsc::Receiver<ActorMessage>,
}

impl BrowserHandle {
    /// Connect to the server in `config` and open `session_id` at `/`.
    pub async fn connect(config: &ClientConfig, session_id: &str) -> Result<(Self, Outcome)> {
        let client = ApiClient::from_config(config)?;
        Self::attach(
            Arc::new(client),
            session_id,
            config.effective_delete_concurrency(),
            ClickBus::new(),
        )
        .await
    }

    /// Start a browser over `remote` and list `/`.
    ///
    /// The returned outcome is the initial listing's; a failed first listing
    /// still yields a usable handle.
    pub async fn attach(
        remote: Arc<dyn RemoteDirectory>,
        session_id: &str,
        delete_concurrency: usize,
        click_bus: ClickBus,
    ) -> Result<(Self, Outcome)> {
        let controller = BrowserController::new(remote, session_id)
            .with_delete_concurrency(delete_concurrency)
            .with_click_bus(click_bus.clone());
        let handle = BrowserActor::spawn(controller, click_bus);
        let outcome = handle.navigate("/").await?;
        Ok((handle, outcome))
    }

    /// Queue `command` and wait for its outcome.
    pub async fn send(&self, command: BrowserCommand) -> Result<Outcome> {
        let cancel = self.listing_token(&command);
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ActorMessage::Command {
                command,
                cancel,
                reply,
            })
            .await
            .map_err(|_| FsError::ActorStopped)?;
        rx.await.map_err(|_| FsError::ActorStopped)
    }

    /// Token for the listing `command` may run. Anything that changes
    /// directory supersedes the listing currently in flight.
    fn listing_token(&self, command: &BrowserCommand) -> CancellationToken {
        let supersedes = match command {
            BrowserCommand::Activate { key } => self
                .snapshots
                .borrow()
                .entries
                .iter()
                .any(|e| &e.key == key && e.is_navigable()),
            BrowserCommand::NavigateUp => self.snapshots.borrow().current_directory != "/",
            other => other.starts_listing(),
        };

        let mut current = self.listing.lock().unwrap_or_else(PoisonError::into_inner);
        if supersedes {
            current.cancel();
            *current = CancellationToken::new();
        }
        current.clone()
    }

    pub fn snapshot(&self) -> BrowserSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<BrowserSnapshot> {
        self.snapshots.clone()
    }

    pub fn click_bus(&self) -> &ClickBus {
        &self.click_bus
    }

    /// Abandon the listing in flight, if any.
    pub fn cancel_listing(&self) {
        let mut current = self.listing.lock().unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = CancellationToken::new();
    }

    /// Report a pointer press outside the context menu.
    pub fn outside_click(&self, x: i32, y: i32) {
        self.click_bus.publish(OutsideClick { x, y });
    }

    /// Stop the actor. Later commands fail with [`FsError::ActorStopped`].
    pub async fn shutdown(&self) -> Result<()> {
        self.cancel_listing();
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ActorMessage::Shutdown { reply })
            .await
            .map_err(|_| FsError::ActorStopped)?;
        rx.await.map_err(|_| FsError::ActorStopped)
    }

    pub async fn navigate(&self, path: &str) -> Result<Outcome> {
        self.send(BrowserCommand::Navigate {
            path: path.to_string(),
        })
        .await
    }

    pub async fn navigate_up(&self) -> Result<Outcome> {
        self.send(BrowserCommand::NavigateUp).await
    }

    pub async fn refresh(&self) -> Result<Outcome> {
        self.send(BrowserCommand::Refresh).await
    }

    pub async fn select(&self, keys: Vec<String>) -> Result<Outcome> {
        self.send(BrowserCommand::Select { keys }).await
    }

    pub async fn click(&self, key: &str) -> Result<Outcome> {
        self.send(BrowserCommand::Click {
            key: key.to_string(),
        })
        .await
    }

    pub async fn activate(&self, key: &str) -> Result<Outcome> {
        self.send(BrowserCommand::Activate {
            key: key.to_string(),
        })
        .await
    }

    pub async fn open_context_menu(&self, key: &str, x: i32, y: i32) -> Result<Outcome> {
        self.send(BrowserCommand::OpenContextMenu {
            key: key.to_string(),
            x,
            y,
        })
        .await
    }

    pub async fn close_context_menu(&self) -> Result<Outcome> {
        self.send(BrowserCommand::CloseContextMenu).await
    }

    pub async fn request_delete(&self) -> Result<Outcome> {
        self.send(BrowserCommand::RequestDelete).await
    }

    pub async fn confirm_delete(&self) -> Result<Outcome> {
        self.send(BrowserCommand::ConfirmDelete).await
    }

    pub async fn cancel_delete(&self) -> Result<Outcome> {
        self.send(BrowserCommand::CancelDelete).await
    }

    pub async fn request_rename(&self, new_name: &str) -> Result<Outcome> {
        self.send(BrowserCommand::RequestRename {
            new_name: new_name.to_string(),
        })
        .await
    }

    pub async fn request_mkdir(&self, name: &str) -> Result<Outcome> {
        self.send(BrowserCommand::RequestMkdir {
            name: name.to_string(),
        })
        .await
    }

    pub async fn request_download(&self) -> Result<Outcome> {
        self.send(BrowserCommand::RequestDownload).await
    }

    pub async fn open_modal(&self, kind: ModalKind) -> Result<Outcome> {
        self.send(BrowserCommand::OpenModal(kind)).await
    }

    pub async fn cancel_modal(&self) -> Result<Outcome> {
        self.send(BrowserCommand::CancelModal).await
    }

    pub async fn confirm_upload(&self) -> Result<Outcome> {
        self.send(BrowserCommand::ConfirmUpload).await
    }

    pub async fn upload_progress(&self, progress: UploadProgress) -> Result<Outcome> {
        self.send(BrowserCommand::UploadProgress(progress)).await
    }

    pub async fn set_sort(&self, sort: Option<SortSpec>) -> Result<Outcome> {
        self.send(BrowserCommand::SetSort(sort)).await
    }
}

impl BrowserActor {
    fn spawn(controller: BrowserController, click_bus: ClickBus) -> BrowserHandle {
        let (tx, rx) = mpsc::channel(64);
        let (snapshot_tx, snapshots) = watch::channel(controller.snapshot());
        let actor = BrowserActor {
            controller: controller.with_publisher(snapshot_tx),
            rx,
        };
        tokio::spawn(actor.run());
        BrowserHandle {
            tx,
            snapshots,
            listing: Arc::new(Mutex::new(CancellationToken::new())),
            click_bus,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                msg = self.rx.recv() => {
                    let Some(msg) = msg else { break; };
                    if self.handle_message(msg).await {
                        break;
                    }
                }
                click = self.controller.next_outside_click() => {
                    debug!(session = %self.controller.session_id(), ?click, "outside click");
                    self.controller.dismiss_context_menu();
                }
            }
        }
        self.controller.teardown();
        debug!(session = %self.controller.session_id(), "browser stopped");
    }

    async fn handle_message(&mut self, msg: ActorMessage) -> bool {
        match msg {
            ActorMessage::Command {
                command,
                cancel,
                reply,
            } => {
                let outcome = self.controller.dispatch_with_cancel(command, cancel).await;
                let _ = reply.send(outcome);
                false
            }
            ActorMessage::Shutdown { reply } => {
                let _ = reply.send(());
                true
            }
        }
    }
}

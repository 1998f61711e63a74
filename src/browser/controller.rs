//! The browser state machine.
//!
//! [`BrowserController`] owns navigation, selection, the context menu, the
//! open dialog and a pending delete confirmation. Every command goes through
//! [`BrowserController::dispatch`], which never fails: errors come back as
//! notices in the [`Outcome`] and the browser always settles in a usable
//! phase.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::batch::{rename_target, BatchOperationExecutor, RenameOutcome};
use super::context_menu::{ClickBus, ContextMenu, ContextMenuAnchor, OutsideClick};
use super::navigation::NavigationState;
use super::selection::SelectionModel;
use crate::error::{ErrorKind, FsError, Result};
use crate::fs::path::{file_name, normalize_path};
use crate::fs::{DirectoryEntry, RemoteDirectory, SortSpec};
use crate::progress::{UploadProgress, UploadStatus};

/// Dialog a presentation layer can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Mkdir,
    Rename,
    Upload,
}

/// An open dialog and what it was opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Modal {
    Mkdir,
    /// Prefilled with the selected entry's name.
    Rename { current_name: String },
    /// Upload endpoint for the directory the dialog was opened in.
    Upload { target: String },
}

impl Modal {
    pub fn kind(&self) -> ModalKind {
        match self {
            Modal::Mkdir => ModalKind::Mkdir,
            Modal::Rename { .. } => ModalKind::Rename,
            Modal::Upload { .. } => ModalKind::Upload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "modal", rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Loading,
    ModalOpen(Modal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A user-facing message produced by a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Shown as-is; remote failures carry the server's own text.
    pub message: String,
    /// Entry the notice is about, when a batch reports per item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            subject: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
            subject: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
            subject: None,
        }
    }

    /// Locally rejected commands warn; anything that reached the network errors.
    pub fn from_error(err: &FsError) -> Self {
        match err.kind() {
            ErrorKind::Validation => Self::warning(err.to_string()),
            ErrorKind::Internal if !matches!(err, FsError::Config(_) | FsError::ActorStopped) => {
                Self::warning(err.to_string())
            }
            _ => Self::error(err.to_string()),
        }
    }

    /// Attach the key of the entry this notice is about.
    pub fn about(mut self, key: impl Into<String>) -> Self {
        self.subject = Some(key.into());
        self
    }
}

/// Work handed back to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fetch `url` and save it as `name`.
    Download { url: String, name: String },
}

/// Everything a command produced besides state changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub notices: Vec<Notice>,
    pub effects: Vec<Effect>,
}

impl Outcome {
    fn notice(notice: Notice) -> Self {
        Self {
            notices: vec![notice],
            effects: Vec::new(),
        }
    }

    pub fn at_level(&self, level: NoticeLevel) -> impl Iterator<Item = &Notice> {
        self.notices.iter().filter(move |n| n.level == level)
    }

    pub fn has_errors(&self) -> bool {
        self.at_level(NoticeLevel::Error).next().is_some()
    }
}

/// A delete waiting for the user to confirm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletePrompt {
    pub title: String,
    pub keys: Vec<String>,
}

/// Which context-menu actions apply to the current selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MenuActions {
    pub download: bool,
    pub rename: bool,
    pub delete: bool,
}

/// Immutable view of the browser handed to readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserSnapshot {
    pub session_id: String,
    pub current_directory: String,
    /// Sorted view, parent sentinel first.
    pub entries: Vec<DirectoryEntry>,
    pub selected_keys: Vec<String>,
    pub active_entry: Option<DirectoryEntry>,
    pub loading: bool,
    pub phase: Phase,
    pub context_menu: ContextMenuAnchor,
    pub menu_actions: MenuActions,
    pub pending_delete: Option<DeletePrompt>,
    pub sort: Option<SortSpec>,
}

/// Commands accepted by the browser.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCommand {
    Navigate { path: String },
    NavigateUp,
    Select { keys: Vec<String> },
    Click { key: String },
    /// Double click: enter directories and links, ignore files.
    Activate { key: String },
    OpenContextMenu { key: String, x: i32, y: i32 },
    CloseContextMenu,
    RequestDelete,
    ConfirmDelete,
    CancelDelete,
    RequestRename { new_name: String },
    RequestMkdir { name: String },
    RequestDownload,
    Refresh,
    OpenModal(ModalKind),
    CancelModal,
    ConfirmUpload,
    UploadProgress(UploadProgress),
    SetSort(Option<SortSpec>),
}

impl BrowserCommand {
    /// Commands that start a new listing and may supersede one in flight.
    pub fn starts_listing(&self) -> bool {
        matches!(
            self,
            BrowserCommand::Navigate { .. } | BrowserCommand::NavigateUp | BrowserCommand::Refresh
        )
    }
}

/// State machine for one attached session.
pub struct BrowserController {
    remote: Arc<dyn RemoteDirectory>,
    nav: NavigationState,
    selection: SelectionModel,
    executor: BatchOperationExecutor,
    modal: Option<Modal>,
    pending_delete: Option<DeletePrompt>,
    menu: ContextMenu,
    click_bus: ClickBus,
    cancel: CancellationToken,
    publisher: Option<watch::Sender<BrowserSnapshot>>,
}

impl BrowserController {
    pub fn new(remote: Arc<dyn RemoteDirectory>, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        Self {
            executor: BatchOperationExecutor::new(Arc::clone(&remote), session_id.clone()),
            remote,
            nav: NavigationState::new(session_id),
            selection: SelectionModel::new(),
            modal: None,
            pending_delete: None,
            menu: ContextMenu::new(),
            click_bus: ClickBus::new(),
            cancel: CancellationToken::new(),
            publisher: None,
        }
    }

    pub fn with_delete_concurrency(mut self, concurrency: usize) -> Self {
        self.executor = self.executor.with_concurrency(concurrency);
        self
    }

    /// Listen for outside clicks on `bus` instead of a private bus.
    pub fn with_click_bus(mut self, bus: ClickBus) -> Self {
        self.click_bus = bus;
        self
    }

    /// Push a snapshot into `tx` whenever state changes, including when a
    /// listing starts.
    pub fn with_publisher(mut self, tx: watch::Sender<BrowserSnapshot>) -> Self {
        self.publisher = Some(tx);
        self
    }

    pub fn click_bus(&self) -> &ClickBus {
        &self.click_bus
    }

    pub fn session_id(&self) -> &str {
        self.nav.session_id()
    }

    pub fn phase(&self) -> Phase {
        if let Some(modal) = &self.modal {
            Phase::ModalOpen(modal.clone())
        } else if self.nav.loading() {
            Phase::Loading
        } else {
            Phase::Idle
        }
    }

    pub fn menu_actions(&self) -> MenuActions {
        let single = self.selection.single().and_then(|key| self.nav.entry(key));
        MenuActions {
            download: single.is_some_and(DirectoryEntry::is_downloadable),
            rename: single.is_some(),
            delete: !self.selection.is_empty(),
        }
    }

    pub fn snapshot(&self) -> BrowserSnapshot {
        BrowserSnapshot {
            session_id: self.nav.session_id().to_string(),
            current_directory: self.nav.current_directory().to_string(),
            entries: self.nav.view(),
            selected_keys: self.selection.selected_keys().to_vec(),
            active_entry: self.selection.active_entry().cloned(),
            loading: self.nav.loading(),
            phase: self.phase(),
            context_menu: self.menu.anchor(),
            menu_actions: self.menu_actions(),
            pending_delete: self.pending_delete.clone(),
            sort: self.nav.sort(),
        }
    }

    /// Run `command` with a listing token tied to this controller's lifetime.
    pub async fn dispatch(&mut self, command: BrowserCommand) -> Outcome {
        let cancel = self.cancel.child_token();
        self.dispatch_with_cancel(command, cancel).await
    }

    /// Run `command`. A listing it starts is dropped unapplied once `cancel`
    /// fires.
    pub async fn dispatch_with_cancel(
        &mut self,
        command: BrowserCommand,
        cancel: CancellationToken,
    ) -> Outcome {
        debug!(session = %self.nav.session_id(), ?command, "dispatch");
        let outcome = match self.execute(command, &cancel).await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(session = %self.nav.session_id(), error = %err, "command failed");
                Outcome::notice(Notice::from_error(&err))
            }
        };
        self.reconcile_context_menu();
        self.publish();
        outcome
    }

    /// Wait for a click outside the open menu. Pends while no menu is open.
    pub async fn next_outside_click(&mut self) -> Option<OutsideClick> {
        match self.menu.subscription_mut() {
            Some(subscription) => subscription.next().await,
            None => std::future::pending().await,
        }
    }

    /// Close the menu after an outside click (or after the bus went away).
    pub fn dismiss_context_menu(&mut self) {
        if self.menu.is_visible() || self.menu.is_subscribed() {
            self.menu.close();
            self.publish();
        }
    }

    /// Abort listings started through [`dispatch`](Self::dispatch) and drop
    /// the outside-click subscription.
    pub fn teardown(&mut self) {
        self.cancel.cancel();
        self.menu.close();
    }

    async fn execute(&mut self, command: BrowserCommand, cancel: &CancellationToken) -> Result<Outcome> {
        match command {
            BrowserCommand::Navigate { path } => {
                self.ensure_no_modal()?;
                self.load(&path, cancel).await
            }
            BrowserCommand::NavigateUp => match self.nav.parent_directory() {
                Some(parent) => {
                    self.ensure_no_modal()?;
                    self.load(&parent, cancel).await
                }
                None => Ok(Outcome::default()),
            },
            BrowserCommand::Refresh => {
                self.ensure_no_modal()?;
                let dir = self.nav.current_directory().to_string();
                self.load(&dir, cancel).await
            }
            BrowserCommand::Select { keys } => {
                self.selection.select(keys, self.nav.entries());
                Ok(Outcome::default())
            }
            BrowserCommand::Click { key } => {
                let entry = self.lookup(&key)?.clone();
                self.selection.click(&entry);
                Ok(Outcome::default())
            }
            BrowserCommand::Activate { key } => self.activate(&key, cancel).await,
            BrowserCommand::OpenContextMenu { key, x, y } => {
                let entry = self.lookup(&key)?.clone();
                if self.selection.context_target(&entry) {
                    self.menu.open(entry.key, x, y, &self.click_bus);
                }
                Ok(Outcome::default())
            }
            BrowserCommand::CloseContextMenu => {
                self.menu.close();
                Ok(Outcome::default())
            }
            BrowserCommand::RequestDelete => self.request_delete(),
            BrowserCommand::ConfirmDelete => self.confirm_delete(cancel).await,
            BrowserCommand::CancelDelete => {
                self.pending_delete = None;
                Ok(Outcome::default())
            }
            BrowserCommand::RequestRename { new_name } => self.rename(&new_name).await,
            BrowserCommand::RequestMkdir { name } => self.mkdir(&name, cancel).await,
            BrowserCommand::RequestDownload => self.download(),
            BrowserCommand::OpenModal(kind) => self.open_modal(kind),
            BrowserCommand::CancelModal => {
                self.modal = None;
                Ok(Outcome::default())
            }
            BrowserCommand::ConfirmUpload => {
                if !matches!(self.modal, Some(Modal::Upload { .. })) {
                    return Err(FsError::InvalidState("no upload dialog is open".to_string()));
                }
                self.modal = None;
                let dir = self.nav.current_directory().to_string();
                self.load(&dir, cancel).await
            }
            BrowserCommand::UploadProgress(progress) => Ok(upload_notice(&progress)),
            BrowserCommand::SetSort(sort) => {
                self.nav.set_sort(sort);
                Ok(Outcome::default())
            }
        }
    }

    /// List `path` and make it the current directory.
    ///
    /// Directory and entries change only when the listing succeeds and was
    /// not cancelled. `loading` is released on every path.
    async fn load(&mut self, path: &str, cancel: &CancellationToken) -> Result<Outcome> {
        let dir = normalize_path(path);
        self.nav.begin_loading()?;
        self.publish();

        let request = self
            .remote
            .list(self.nav.session_id().to_string(), dir.clone());
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = request => Some(result),
        };
        self.nav.finish_loading();

        match result {
            None => {
                debug!(session = %self.nav.session_id(), dir = %dir, "listing superseded, discarded");
                Ok(Outcome::default())
            }
            Some(Ok(entries)) => {
                debug!(session = %self.nav.session_id(), dir = %dir, count = entries.len(), "listing applied");
                self.nav.apply_listing(dir, entries);
                self.selection.clear();
                self.pending_delete = None;
                self.menu.close();
                Ok(Outcome::default())
            }
            Some(Err(err)) => Err(err),
        }
    }

    async fn activate(&mut self, key: &str, cancel: &CancellationToken) -> Result<Outcome> {
        let entry = self.lookup(key)?;
        if !entry.is_navigable() {
            return Ok(Outcome::default());
        }
        let target = if entry.is_parent() {
            self.nav
                .parent_directory()
                .unwrap_or_else(|| "/".to_string())
        } else {
            entry.path.clone()
        };
        self.ensure_no_modal()?;
        self.load(&target, cancel).await
    }

    fn request_delete(&mut self) -> Result<Outcome> {
        let keys = self.selection.deletion_targets();
        let title = match keys.as_slice() {
            [] => return Ok(Outcome::notice(Notice::warning("Select at least one item to delete"))),
            [key] => {
                let name = self
                    .nav
                    .entry(key)
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| file_name(key).to_string());
                format!("Delete \"{}\"?", name)
            }
            _ => format!("Delete the {} selected items?", keys.len()),
        };
        self.menu.close();
        self.pending_delete = Some(DeletePrompt { title, keys });
        Ok(Outcome::default())
    }

    async fn confirm_delete(&mut self, cancel: &CancellationToken) -> Result<Outcome> {
        self.ensure_no_modal()?;
        let prompt = self
            .pending_delete
            .take()
            .ok_or_else(|| FsError::InvalidState("no delete awaiting confirmation".to_string()))?;

        let report = self.executor.delete(&prompt.keys).await;
        let mut outcome = Outcome::default();
        for failure in &report.failures {
            outcome
                .notices
                .push(Notice::from_error(&failure.error).about(&failure.key));
        }
        if !report.succeeded.is_empty() {
            outcome
                .notices
                .push(Notice::success(format!("Deleted {} item(s)", report.succeeded.len())));
        }

        let dir = self.nav.current_directory().to_string();
        if let Err(err) = self.load(&dir, cancel).await {
            outcome.notices.push(Notice::from_error(&err));
        }
        Ok(outcome)
    }

    async fn rename(&mut self, new_name: &str) -> Result<Outcome> {
        self.ensure_modal_allows(ModalKind::Rename)?;
        let old_key = self
            .selection
            .single()
            .map(str::to_string)
            .ok_or_else(|| FsError::Validation("Select exactly one item to rename".to_string()))?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(FsError::Validation("New name is required".to_string()));
        }
        self.modal = None;

        let new_path = rename_target(self.nav.current_directory(), new_name);
        match self.executor.rename(&old_key, &new_path).await? {
            RenameOutcome::Unchanged => Ok(Outcome::notice(Notice::success("Name unchanged"))),
            RenameOutcome::Renamed { old_path, new_path } => {
                if let Some(entry) = self.nav.patch_entry(&old_path, &new_path) {
                    let entry = entry.clone();
                    self.selection.rekey(&old_path, &entry);
                }
                Ok(Outcome::notice(Notice::success(format!("Renamed to {}", new_name))))
            }
        }
    }

    async fn mkdir(&mut self, name: &str, cancel: &CancellationToken) -> Result<Outcome> {
        self.ensure_modal_allows(ModalKind::Mkdir)?;
        if name.trim().is_empty() {
            return Err(FsError::Validation("Folder name is required".to_string()));
        }
        self.modal = None;

        let dir = self.nav.current_directory().to_string();
        self.executor.mkdir(&dir, name).await?;
        let mut outcome = Outcome::notice(Notice::success(format!("Created {}", name.trim())));
        if let Err(err) = self.load(&dir, cancel).await {
            outcome.notices.push(Notice::from_error(&err));
        }
        Ok(outcome)
    }

    fn download(&mut self) -> Result<Outcome> {
        let entry = self
            .selection
            .single()
            .and_then(|key| self.nav.entry(key))
            .filter(|e| e.is_downloadable())
            .ok_or_else(|| FsError::Validation("Select a single file to download".to_string()))?;
        let url = self.remote.download_url(self.nav.session_id(), &entry.path)?;
        info!(session = %self.nav.session_id(), path = %entry.path, "download requested");
        let effect = Effect::Download {
            url,
            name: entry.name.clone(),
        };
        self.menu.close();
        Ok(Outcome {
            notices: Vec::new(),
            effects: vec![effect],
        })
    }

    fn open_modal(&mut self, kind: ModalKind) -> Result<Outcome> {
        if let Some(open) = &self.modal {
            return Err(FsError::InvalidState(format!(
                "{:?} dialog is already open",
                open.kind()
            )));
        }
        let modal = match kind {
            ModalKind::Mkdir => Modal::Mkdir,
            ModalKind::Rename => {
                let entry = self
                    .selection
                    .single()
                    .and_then(|key| self.nav.entry(key))
                    .ok_or_else(|| {
                        FsError::Validation("Select exactly one item to rename".to_string())
                    })?;
                Modal::Rename {
                    current_name: entry.name.clone(),
                }
            }
            ModalKind::Upload => Modal::Upload {
                target: self
                    .remote
                    .upload_target(self.nav.session_id(), self.nav.current_directory())?,
            },
        };
        self.menu.close();
        self.modal = Some(modal);
        Ok(Outcome::default())
    }

    fn lookup(&self, key: &str) -> Result<&DirectoryEntry> {
        self.nav
            .entry(key)
            .ok_or_else(|| FsError::Validation(format!("No entry {} in this directory", key)))
    }

    fn ensure_no_modal(&self) -> Result<()> {
        match &self.modal {
            Some(modal) => Err(FsError::InvalidState(format!(
                "close the {:?} dialog first",
                modal.kind()
            ))),
            None => Ok(()),
        }
    }

    fn ensure_modal_allows(&self, kind: ModalKind) -> Result<()> {
        match &self.modal {
            Some(modal) if modal.kind() != kind => Err(FsError::InvalidState(format!(
                "close the {:?} dialog first",
                modal.kind()
            ))),
            _ => Ok(()),
        }
    }

    /// The menu stays open only while its target is selected and nobody
    /// clicked outside it.
    fn reconcile_context_menu(&mut self) {
        if !self.menu.is_visible() {
            return;
        }
        let target_selected = self
            .menu
            .target()
            .is_some_and(|target| self.selection.contains(target));
        let clicked_outside = self
            .menu
            .subscription_mut()
            .is_some_and(|s| s.try_next().is_some());
        if !target_selected || clicked_outside {
            self.menu.close();
        }
    }

    fn publish(&self) {
        if let Some(tx) = &self.publisher {
            tx.send_replace(self.snapshot());
        }
    }
}

fn upload_notice(progress: &UploadProgress) -> Outcome {
    if !progress.status.is_finished() {
        return Outcome::default();
    }
    let notice = if progress.status == UploadStatus::Done {
        Notice::success(format!("Uploaded {}", progress.file_name))
    } else {
        Notice::error(format!("Failed to upload {}", progress.file_name))
    };
    Outcome::notice(notice.about(progress.file_name.clone()))
}

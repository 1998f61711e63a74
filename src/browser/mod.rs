//! Session-scoped browser: navigation, selection, batch mutation and the
//! actor that serializes commands for one attached session.

pub mod actor;
pub mod batch;
pub mod context_menu;
pub mod controller;
pub mod navigation;
pub mod selection;

pub use actor::BrowserHandle;
pub use batch::{BatchOperationExecutor, BatchReport, ItemFailure, RenameOutcome};
pub use context_menu::{ClickBus, ContextMenuAnchor, OutsideClick};
pub use controller::{
    BrowserCommand, BrowserController, BrowserSnapshot, DeletePrompt, Effect, MenuActions, Modal,
    ModalKind, Notice, NoticeLevel, Outcome, Phase,
};
pub use navigation::NavigationState;
pub use selection::SelectionModel;

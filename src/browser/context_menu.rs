//! Right-click menu anchor and the outside-click subscription.

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const CLICK_BUS_CAPACITY: usize = 16;

/// Where the context menu is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContextMenuAnchor {
    pub visible: bool,
    pub x: i32,
    pub y: i32,
}

/// A pointer press that landed outside the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutsideClick {
    pub x: i32,
    pub y: i32,
}

/// Fan-out of outside clicks from the presentation layer.
#[derive(Debug, Clone)]
pub struct ClickBus {
    tx: broadcast::Sender<OutsideClick>,
}

impl ClickBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CLICK_BUS_CAPACITY);
        Self { tx }
    }

    /// Publish a click. Returns how many open menus were listening.
    pub fn publish(&self, click: OutsideClick) -> usize {
        self.tx.send(click).unwrap_or(0)
    }

    pub fn subscribe(&self) -> OutsideClickSubscription {
        OutsideClickSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ClickBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Live interest in outside clicks. Dropping it unsubscribes.
#[derive(Debug)]
pub struct OutsideClickSubscription {
    rx: broadcast::Receiver<OutsideClick>,
}

impl OutsideClickSubscription {
    /// Wait for the next click. `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<OutsideClick> {
        loop {
            match self.rx.recv().await {
                Ok(click) => return Some(click),
                // Missed clicks still count as "a click happened".
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll for a pending click.
    pub fn try_next(&mut self) -> Option<OutsideClick> {
        loop {
            match self.rx.try_recv() {
                Ok(click) => return Some(click),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

/// Context menu state: anchor, target key and the click subscription held
/// while the menu is visible.
#[derive(Debug, Default)]
pub struct ContextMenu {
    anchor: ContextMenuAnchor,
    target: Option<String>,
    subscription: Option<OutsideClickSubscription>,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> ContextMenuAnchor {
        self.anchor
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.anchor.visible
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Show the menu for `target` at `(x, y)`. Subscribes to `bus` unless a
    /// subscription is already held.
    pub fn open(&mut self, target: impl Into<String>, x: i32, y: i32, bus: &ClickBus) {
        self.anchor = ContextMenuAnchor {
            visible: true,
            x,
            y,
        };
        self.target = Some(target.into());
        if self.subscription.is_none() {
            self.subscription = Some(bus.subscribe());
        }
    }

    /// Hide the menu and release the subscription.
    pub fn close(&mut self) {
        self.anchor.visible = false;
        self.target = None;
        self.subscription = None;
    }

    pub(crate) fn subscription_mut(&mut self) -> Option<&mut OutsideClickSubscription> {
        self.subscription.as_mut()
    }
}

//! # sessionfs
//!
//! File-browsing core for remote terminal sessions.
//!
//! ## Features
//!
//! - **Remote directory client**: list, create, rename and delete over a
//!   session-scoped HTTP file API, plus pre-authorized download and upload URLs.
//! - **Navigation**: current directory with a synthetic `..` entry, parent path
//!   math, and per-column sorting that keeps `..` pinned first.
//! - **Selection**: click, checkbox multi-select and right-click targeting.
//! - **Batch mutation**: deletes with per-item failure isolation and a single
//!   trailing refresh, rename with in-place patching, mkdir with reload.
//! - **Actor runtime**: one task per session; commands queue on a channel and
//!   snapshots are published on a `watch` channel.
//!
//! ## Example
//!
//! ```no_run
//! use sessionfs::{BrowserHandle, ClientConfig};
//!
//! # async fn example() -> sessionfs::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let (browser, _) = BrowserHandle::connect(&config, "7f3c").await?;
//!
//! browser.navigate("/var/log").await?;
//! for entry in browser.snapshot().entries {
//!     println!("{} {}", entry.name, entry.display_size());
//! }
//!
//! browser.click("/var/log/syslog").await?;
//! let outcome = browser.request_download().await?;
//! println!("{:?}", outcome.effects);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod progress;

// Re-export commonly used types
pub use api::ApiClient;
pub use browser::{
    BrowserCommand, BrowserController, BrowserHandle, BrowserSnapshot, ClickBus, Effect, ModalKind,
    Notice, NoticeLevel, Outcome, Phase,
};
pub use config::ClientConfig;
pub use error::{ErrorKind, FsError, Result};
pub use fs::{DirectoryEntry, RemoteDirectory, SortColumn, SortOrder, SortSpec};
pub use progress::{UploadProgress, UploadStatus};

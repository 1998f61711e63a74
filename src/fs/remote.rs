//! The remote directory seam.

use futures::future::BoxFuture;

use super::entry::DirectoryEntry;
use crate::error::Result;

/// Boxed future returned by [`RemoteDirectory`] calls.
pub type RemoteFuture<T> = BoxFuture<'static, Result<T>>;

/// Session-scoped filesystem operations on the remote host.
///
/// Every operation names the session it runs in. Futures own their inputs so
/// the trait stays object-safe and can be held as `Arc<dyn RemoteDirectory>`.
#[cfg_attr(test, mockall::automock)]
pub trait RemoteDirectory: Send + Sync {
    /// List the direct children of `path`. A blank path lists `/`.
    fn list(&self, session_id: String, path: String) -> RemoteFuture<Vec<DirectoryEntry>>;

    /// Create directory `name` inside `parent`.
    fn mkdir(&self, session_id: String, parent: String, name: String) -> RemoteFuture<()>;

    /// Move `old_path` to `new_path`. Equal paths succeed without a request.
    fn rename(&self, session_id: String, old_path: String, new_path: String)
        -> RemoteFuture<()>;

    /// Delete a single file or directory.
    fn remove(&self, session_id: String, path: String) -> RemoteFuture<()>;

    /// Pre-authorized URL the transfer collaborator fetches `path` from.
    fn download_url(&self, session_id: &str, path: &str) -> Result<String>;

    /// Endpoint the upload collaborator posts files for `dir` to.
    fn upload_target(&self, session_id: &str, dir: &str) -> Result<String>;
}

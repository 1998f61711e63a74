//! Filesystem data model: entries, remote paths, sorting and the remote seam.

pub(crate) mod entry;
pub mod path;
mod remote;
pub mod sort;

pub use entry::{format_size, DirectoryEntry, PARENT_KEY};
pub use remote::{RemoteDirectory, RemoteFuture};
pub use sort::{SortColumn, SortOrder, SortSpec};

#[cfg(test)]
pub(crate) use remote::MockRemoteDirectory;

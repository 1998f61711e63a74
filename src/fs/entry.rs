//! Directory entry types.

use serde::{Deserialize, Serialize};

use super::path::file_name;

/// Key, name and path of the synthetic "go up one directory" entry.
pub const PARENT_KEY: &str = "..";

/// One file, directory or symlink in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Absolute path, or [`PARENT_KEY`] for the parent sentinel
    pub key: String,
    /// Base name
    pub name: String,
    /// Absolute path on the remote host
    pub path: String,
    /// Directory flag
    pub is_dir: bool,
    /// Symlink flag
    pub is_link: bool,
    /// Size in bytes as reported by the server
    pub size: u64,
    /// Modification time, already formatted by the server
    pub mod_time: String,
    /// Permission string, e.g. `-rw-r--r--`
    pub mode: String,
}

impl DirectoryEntry {
    /// The synthetic `..` entry prepended to every listing below `/`.
    pub fn parent() -> Self {
        Self {
            key: PARENT_KEY.to_string(),
            name: PARENT_KEY.to_string(),
            path: PARENT_KEY.to_string(),
            is_dir: true,
            is_link: false,
            size: 0,
            mod_time: String::new(),
            mode: String::new(),
        }
    }

    /// A plain file at `path`.
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        let path = path.into();
        Self {
            key: path.clone(),
            name: file_name(&path).to_string(),
            path,
            is_dir: false,
            is_link: false,
            size,
            mod_time: String::new(),
            mode: String::new(),
        }
    }

    /// A directory at `path`.
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            is_dir: true,
            ..Self::file(path, 0)
        }
    }

    /// A symlink at `path`.
    pub fn link(path: impl Into<String>) -> Self {
        Self {
            is_link: true,
            ..Self::file(path, 0)
        }
    }

    pub fn with_mod_time(mut self, mod_time: impl Into<String>) -> Self {
        self.mod_time = mod_time.into();
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Check if this is the parent sentinel.
    pub fn is_parent(&self) -> bool {
        self.key == PARENT_KEY
    }

    /// Directories and links can be entered.
    pub fn is_navigable(&self) -> bool {
        self.is_dir || self.is_link
    }

    /// Only regular files can be downloaded.
    pub fn is_downloadable(&self) -> bool {
        !self.is_parent() && !self.is_dir && !self.is_link
    }

    /// Human readable size; blank for directories, links and the sentinel.
    pub fn display_size(&self) -> String {
        if self.is_navigable() || self.is_parent() {
            return String::new();
        }
        format_size(self.size)
    }

    /// Point this entry at a new path, keeping every other attribute.
    pub(crate) fn relocate(&mut self, new_path: &str) {
        self.path = new_path.to_string();
        self.key = new_path.to_string();
        self.name = file_name(new_path).to_string();
    }
}

/// Entry as it appears in the `data` array of an `ls` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoteEntry {
    path: String,
    name: String,
    #[serde(default)]
    is_dir: bool,
    #[serde(default)]
    is_link: bool,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    mod_time: String,
    #[serde(default)]
    mode: String,
}

impl From<RemoteEntry> for DirectoryEntry {
    fn from(remote: RemoteEntry) -> Self {
        Self {
            key: remote.path.clone(),
            name: remote.name,
            path: remote.path,
            is_dir: remote.is_dir,
            is_link: remote.is_link,
            size: remote.size,
            mod_time: remote.mod_time,
            mode: remote.mode,
        }
    }
}

/// Format a byte count with binary units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{}B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1}{}", value, UNITS[unit])
}

//! Current directory, its listing, and parent path math.

use crate::error::{FsError, Result};
use crate::fs::path::{normalize_path, parent_path};
use crate::fs::sort::sort_entries;
use crate::fs::{DirectoryEntry, SortSpec};

/// Navigation state of one browsing session.
///
/// `entries` keeps server order with the parent sentinel spliced in front;
/// sorting only affects [`NavigationState::view`].
#[derive(Debug, Clone)]
pub struct NavigationState {
    session_id: String,
    current_directory: String,
    entries: Vec<DirectoryEntry>,
    loading: bool,
    sort: Option<SortSpec>,
}

impl NavigationState {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            current_directory: "/".to_string(),
            entries: Vec::new(),
            loading: false,
            sort: None,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn current_directory(&self) -> &str {
        &self.current_directory
    }

    /// Entries in server order.
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    /// Entries as rendered: sorted by the active column, sentinel first.
    pub fn view(&self) -> Vec<DirectoryEntry> {
        let mut view = self.entries.clone();
        if let Some(spec) = self.sort {
            sort_entries(&mut view, spec);
        }
        view
    }

    pub fn entry(&self, key: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Directory one level up, or `None` at `/`.
    pub fn parent_directory(&self) -> Option<String> {
        if self.current_directory == "/" {
            return None;
        }
        Some(normalize_path(parent_path(&self.current_directory)))
    }

    /// Mark a listing as in flight. Listings never overlap.
    pub(crate) fn begin_loading(&mut self) -> Result<()> {
        if self.loading {
            return Err(FsError::Busy(format!(
                "still listing {}",
                self.current_directory
            )));
        }
        self.loading = true;
        Ok(())
    }

    pub(crate) fn finish_loading(&mut self) {
        self.loading = false;
    }

    /// Replace the view with a completed listing of `dir`.
    pub(crate) fn apply_listing(&mut self, dir: String, server_entries: Vec<DirectoryEntry>) {
        self.entries = build_listing(&dir, server_entries);
        self.current_directory = dir;
    }

    /// Re-point the entry `old_key` at `new_path`. Returns the patched entry.
    pub(crate) fn patch_entry(&mut self, old_key: &str, new_path: &str) -> Option<&DirectoryEntry> {
        let entry = self.entries.iter_mut().find(|e| e.key == old_key)?;
        entry.relocate(new_path);
        Some(&*entry)
    }
}

/// Listing for `dir`: server entries with a single parent sentinel in front
/// whenever `dir` is not `/`.
pub fn build_listing(dir: &str, server_entries: Vec<DirectoryEntry>) -> Vec<DirectoryEntry> {
    let mut entries = Vec::with_capacity(server_entries.len() + 1);
    if dir != "/" {
        entries.push(DirectoryEntry::parent());
    }
    entries.extend(server_entries.into_iter().filter(|e| !e.is_parent()));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{SortColumn, SortOrder, PARENT_KEY};

    fn parent_count(entries: &[DirectoryEntry]) -> usize {
        entries.iter().filter(|e| e.key == PARENT_KEY).count()
    }

    #[test]
    fn test_build_listing_sentinel() {
        let root = build_listing("/", vec![DirectoryEntry::dir("/etc")]);
        assert_eq!(parent_count(&root), 0);

        for dir in ["/a", "/a/b", "/home/user"] {
            let listing = build_listing(dir, vec![DirectoryEntry::file("/x/f", 1)]);
            assert_eq!(parent_count(&listing), 1);
            assert!(listing[0].is_parent());
        }
    }

    #[test]
    fn test_build_listing_drops_server_sentinel() {
        let mut bogus = DirectoryEntry::dir("/a");
        bogus.key = PARENT_KEY.to_string();
        let listing = build_listing("/a", vec![bogus, DirectoryEntry::dir("/a/b")]);
        assert_eq!(parent_count(&listing), 1);
        assert_eq!(listing.len(), 2);
    }

    #[test]
    fn test_parent_directory() {
        let mut nav = NavigationState::new("s1");
        assert_eq!(nav.parent_directory(), None);

        nav.apply_listing("/home/user".to_string(), Vec::new());
        assert_eq!(nav.parent_directory().as_deref(), Some("/home"));

        nav.apply_listing("/home".to_string(), Vec::new());
        assert_eq!(nav.parent_directory().as_deref(), Some("/"));
    }

    #[test]
    fn test_loading_never_overlaps() {
        let mut nav = NavigationState::new("s1");
        nav.begin_loading().unwrap();
        assert!(matches!(nav.begin_loading(), Err(FsError::Busy(_))));
        nav.finish_loading();
        assert!(nav.begin_loading().is_ok());
    }

    #[test]
    fn test_view_keeps_parent_first() {
        let mut nav = NavigationState::new("s1");
        nav.apply_listing("/a".to_string(), vec![DirectoryEntry::dir("/a/b")]);
        for column in [SortColumn::Name, SortColumn::Size, SortColumn::ModTime] {
            for order in [SortOrder::Ascending, SortOrder::Descending] {
                nav.set_sort(Some(SortSpec::new(column, order)));
                let names: Vec<String> = nav.view().into_iter().map(|e| e.name).collect();
                assert_eq!(names, vec!["..", "b"]);
            }
        }
    }

    #[test]
    fn test_patch_entry() {
        let mut nav = NavigationState::new("s1");
        nav.apply_listing("/a".to_string(), vec![DirectoryEntry::file("/a/old.txt", 3)]);

        let patched = nav.patch_entry("/a/old.txt", "/a/new.txt").unwrap();
        assert_eq!(patched.name, "new.txt");
        assert!(nav.entry("/a/old.txt").is_none());
        assert_eq!(nav.entry("/a/new.txt").unwrap().size, 3);
        assert!(nav.patch_entry("/a/missing", "/a/x").is_none());
    }
}

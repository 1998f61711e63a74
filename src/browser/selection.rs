//! Selected keys and the active row.

use crate::fs::{DirectoryEntry, PARENT_KEY};

/// Selection over the current listing.
///
/// `selected_keys` keeps click order, holds each key once and never holds
/// the parent sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected_keys: Vec<String>,
    active_entry: Option<DirectoryEntry>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_keys(&self) -> &[String] {
        &self.selected_keys
    }

    pub fn active_entry(&self) -> Option<&DirectoryEntry> {
        self.active_entry.as_ref()
    }

    pub fn len(&self) -> usize {
        self.selected_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.selected_keys.iter().any(|k| k == key)
    }

    /// The only selected key, if exactly one is selected.
    pub fn single(&self) -> Option<&str> {
        match self.selected_keys.as_slice() {
            [key] => Some(key),
            _ => None,
        }
    }

    /// Primary click: select just `entry`. Clicks on the sentinel are ignored.
    pub fn click(&mut self, entry: &DirectoryEntry) -> bool {
        if entry.is_parent() {
            return false;
        }
        self.selected_keys = vec![entry.key.clone()];
        self.active_entry = Some(entry.clone());
        true
    }

    /// Replace the selection with `keys`, dropping the sentinel, duplicates
    /// and keys that are not in `entries`.
    pub fn select<I>(&mut self, keys: I, entries: &[DirectoryEntry])
    where
        I: IntoIterator<Item = String>,
    {
        let mut selected: Vec<String> = Vec::new();
        for key in keys {
            if key == PARENT_KEY || selected.contains(&key) {
                continue;
            }
            if entries.iter().any(|e| e.key == key) {
                selected.push(key);
            }
        }
        self.selected_keys = selected;
    }

    /// Secondary click. A target outside the selection replaces it; a target
    /// inside keeps the multi-selection. Returns `false` for the sentinel.
    pub fn context_target(&mut self, entry: &DirectoryEntry) -> bool {
        if entry.is_parent() {
            return false;
        }
        if !self.contains(&entry.key) {
            self.selected_keys = vec![entry.key.clone()];
        }
        self.active_entry = Some(entry.clone());
        true
    }

    pub fn clear(&mut self) {
        self.selected_keys.clear();
        self.active_entry = None;
    }

    /// Keys a delete should act on.
    pub fn deletion_targets(&self) -> Vec<String> {
        self.selected_keys
            .iter()
            .filter(|k| k.as_str() != PARENT_KEY)
            .cloned()
            .collect()
    }

    /// Follow an entry that moved from `old_key` to `entry.key`.
    pub(crate) fn rekey(&mut self, old_key: &str, entry: &DirectoryEntry) {
        for key in self.selected_keys.iter_mut().filter(|k| k.as_str() == old_key) {
            *key = entry.key.clone();
        }
        if self.active_entry.as_ref().is_some_and(|a| a.key == old_key) {
            self.active_entry = Some(entry.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Vec<DirectoryEntry> {
        vec![
            DirectoryEntry::parent(),
            DirectoryEntry::dir("/a/b"),
            DirectoryEntry::file("/a/c.txt", 10),
            DirectoryEntry::file("/a/d.txt", 20),
        ]
    }

    #[test]
    fn test_click_replaces_selection() {
        let entries = listing();
        let mut selection = SelectionModel::new();

        assert!(selection.click(&entries[1]));
        assert!(selection.click(&entries[2]));
        assert_eq!(selection.selected_keys(), ["/a/c.txt".to_string()]);
        assert_eq!(selection.active_entry().unwrap().key, "/a/c.txt");
    }

    #[test]
    fn test_click_on_parent_is_ignored() {
        let entries = listing();
        let mut selection = SelectionModel::new();
        selection.click(&entries[1]);

        assert!(!selection.click(&entries[0]));
        assert_eq!(selection.single(), Some("/a/b"));
    }

    #[test]
    fn test_select_filters_keys() {
        let entries = listing();
        let mut selection = SelectionModel::new();
        selection.select(
            [
                "..".to_string(),
                "/a/c.txt".to_string(),
                "/a/c.txt".to_string(),
                "/elsewhere".to_string(),
                "/a/b".to_string(),
            ],
            &entries,
        );
        assert_eq!(
            selection.selected_keys(),
            ["/a/c.txt".to_string(), "/a/b".to_string()]
        );
        assert!(!selection.contains(".."));
    }

    #[test]
    fn test_context_target() {
        let entries = listing();
        let mut selection = SelectionModel::new();
        selection.select(["/a/c.txt".to_string(), "/a/d.txt".to_string()], &entries);

        // inside the selection: preserved
        assert!(selection.context_target(&entries[3]));
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.active_entry().unwrap().key, "/a/d.txt");

        // outside: replaced
        assert!(selection.context_target(&entries[1]));
        assert_eq!(selection.single(), Some("/a/b"));

        // sentinel: nothing happens
        assert!(!selection.context_target(&entries[0]));
        assert_eq!(selection.single(), Some("/a/b"));
    }

    #[test]
    fn test_rekey_follows_rename() {
        let entries = listing();
        let mut selection = SelectionModel::new();
        selection.click(&entries[2]);

        let moved = DirectoryEntry::file("/a/e.txt", 10);
        selection.rekey("/a/c.txt", &moved);
        assert_eq!(selection.single(), Some("/a/e.txt"));
        assert_eq!(selection.active_entry(), Some(&moved));
    }
}

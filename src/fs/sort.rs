//! Column sorting for listings.
//!
//! Every comparator treats the parent sentinel as equal to everything, and
//! [`sort_entries`] keeps it pinned first in either direction.

use std::cmp::Ordering;

use serde::Serialize;

use super::entry::DirectoryEntry;

/// Sortable listing column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    Name,
    Size,
    ModTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Active sort of a listing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(column: SortColumn, order: SortOrder) -> Self {
        Self { column, order }
    }
}

/// Compare two entries on `column`.
pub fn compare(column: SortColumn, a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    if a.is_parent() || b.is_parent() {
        return Ordering::Equal;
    }
    match column {
        SortColumn::Name => compare_names(&a.name, &b.name),
        SortColumn::Size => a.size.cmp(&b.size),
        SortColumn::ModTime => a.mod_time.cmp(&b.mod_time),
    }
}

// Case-insensitive first so "apple" and "Banana" interleave naturally;
// the raw compare keeps the order total.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stable sort of `entries` by `spec`, with the parent sentinel held first.
pub fn sort_entries(entries: &mut Vec<DirectoryEntry>, spec: SortSpec) {
    let (mut sorted, mut rest): (Vec<_>, Vec<_>) =
        entries.drain(..).partition(DirectoryEntry::is_parent);

    rest.sort_by(|a, b| {
        let ord = compare(spec.column, a, b);
        match spec.order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });

    sorted.append(&mut rest);
    *entries = sorted;
}

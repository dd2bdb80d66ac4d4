//! Immutable table of archive entry names.
//!
//! Names are sorted once at build time so that every directory's
//! descendants form one contiguous run, whatever order the archive tool
//! wrote them in. Resolution and listing rely on that run.

use crate::error::Result;
use log::{debug, warn};
use zipfs_archive::ArchiveReader;

/// One indexed archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Entry name, without leading or trailing `/`.
    pub name: String,
    /// Index of the entry in the archive's native order.
    pub index: usize,
}

/// Sorted, read-only list of entry names built at mount time.
#[derive(Debug, Clone, Default)]
pub struct EntryCatalog {
    entries: Vec<CatalogEntry>,
    truncated: bool,
}

impl EntryCatalog {
    /// Enumerate up to `max_entries` entries of `reader`.
    ///
    /// Entries past the bound are not indexed; [`EntryCatalog::is_truncated`]
    /// reports when that happened.
    pub fn build<R: ArchiveReader + ?Sized>(reader: &mut R, max_entries: usize) -> Result<Self> {
        let total = reader.total_entries();
        debug!("Total entries are {}", total);

        let truncated = total > max_entries;
        if truncated {
            warn!(
                "Archive has {} entries; only the first {} are indexed",
                total, max_entries
            );
        }

        let mut entries = Vec::with_capacity(total.min(max_entries));
        for index in 0..total.min(max_entries) {
            let info = reader.entry_by_index(index)?;
            let name = info.name.trim_matches('/');
            if name.is_empty() {
                debug!("Skipping unnamed entry {}", index);
                continue;
            }
            entries.push(CatalogEntry {
                name: name.to_string(),
                index,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(Self { entries, truncated })
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry was indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the archive had more entries than the configured bound.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// All indexed entries in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// The contiguous run of entries whose names start with `prefix`.
    ///
    /// An empty prefix yields the whole catalog.
    pub fn with_prefix(&self, prefix: &str) -> &[CatalogEntry] {
        let start = self
            .entries
            .partition_point(|e| e.name.as_str() < prefix);
        let len = self.entries[start..]
            .iter()
            .take_while(|e| e.name.starts_with(prefix))
            .count();
        &self.entries[start..start + len]
    }

    /// Whether some entry lives below the directory `name`.
    pub fn has_descendants(&self, name: &str) -> bool {
        !self.with_prefix(&format!("{}/", name)).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryArchive;

    fn names(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn build_sorts_names_and_keeps_archive_indices() {
        let mut archive = MemoryArchive::new()
            .file("b/x", b"1")
            .file("a.txt", b"2")
            .file("a/y", b"3")
            .file("b/w", b"4");

        let catalog = EntryCatalog::build(&mut archive, 100).unwrap();

        assert_eq!(names(catalog.entries()), vec!["a.txt", "a/y", "b/w", "b/x"]);
        let indices: Vec<usize> = catalog.entries().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 0]);
        assert!(!catalog.is_truncated());
    }

    #[test]
    fn build_stops_at_bound_and_reports_truncation() {
        let mut archive = MemoryArchive::new()
            .file("one", b"")
            .file("two", b"")
            .file("three", b"");

        let catalog = EntryCatalog::build(&mut archive, 2).unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(catalog.is_truncated());
        assert_eq!(names(catalog.entries()), vec!["one", "two"]);
    }

    #[test]
    fn with_prefix_returns_contiguous_run_only() {
        let mut archive = MemoryArchive::new()
            .dir("dir")
            .file("dir-a", b"")
            .file("dir/x", b"")
            .file("dir/y/z", b"")
            .file("dirt", b"");

        let catalog = EntryCatalog::build(&mut archive, 100).unwrap();

        assert_eq!(names(catalog.with_prefix("dir/")), vec!["dir/x", "dir/y/z"]);
        assert_eq!(catalog.with_prefix("").len(), 5);
        assert!(catalog.with_prefix("nope/").is_empty());
    }

    #[test]
    fn has_descendants_requires_separator() {
        let mut archive = MemoryArchive::new().file("docs/readme", b"").file("docsx", b"");

        let catalog = EntryCatalog::build(&mut archive, 100).unwrap();

        assert!(catalog.has_descendants("docs"));
        assert!(!catalog.has_descendants("doc"));
        assert!(!catalog.has_descendants("docsx"));
    }

    #[test]
    fn unnamed_entries_are_skipped() {
        let mut archive = MemoryArchive::new().dir("/").file("f", b"");

        let catalog = EntryCatalog::build(&mut archive, 100).unwrap();

        assert_eq!(names(catalog.entries()), vec!["f"]);
    }
}

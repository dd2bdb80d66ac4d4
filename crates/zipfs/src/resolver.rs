//! Path classification against the archive's flat entry list.

use crate::catalog::EntryCatalog;
use crate::error::Result;
use log::debug;
use zipfs_archive::{ArchiveReader, EntryInfo};

/// Outcome of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPath {
    /// The namespace root.
    Root,
    /// A path backed by a real archive entry.
    Explicit(EntryInfo),
    /// A directory with no entry of its own, implied by its descendants.
    Synthetic,
    /// Nothing in the archive matches.
    NotFound,
}

impl ResolvedPath {
    /// Whether the path is a directory of any kind.
    pub fn is_dir(&self) -> bool {
        match self {
            ResolvedPath::Root | ResolvedPath::Synthetic => true,
            ResolvedPath::Explicit(info) => info.is_dir,
            ResolvedPath::NotFound => false,
        }
    }
}

/// Entry name for a namespace path: separators stripped from both ends.
pub fn entry_name(path: &str) -> &str {
    path.trim_matches('/')
}

/// Classify `path` as root, explicit entry, synthetic directory or missing.
///
/// An explicit entry wins over a synthetic directory of the same name.
pub fn resolve<R: ArchiveReader + ?Sized>(
    catalog: &EntryCatalog,
    reader: &mut R,
    path: &str,
) -> Result<ResolvedPath> {
    let name = entry_name(path);
    if name.is_empty() {
        return Ok(ResolvedPath::Root);
    }

    if let Some(info) = reader.entry_by_name(name)? {
        debug!("Path '{}' is explicit entry {}", path, info.index);
        return Ok(ResolvedPath::Explicit(info));
    }

    if catalog.has_descendants(name) {
        debug!("Path '{}' is a synthetic directory", path);
        return Ok(ResolvedPath::Synthetic);
    }

    debug!("Path '{}' not found", path);
    Ok(ResolvedPath::NotFound)
}

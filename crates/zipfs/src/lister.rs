//! Direct-child listings reconstructed from the flat entry list.

use crate::attr::{DirEntry, FileAttributes};
use crate::catalog::EntryCatalog;
use crate::error::{Error, Result};
use crate::resolver::{self, ResolvedPath};
use log::{debug, trace};
use std::collections::HashSet;
use zipfs_archive::ArchiveReader;

/// Emit every direct child of the directory at `path` exactly once.
///
/// Children come out in catalog order. Entries nested deeper than one level
/// contribute their first component as an implied directory. The directory
/// check happens before anything is emitted.
pub fn list<R, F>(catalog: &EntryCatalog, reader: &mut R, path: &str, mut emit: F) -> Result<()>
where
    R: ArchiveReader + ?Sized,
    F: FnMut(DirEntry),
{
    let prefix = match resolver::resolve(catalog, reader, path)? {
        ResolvedPath::Root => String::new(),
        ResolvedPath::Explicit(info) if !info.is_dir => {
            debug!("Entry '{}' is not dir", path);
            return Err(Error::NotADirectory(path.to_string()));
        }
        ResolvedPath::Explicit(_) | ResolvedPath::Synthetic => {
            format!("{}/", resolver::entry_name(path))
        }
        ResolvedPath::NotFound => return Err(Error::NotFound(path.to_string())),
    };

    debug!("Dir name is resolved as '{}'", prefix);

    let mut seen: HashSet<&str> = HashSet::new();
    for entry in catalog.with_prefix(&prefix) {
        let local = &entry.name[prefix.len()..];

        match local.find('/') {
            None => {
                if local.is_empty() || !seen.insert(local) {
                    continue;
                }
                let info = match reader.entry_by_name(&entry.name)? {
                    Some(info) => info,
                    None => reader.entry_by_index(entry.index)?,
                };
                emit(DirEntry {
                    name: local.to_string(),
                    attributes: FileAttributes::from_entry(&info),
                });
            }
            Some(slash) => {
                let implied = &local[..slash];
                if implied.is_empty() || !seen.insert(implied) {
                    continue;
                }
                emit(DirEntry {
                    name: implied.to_string(),
                    attributes: FileAttributes::directory(),
                });
            }
        }
        trace!("Entry '{}' filled", local);
    }

    Ok(())
}

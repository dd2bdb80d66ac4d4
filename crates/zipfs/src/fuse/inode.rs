//! Path <-> inode mapping for the FUSE adapter.

use fuser::FUSE_ROOT_ID;
use std::collections::HashMap;

/// Assigns stable inode numbers to namespace paths.
///
/// The root is always [`FUSE_ROOT_ID`]; other paths get the next free number
/// the first time they are seen and keep it for the lifetime of the mount.
#[derive(Debug)]
pub struct InodeTable {
    inode_to_path: HashMap<u64, String>,
    path_to_inode: HashMap<String, u64>,
    next_inode: u64,
}

impl Default for InodeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeTable {
    /// Create a table containing only the root.
    pub fn new() -> Self {
        let mut inode_to_path = HashMap::new();
        let mut path_to_inode = HashMap::new();
        inode_to_path.insert(FUSE_ROOT_ID, "/".to_string());
        path_to_inode.insert("/".to_string(), FUSE_ROOT_ID);

        Self {
            inode_to_path,
            path_to_inode,
            next_inode: FUSE_ROOT_ID + 1,
        }
    }

    /// Path of a known inode.
    pub fn path(&self, inode: u64) -> Option<&str> {
        self.inode_to_path.get(&inode).map(String::as_str)
    }

    /// Inode of `path`, allocating one if needed.
    pub fn get_or_insert(&mut self, path: &str) -> u64 {
        if let Some(&inode) = self.path_to_inode.get(path) {
            return inode;
        }

        let inode = self.next_inode;
        self.next_inode += 1;
        self.inode_to_path.insert(inode, path.to_string());
        self.path_to_inode.insert(path.to_string(), inode);
        inode
    }

    /// Number of known inodes, root included.
    pub fn len(&self) -> usize {
        self.inode_to_path.len()
    }

    /// Whether no inode is known.
    pub fn is_empty(&self) -> bool {
        self.inode_to_path.is_empty()
    }
}

/// Path of `name` inside the directory `parent`.
pub(crate) fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Path of the directory containing `path`.
pub(crate) fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &path[..pos],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_preallocated() {
        let table = InodeTable::new();
        assert_eq!(table.path(FUSE_ROOT_ID), Some("/"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn inodes_are_stable_per_path() {
        let mut table = InodeTable::new();

        let a = table.get_or_insert("/a");
        let b = table.get_or_insert("/a/b");
        assert_ne!(a, b);
        assert_eq!(table.get_or_insert("/a"), a);
        assert_eq!(table.get_or_insert("/"), FUSE_ROOT_ID);
        assert_eq!(table.path(b), Some("/a/b"));
    }

    #[test]
    fn child_and_parent_paths() {
        assert_eq!(child_path("/", "a"), "/a");
        assert_eq!(child_path("/a", "b"), "/a/b");
        assert_eq!(parent_path("/a/b"), "/a");
        assert_eq!(parent_path("/a"), "/");
        assert_eq!(parent_path("/"), "/");
    }
}

use zipfs_archive::EntryInfo;

/// Permission bits reported for directories.
pub const DIR_PERM: u16 = 0o755;

/// Permission bits reported for regular files.
pub const FILE_PERM: u16 = 0o444;

/// Kind of a namespace node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file backed by an archive entry.
    File,
    /// Directory, explicit or synthesized.
    Directory,
}

/// Attributes of a namespace node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAttributes {
    /// File or directory.
    pub kind: EntryKind,
    /// Uncompressed size in bytes; always 0 for directories.
    pub size: u64,
    /// Permission bits.
    pub perm: u16,
}

impl FileAttributes {
    /// Attributes of a directory.
    pub fn directory() -> Self {
        Self {
            kind: EntryKind::Directory,
            size: 0,
            perm: DIR_PERM,
        }
    }

    /// Attributes of a regular file of `size` bytes.
    pub fn file(size: u64) -> Self {
        Self {
            kind: EntryKind::File,
            size,
            perm: FILE_PERM,
        }
    }

    /// Attributes of an archive entry.
    pub fn from_entry(info: &EntryInfo) -> Self {
        if info.is_dir {
            Self::directory()
        } else {
            Self::file(info.size)
        }
    }

    /// Whether this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A direct child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Child name (a single path component).
    pub name: String,
    /// Child attributes.
    pub attributes: FileAttributes,
}

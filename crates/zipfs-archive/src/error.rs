use thiserror::Error;

/// Errors that can occur when reading or writing zip archives.
#[derive(Debug, Error)]
pub enum Error {
    /// No entry with the given name exists in the archive.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// The entry index is past the end of the archive's entry list.
    #[error("entry index {index} out of range (archive has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The destination buffer does not match the entry's uncompressed size.
    #[error("entry {index} has {expected} bytes but the buffer holds {actual}")]
    SizeMismatch {
        index: usize,
        expected: u64,
        actual: usize,
    },

    /// A directory marker was asked for file contents.
    #[error("entry {0} is a directory")]
    IsDirectory(usize),

    /// Error from the zip library.
    #[error("zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for zipfs-archive operations.
pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

/// Errors surfaced by namespace operations.
///
/// Every variant maps to a POSIX errno through [`Error::errno`], which is
/// what protocol bindings hand back to the calling process.
#[derive(Debug, Error)]
pub enum Error {
    /// The path matches neither an entry nor a synthesized directory.
    #[error("no such file or directory: {0}")]
    NotFound(String),

    /// A listing was requested on a regular file.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Contents were requested from a directory.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// A non-read-only access mode was requested.
    #[error("permission denied: {0}")]
    AccessDenied(String),

    /// Invalid argument from the protocol layer (e.g. a negative offset).
    #[error("invalid argument: {0}")]
    InvalidInput(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error from the archive reader.
    #[error("archive error: {0}")]
    Archive(#[from] zipfs_archive::Error),

    /// I/O error, including buffer allocation failures.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// POSIX errno for this error.
    pub fn errno(&self) -> i32 {
        match self {
            Error::NotFound(_) => libc::ENOENT,
            Error::NotADirectory(_) => libc::ENOTDIR,
            Error::IsADirectory(_) => libc::EISDIR,
            Error::AccessDenied(_) => libc::EACCES,
            Error::InvalidInput(_) | Error::Config(_) => libc::EINVAL,
            Error::Io(e) if e.kind() == std::io::ErrorKind::OutOfMemory => libc::ENOMEM,
            Error::Archive(_) | Error::Io(_) => libc::EIO,
        }
    }
}

/// Result type for zipfs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_posix_codes() {
        assert_eq!(Error::NotFound("/x".into()).errno(), libc::ENOENT);
        assert_eq!(Error::NotADirectory("/x".into()).errno(), libc::ENOTDIR);
        assert_eq!(Error::IsADirectory("/x".into()).errno(), libc::EISDIR);
        assert_eq!(Error::AccessDenied("/x".into()).errno(), libc::EACCES);
        assert_eq!(Error::InvalidInput("offset".into()).errno(), libc::EINVAL);
    }

    #[test]
    fn allocation_failure_maps_to_enomem() {
        let oom = Error::Io(std::io::Error::new(std::io::ErrorKind::OutOfMemory, "realloc"));
        assert_eq!(oom.errno(), libc::ENOMEM);

        let other = Error::Io(std::io::Error::other("boom"));
        assert_eq!(other.errno(), libc::EIO);

        let archive = Error::Archive(zipfs_archive::Error::IsDirectory(3));
        assert_eq!(archive.errno(), libc::EIO);
    }
}

//! # zipfs
//!
//! Read-only filesystem view over zip archives.
//!
//! This crate provides:
//! - Path resolution against the archive's flat entry list, including
//!   directories that only exist because some entry lives below them
//! - Directory listings reconstructed from that list
//! - A single-slot cache so partial reads of one entry decompress it once
//! - **WebDAV server support** (with `webdav` feature)
//! - FUSE filesystem support (with `fuse` feature)
//!
//! ## Example
//!
//! ```ignore
//! use zipfs::{AccessMode, ReadTarget, ZipFs, ZipFsConfig};
//!
//! let fs = ZipFs::open_archive("site.zip", ZipFsConfig::default())?;
//!
//! for entry in fs.read_dir("/")? {
//!     println!("{} ({:?})", entry.name, entry.attributes.kind);
//! }
//!
//! let handle = fs.open("/index.html", AccessMode::ReadOnly)?;
//! let mut buf = [0u8; 4096];
//! let n = fs.read(ReadTarget::Handle(handle), 0, &mut buf)?;
//! ```
//!
//! ## FUSE Support
//!
//! ```ignore
//! use zipfs::fuse::mount;
//! use zipfs::{ZipFs, ZipFsConfig};
//!
//! let fs = ZipFs::open_archive("site.zip", ZipFsConfig::default())?;
//! mount(fs, "/mnt/site")?;
//! ```
//!
//! ## WebDAV Support
//!
//! ```ignore
//! use zipfs::webdav::serve;
//! use zipfs::{ZipFs, ZipFsConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let fs = ZipFs::open_archive("site.zip", ZipFsConfig::default()).unwrap();
//!     serve(fs, 4918).await
//! }
//! ```

mod attr;
mod cache;
mod catalog;
mod config;
mod error;
mod fs;
mod lister;
mod resolver;

#[cfg(test)]
mod testing;

#[cfg(feature = "webdav")]
pub mod webdav;

#[cfg(feature = "fuse")]
pub mod fuse;

pub use attr::{DirEntry, EntryKind, FileAttributes, DIR_PERM, FILE_PERM};
pub use cache::ReadCache;
pub use catalog::{CatalogEntry, EntryCatalog};
pub use config::{ZipFsConfig, DEFAULT_MAX_ENTRIES, DEFAULT_MIN_BUF_SIZE};
pub use error::{Error, Result};
pub use fs::{AccessMode, EntryHandle, ReadTarget, ZipFs};
pub use resolver::{entry_name, resolve, ResolvedPath};

// Re-export archive types for convenience
pub use zipfs_archive::{ArchiveReader, EntryInfo, ZipArchiveReader};

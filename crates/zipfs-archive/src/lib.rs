//! # zipfs-archive
//!
//! Archive access layer for zipfs.
//!
//! This crate provides:
//! - The [`ArchiveReader`] trait: a single-cursor view over an archive's
//!   entries (lookup by name or index, full decompression of one entry)
//! - [`ZipArchiveReader`], the zip-backed implementation
//! - [`ArchiveBuilder`] for writing zip archives
//!
//! ## Example
//!
//! ```ignore
//! use zipfs_archive::{ArchiveBuilder, ArchiveReader, ZipArchiveReader};
//!
//! ArchiveBuilder::new()
//!     .with_file("a.txt", b"hello")
//!     .with_file("dir/b.txt", b"world")
//!     .write_to("sample.zip")?;
//!
//! let mut reader = ZipArchiveReader::open("sample.zip")?;
//! let entry = reader.entry_by_name("dir/b.txt")?.unwrap();
//! let mut buf = vec![0u8; entry.size as usize];
//! reader.read_entry(entry.index, &mut buf)?;
//! ```

mod builder;
mod error;
mod reader;

pub use builder::ArchiveBuilder;
pub use error::{Error, Result};
pub use reader::{ArchiveReader, EntryInfo, ZipArchiveReader};

// Re-export for builders picking a compression method
pub use zip::CompressionMethod;

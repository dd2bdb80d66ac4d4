//! WebDAV server adapter for zip archives.
//!
//! Exposes a [`ZipFs`](crate::ZipFs) as a read-only WebDAV share that can be
//! mounted from Finder, Windows Explorer, or any WebDAV client without a
//! kernel extension.
//!
//! # Example
//!
//! ```ignore
//! use zipfs::webdav::serve;
//! use zipfs::{ZipFs, ZipFsConfig};
//!
//! let fs = ZipFs::open_archive("example.zip", ZipFsConfig::default())?;
//!
//! // Start WebDAV server on port 4918
//! serve(fs, 4918).await?;
//! ```

mod filesystem;
mod server;

pub use filesystem::ZipDavFs;
pub use server::{serve, serve_background, ZipWebDavServer};

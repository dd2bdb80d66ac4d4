//! FUSE binding for zipfs.
//!
//! Mounts a [`ZipFs`](crate::ZipFs) as a read-only filesystem. FUSE speaks
//! in inode numbers while zipfs resolves paths, so the adapter keeps an
//! inode table that assigns a number to every path the kernel has seen.
//!
//! # Example
//!
//! ```ignore
//! use zipfs::fuse::mount;
//! use zipfs::{ZipFs, ZipFsConfig};
//!
//! let fs = ZipFs::open_archive("example.zip", ZipFsConfig::default())?;
//! mount(fs, "/mnt/example")?;
//! ```

mod adapter;
mod inode;

pub use adapter::*;
pub use inode::InodeTable;

//! FUSE adapter implementation for zip archives.
//!
//! This module implements the `fuser::Filesystem` trait for `ZipFuseFs`,
//! translating inode-based kernel requests into path-based [`ZipFs`] calls.

use super::inode::{child_path, parent_path, InodeTable};
use crate::attr::{EntryKind, FileAttributes};
use crate::error::Error;
use crate::fs::{AccessMode, EntryHandle, ReadTarget, ZipFs};
use fuser::{
    FileAttr, FileType, Filesystem, KernelConfig, MountOption, ReplyAttr, ReplyData,
    ReplyDirectory, ReplyEntry, ReplyOpen, Request,
};
use libc::{c_int, ENOENT};
use log::{debug, error, trace, warn};
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};
use zipfs_archive::ArchiveReader;

/// Time-to-live for cached attributes. The archive never changes.
const TTL: Duration = Duration::from_secs(60);

/// Block size for filesystem statistics.
const BLOCK_SIZE: u32 = 512;

/// FUSE filesystem adapter for zip archives.
pub struct ZipFuseFs<R: ArchiveReader = zipfs_archive::ZipArchiveReader> {
    /// The path-based filesystem.
    fs: ZipFs<R>,
    /// Inode numbers handed out to the kernel.
    inodes: InodeTable,
    /// User ID for file ownership (defaults to current user).
    uid: u32,
    /// Group ID for file ownership (defaults to current group).
    gid: u32,
    /// Creation time of the filesystem.
    mount_time: SystemTime,
}

impl<R: ArchiveReader> ZipFuseFs<R> {
    /// Wrap a [`ZipFs`] for mounting.
    pub fn new(fs: ZipFs<R>) -> Self {
        // Get current user/group IDs
        let uid = unsafe { libc::getuid() };
        let gid = unsafe { libc::getgid() };

        Self {
            fs,
            inodes: InodeTable::new(),
            uid,
            gid,
            mount_time: SystemTime::now(),
        }
    }

    /// Get the number of indexed archive entries.
    pub fn entry_count(&self) -> usize {
        self.fs.catalog().len()
    }

    /// Build the FUSE attributes of a node.
    fn file_attr(&self, ino: u64, attributes: &FileAttributes) -> FileAttr {
        let (kind, nlink) = match attributes.kind {
            EntryKind::Directory => (FileType::Directory, 2),
            EntryKind::File => (FileType::RegularFile, 1),
        };

        FileAttr {
            ino,
            size: attributes.size,
            blocks: attributes.size.div_ceil(BLOCK_SIZE as u64),
            atime: self.mount_time,
            mtime: self.mount_time,
            ctime: self.mount_time,
            crtime: self.mount_time,
            kind,
            perm: attributes.perm,
            nlink,
            uid: self.uid,
            gid: self.gid,
            rdev: 0,
            blksize: BLOCK_SIZE,
            flags: 0,
        }
    }

    fn kind_of(attributes: &FileAttributes) -> FileType {
        match attributes.kind {
            EntryKind::Directory => FileType::Directory,
            EntryKind::File => FileType::RegularFile,
        }
    }
}

impl<R: ArchiveReader + 'static> Filesystem for ZipFuseFs<R> {
    fn init(&mut self, _req: &Request, _config: &mut KernelConfig) -> Result<(), c_int> {
        debug!("zipfs has initialized ({} entries)", self.entry_count());
        Ok(())
    }

    fn destroy(&mut self) {
        debug!("zipfs is being unmounted");
    }

    /// Look up a directory entry by name.
    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        let name_str = name.to_string_lossy();
        trace!("lookup(parent={}, name='{}')", parent, name_str);

        let path = match self.inodes.path(parent) {
            Some(dir) => child_path(dir, &name_str),
            None => {
                debug!("lookup: parent {} is unknown", parent);
                reply.error(ENOENT);
                return;
            }
        };

        match self.fs.get_attributes(&path) {
            Ok(attributes) => {
                let ino = self.inodes.get_or_insert(&path);
                reply.entry(&TTL, &self.file_attr(ino, &attributes), 0);
            }
            Err(e) => {
                debug!("lookup: '{}': {}", path, e);
                reply.error(e.errno());
            }
        }
    }

    /// Get file attributes.
    fn getattr(&mut self, _req: &Request, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        trace!("getattr(ino={})", ino);

        let Some(path) = self.inodes.path(ino) else {
            warn!("getattr: inode {} not found", ino);
            reply.error(ENOENT);
            return;
        };

        match self.fs.get_attributes(path) {
            Ok(attributes) => reply.attr(&TTL, &self.file_attr(ino, &attributes)),
            Err(e) => reply.error(e.errno()),
        }
    }

    /// Open a file.
    fn open(&mut self, _req: &Request, ino: u64, flags: i32, reply: ReplyOpen) {
        trace!("open(ino={}, flags={:#o})", ino, flags);

        let Some(path) = self.inodes.path(ino) else {
            reply.error(ENOENT);
            return;
        };

        match self.fs.open(path, AccessMode::from_flags(flags)) {
            Ok(handle) => reply.opened(handle.index() as u64, 0),
            Err(e) => {
                debug!("open: '{}': {}", path, e);
                reply.error(e.errno());
            }
        }
    }

    /// Read file data through the decompression cache.
    fn read(
        &mut self,
        _req: &Request,
        ino: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        trace!("read(ino={}, fh={}, offset={}, size={})", ino, fh, offset, size);

        if offset < 0 {
            let err = Error::InvalidInput(format!("negative offset {}", offset));
            warn!("read: {}", err);
            reply.error(err.errno());
            return;
        }

        let mut buffer = vec![0u8; size as usize];
        let handle = EntryHandle(fh as usize);
        match self.fs.read(ReadTarget::Handle(handle), offset as u64, &mut buffer) {
            Ok(n) => reply.data(&buffer[..n]),
            Err(e) => {
                error!("read: error reading entry {}: {}", fh, e);
                reply.error(e.errno());
            }
        }
    }

    /// Read directory entries.
    fn readdir(
        &mut self,
        _req: &Request,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        trace!("readdir(ino={}, offset={})", ino, offset);

        let Some(path) = self.inodes.path(ino).map(str::to_string) else {
            reply.error(ENOENT);
            return;
        };

        let children = match self.fs.read_dir(&path) {
            Ok(children) => children,
            Err(e) => {
                warn!("readdir: '{}': {}", path, e);
                reply.error(e.errno());
                return;
            }
        };

        let parent_ino = self.inodes.get_or_insert(parent_path(&path));
        let mut entries: Vec<(u64, FileType, String)> = vec![
            (ino, FileType::Directory, ".".to_string()),
            (parent_ino, FileType::Directory, "..".to_string()),
        ];
        for child in children {
            let child_ino = self.inodes.get_or_insert(&child_path(&path, &child.name));
            entries.push((child_ino, Self::kind_of(&child.attributes), child.name));
        }

        // Skip to offset and add entries until buffer is full
        for (i, (ino, kind, name)) in entries.into_iter().enumerate().skip(offset as usize) {
            if reply.add(ino, (i + 1) as i64, kind, name) {
                break;
            }
        }

        reply.ok();
    }

    /// Get filesystem statistics.
    fn statfs(&mut self, _req: &Request, _ino: u64, reply: fuser::ReplyStatfs) {
        trace!("statfs");

        let files = self.entry_count() as u64 + 1; // +1 for root
        reply.statfs(0, 0, 0, files, 0, BLOCK_SIZE, 255, BLOCK_SIZE);
    }
}

fn mount_options() -> Vec<MountOption> {
    vec![
        MountOption::RO,
        MountOption::FSName("zipfs".to_string()),
        MountOption::Subtype("zip".to_string()),
        MountOption::DefaultPermissions,
    ]
}

/// Mount a [`ZipFs`] with FUSE.
///
/// This function blocks until the filesystem is unmounted.
///
/// # Errors
///
/// Returns an error if the mount point is invalid or FUSE mounting fails.
pub fn mount<R, P>(fs: ZipFs<R>, mount_point: P) -> io::Result<()>
where
    R: ArchiveReader + 'static,
    P: AsRef<Path>,
{
    let fuse_fs = ZipFuseFs::new(fs);
    let mount_point = mount_point.as_ref();

    debug!(
        "Mounting at {} with {} entries",
        mount_point.display(),
        fuse_fs.entry_count()
    );

    fuser::mount2(fuse_fs, mount_point, &mount_options())
        .map_err(|e| io::Error::other(format!("FUSE mount failed: {}", e)))
}

/// Mount a [`ZipFs`] in the background and return a session handle.
///
/// The filesystem stays mounted until the returned `BackgroundSession` is
/// dropped.
pub fn mount_background<R, P>(fs: ZipFs<R>, mount_point: P) -> io::Result<fuser::BackgroundSession>
where
    R: ArchiveReader + 'static,
    P: AsRef<Path>,
{
    let fuse_fs = ZipFuseFs::new(fs);
    let mount_point = mount_point.as_ref();

    debug!(
        "Mounting at {} (background) with {} entries",
        mount_point.display(),
        fuse_fs.entry_count()
    );

    fuser::spawn_mount2(fuse_fs, mount_point, &mount_options())
        .map_err(|e| io::Error::other(format!("FUSE mount failed: {}", e)))
}

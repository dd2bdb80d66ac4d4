//! WebDAV filesystem implementation for zip archives.
//!
//! This module implements the `dav_server::fs::DavFileSystem` trait on top
//! of [`ZipFs`], exposing the archive as a read-only WebDAV collection tree.

use crate::attr::{DirEntry, FileAttributes};
use crate::error::Error;
use crate::fs::{AccessMode, EntryHandle, ReadTarget, ZipFs};
use dav_server::davpath::DavPath;
use dav_server::fs::{
    DavDirEntry, DavFile, DavFileSystem, DavMetaData, FsError, FsFuture, FsStream, OpenOptions,
    ReadDirMeta,
};
use futures::stream;
use log::{debug, trace};
use std::fmt;
use std::io::SeekFrom;
use std::sync::Arc;
use std::time::SystemTime;
use zipfs_archive::{ArchiveReader, ZipArchiveReader};

/// WebDAV filesystem adapter for zip archives.
pub struct ZipDavFs<R: ArchiveReader = ZipArchiveReader> {
    inner: Arc<ZipDavFsInner<R>>,
}

struct ZipDavFsInner<R: ArchiveReader> {
    /// Path-based filesystem.
    fs: ZipFs<R>,
    /// Creation time for metadata.
    created: SystemTime,
}

impl<R: ArchiveReader> Clone for ZipDavFs<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: ArchiveReader> ZipDavFs<R> {
    /// Create a new WebDAV filesystem over a [`ZipFs`].
    pub fn new(fs: ZipFs<R>) -> Self {
        Self {
            inner: Arc::new(ZipDavFsInner {
                fs,
                created: SystemTime::now(),
            }),
        }
    }
}

/// Namespace path (`/a/b`) for a WebDAV path.
pub(crate) fn namespace_path(path: &DavPath) -> String {
    let rel = path.as_rel_ospath().to_string_lossy();
    format!("/{}", rel.trim_matches('/'))
}

/// WebDAV status for a zipfs error.
pub(crate) fn to_fs_error(err: &Error) -> FsError {
    match err {
        Error::NotFound(_) => FsError::NotFound,
        Error::NotADirectory(_) | Error::IsADirectory(_) | Error::AccessDenied(_) => {
            FsError::Forbidden
        }
        Error::InvalidInput(_)
        | Error::Config(_)
        | Error::Archive(_)
        | Error::Io(_) => FsError::GeneralFailure,
    }
}

impl<R: ArchiveReader + 'static> DavFileSystem for ZipDavFs<R> {
    fn open<'a>(&'a self, path: &'a DavPath, options: OpenOptions) -> FsFuture<'a, Box<dyn DavFile>> {
        trace!("open({:?}, {:?})", path, options);

        let result = (|| {
            let path = namespace_path(path);
            let mode = if options.write || options.create || options.create_new || options.truncate {
                AccessMode::WriteOnly
            } else {
                AccessMode::ReadOnly
            };

            let handle = self.inner.fs.open(&path, mode).map_err(|e| to_fs_error(&e))?;
            let attributes = self
                .inner
                .fs
                .get_attributes(&path)
                .map_err(|e| to_fs_error(&e))?;

            Ok(Box::new(ZipDavFile {
                inner: Arc::clone(&self.inner),
                handle,
                size: attributes.size,
                position: 0,
            }) as Box<dyn DavFile>)
        })();

        Box::pin(async move { result })
    }

    fn read_dir<'a>(
        &'a self,
        path: &'a DavPath,
        meta: ReadDirMeta,
    ) -> FsFuture<'a, FsStream<Box<dyn DavDirEntry>>> {
        trace!("read_dir({:?}, {:?})", path, meta);

        let result = (|| {
            let children = self
                .inner
                .fs
                .read_dir(&namespace_path(path))
                .map_err(|e| to_fs_error(&e))?;

            debug!("read_dir: returning {} entries", children.len());

            let created = self.inner.created;
            let entries: Vec<Box<dyn DavDirEntry>> = children
                .into_iter()
                .map(|entry| Box::new(ZipDavDirEntry { entry, created }) as Box<dyn DavDirEntry>)
                .collect();

            let stream = stream::iter(entries.into_iter().map(Ok));
            Ok(Box::pin(stream) as FsStream<Box<dyn DavDirEntry>>)
        })();

        Box::pin(async move { result })
    }

    fn metadata<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, Box<dyn DavMetaData>> {
        trace!("metadata({:?})", path);

        let result = self
            .inner
            .fs
            .get_attributes(&namespace_path(path))
            .map(|attributes| {
                Box::new(ZipDavMetaData::new(&attributes, self.inner.created)) as Box<dyn DavMetaData>
            })
            .map_err(|e| to_fs_error(&e));

        Box::pin(async move { result })
    }
}

/// Open WebDAV file; reads go through the shared decompression cache.
struct ZipDavFile<R: ArchiveReader> {
    inner: Arc<ZipDavFsInner<R>>,
    handle: EntryHandle,
    size: u64,
    /// Current read position within the entry.
    position: u64,
}

impl<R: ArchiveReader> fmt::Debug for ZipDavFile<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipDavFile")
            .field("handle", &self.handle)
            .field("size", &self.size)
            .field("position", &self.position)
            .finish()
    }
}

impl<R: ArchiveReader + 'static> DavFile for ZipDavFile<R> {
    fn metadata(&mut self) -> FsFuture<'_, Box<dyn DavMetaData>> {
        let meta = ZipDavMetaData::new(&FileAttributes::file(self.size), self.inner.created);
        Box::pin(async move { Ok(Box::new(meta) as Box<dyn DavMetaData>) })
    }

    fn read_bytes(&mut self, count: usize) -> FsFuture<'_, bytes::Bytes> {
        let remaining = self.size.saturating_sub(self.position);
        let to_read = std::cmp::min(count as u64, remaining) as usize;

        if to_read == 0 {
            return Box::pin(async move { Ok(bytes::Bytes::new()) });
        }

        let mut buffer = vec![0u8; to_read];
        let result = self
            .inner
            .fs
            .read(ReadTarget::Handle(self.handle), self.position, &mut buffer);

        if let Ok(n) = result {
            self.position += n as u64;
        }

        Box::pin(async move {
            let n = result.map_err(|e| to_fs_error(&e))?;
            buffer.truncate(n);
            Ok(bytes::Bytes::from(buffer))
        })
    }

    fn seek(&mut self, pos: SeekFrom) -> FsFuture<'_, u64> {
        let new_pos = match pos {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::End(n) => self.size as i64 + n,
            SeekFrom::Current(n) => self.position as i64 + n,
        };

        if new_pos < 0 {
            return Box::pin(async { Err(FsError::GeneralFailure) });
        }

        self.position = new_pos as u64;
        let pos = self.position;
        Box::pin(async move { Ok(pos) })
    }

    fn write_buf(&mut self, _buf: Box<dyn bytes::Buf + Send>) -> FsFuture<'_, ()> {
        Box::pin(async { Err(FsError::Forbidden) })
    }

    fn write_bytes(&mut self, _buf: bytes::Bytes) -> FsFuture<'_, ()> {
        Box::pin(async { Err(FsError::Forbidden) })
    }

    fn flush(&mut self) -> FsFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// WebDAV directory entry.
struct ZipDavDirEntry {
    entry: DirEntry,
    created: SystemTime,
}

impl DavDirEntry for ZipDavDirEntry {
    fn name(&self) -> Vec<u8> {
        self.entry.name.as_bytes().to_vec()
    }

    fn metadata(&self) -> FsFuture<'_, Box<dyn DavMetaData>> {
        let meta = ZipDavMetaData::new(&self.entry.attributes, self.created);
        Box::pin(async move { Ok(Box::new(meta) as Box<dyn DavMetaData>) })
    }
}

/// WebDAV metadata for files and directories.
#[derive(Clone, Debug)]
struct ZipDavMetaData {
    is_dir: bool,
    len: u64,
    time: SystemTime,
}

impl ZipDavMetaData {
    fn new(attributes: &FileAttributes, time: SystemTime) -> Self {
        Self {
            is_dir: attributes.is_dir(),
            len: attributes.size,
            time,
        }
    }
}

impl DavMetaData for ZipDavMetaData {
    fn len(&self) -> u64 {
        self.len
    }

    fn modified(&self) -> Result<SystemTime, FsError> {
        Ok(self.time)
    }

    fn is_dir(&self) -> bool {
        self.is_dir
    }

    fn created(&self) -> Result<SystemTime, FsError> {
        Ok(self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_dav_statuses() {
        assert!(matches!(to_fs_error(&Error::NotFound("/x".into())), FsError::NotFound));
        assert!(matches!(to_fs_error(&Error::IsADirectory("/x".into())), FsError::Forbidden));
        assert!(matches!(to_fs_error(&Error::AccessDenied("/x".into())), FsError::Forbidden));
        assert!(matches!(
            to_fs_error(&Error::Io(std::io::Error::other("boom"))),
            FsError::GeneralFailure
        ));
    }

    #[test]
    fn dav_paths_map_to_namespace_paths() {
        let root = DavPath::new("/").unwrap();
        assert_eq!(namespace_path(&root), "/");

        let nested = DavPath::new("/dir/b.txt").unwrap();
        assert_eq!(namespace_path(&nested), "/dir/b.txt");

        let collection = DavPath::new("/dir/").unwrap();
        assert_eq!(namespace_path(&collection), "/dir");
    }
}

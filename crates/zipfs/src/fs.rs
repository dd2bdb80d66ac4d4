use crate::attr::{DirEntry, FileAttributes};
use crate::cache::ReadCache;
use crate::catalog::EntryCatalog;
use crate::config::ZipFsConfig;
use crate::error::{Error, Result};
use crate::lister;
use crate::resolver::{self, ResolvedPath};
use log::{debug, info, trace};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use zipfs_archive::{ArchiveReader, Error as ArchiveError, ZipArchiveReader};

/// Access mode requested when opening a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    /// Decode the `O_ACCMODE` bits of POSIX open flags.
    pub fn from_flags(flags: i32) -> Self {
        match flags & libc::O_ACCMODE {
            libc::O_RDONLY => AccessMode::ReadOnly,
            libc::O_WRONLY => AccessMode::WriteOnly,
            _ => AccessMode::ReadWrite,
        }
    }
}

/// Identity of an opened file, valid for the lifetime of the mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(pub usize);

impl EntryHandle {
    /// Archive index of the entry.
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a read addresses: a previously opened handle or a bare path.
#[derive(Debug, Clone, Copy)]
pub enum ReadTarget<'a> {
    Handle(EntryHandle),
    Path(&'a str),
}

/// State shared by all operations: the archive cursor and the cache slot.
struct Shared<R> {
    reader: R,
    cache: ReadCache,
}

/// Read-only filesystem view over an archive.
///
/// Every operation body runs under one lock that owns both the archive
/// reader and the read cache, so operations are totally serialized.
pub struct ZipFs<R: ArchiveReader = ZipArchiveReader> {
    catalog: EntryCatalog,
    config: ZipFsConfig,
    shared: Mutex<Shared<R>>,
}

impl ZipFs<ZipArchiveReader> {
    /// Open the zip archive at `path` and index its entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the archive cannot
    /// be opened, or its entries cannot be enumerated.
    pub fn open_archive<P: AsRef<Path>>(path: P, config: ZipFsConfig) -> Result<Self> {
        info!("Opening archive: {}", path.as_ref().display());
        let reader = ZipArchiveReader::open(path)?;
        Self::new(reader, config)
    }
}

impl<R: ArchiveReader> ZipFs<R> {
    /// Build the filesystem over an already opened reader.
    pub fn new(mut reader: R, config: ZipFsConfig) -> Result<Self> {
        config.validate()?;
        let catalog = EntryCatalog::build(&mut reader, config.max_entries)?;
        debug!(
            "Catalog built with {} entries (min buffer {} bytes)",
            catalog.len(),
            config.min_buf_size
        );

        let cache = ReadCache::new(config.min_buf_size);
        Ok(Self {
            catalog,
            config,
            shared: Mutex::new(Shared { reader, cache }),
        })
    }

    /// The entry catalog.
    pub fn catalog(&self) -> &EntryCatalog {
        &self.catalog
    }

    /// The configuration this filesystem was built with.
    pub fn config(&self) -> &ZipFsConfig {
        &self.config
    }

    /// Number of entry decompressions performed by the read cache.
    pub fn cache_loads(&self) -> Result<u64> {
        Ok(self.lock()?.cache.loads())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Shared<R>>> {
        self.shared
            .lock()
            .map_err(|_| Error::Io(std::io::Error::other("archive lock poisoned")))
    }

    /// Get the attributes of the node at `path`.
    pub fn get_attributes(&self, path: &str) -> Result<FileAttributes> {
        trace!("getattr(path='{}')", path);
        let mut shared = self.lock()?;

        match resolver::resolve(&self.catalog, &mut shared.reader, path)? {
            ResolvedPath::Root | ResolvedPath::Synthetic => Ok(FileAttributes::directory()),
            ResolvedPath::Explicit(info) => Ok(FileAttributes::from_entry(&info)),
            ResolvedPath::NotFound => Err(Error::NotFound(path.to_string())),
        }
    }

    /// Open the regular file at `path` for reading.
    pub fn open(&self, path: &str, mode: AccessMode) -> Result<EntryHandle> {
        trace!("open(path='{}', mode={:?})", path, mode);
        let mut shared = self.lock()?;

        let info = match resolver::resolve(&self.catalog, &mut shared.reader, path)? {
            ResolvedPath::Explicit(info) if !info.is_dir => info,
            ResolvedPath::NotFound => return Err(Error::NotFound(path.to_string())),
            _ => {
                debug!("Entry '{}' is dir", path);
                return Err(Error::IsADirectory(path.to_string()));
            }
        };

        if mode != AccessMode::ReadOnly {
            debug!("Access mode is not read-only");
            return Err(Error::AccessDenied(path.to_string()));
        }

        debug!("Entry index is {}", info.index);
        Ok(EntryHandle(info.index))
    }

    /// Read up to `out.len()` bytes at `offset` from a file.
    ///
    /// Returns the number of bytes copied; 0 means end of file.
    pub fn read(&self, target: ReadTarget<'_>, offset: u64, out: &mut [u8]) -> Result<usize> {
        trace!("read(target={:?}, offset={}, size={})", target, offset, out.len());
        let mut shared = self.lock()?;
        let Shared { reader, cache } = &mut *shared;

        let info = match target {
            ReadTarget::Handle(handle) => match reader.entry_by_index(handle.index()) {
                Ok(info) => info,
                Err(ArchiveError::IndexOutOfRange { .. }) => {
                    return Err(Error::NotFound(format!("handle {}", handle.index())))
                }
                Err(e) => return Err(e.into()),
            },
            ReadTarget::Path(path) => match resolver::resolve(&self.catalog, reader, path)? {
                ResolvedPath::Explicit(info) => info,
                ResolvedPath::NotFound => return Err(Error::NotFound(path.to_string())),
                ResolvedPath::Root | ResolvedPath::Synthetic => {
                    return Err(Error::IsADirectory(path.to_string()))
                }
            },
        };

        if info.is_dir {
            return Err(Error::IsADirectory(info.name));
        }

        cache.read(reader, info.index, info.size, offset, out)
    }

    /// Call `emit` once for every direct child of the directory at `path`.
    pub fn list_directory<F: FnMut(DirEntry)>(&self, path: &str, emit: F) -> Result<()> {
        trace!("readdir(path='{}')", path);
        let mut shared = self.lock()?;
        lister::list(&self.catalog, &mut shared.reader, path, emit)
    }

    /// Collect the direct children of the directory at `path`.
    pub fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
        let mut children = Vec::new();
        self.list_directory(path, |entry| children.push(entry))?;
        Ok(children)
    }
}

impl<R: ArchiveReader> Drop for ZipFs<R> {
    fn drop(&mut self) {
        debug!("zipfs has been destroyed");
    }
}

use crate::error::{Error, Result};
use log::trace;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// Metadata of a single archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Position of the entry in the archive's native order.
    pub index: usize,
    /// Slash-separated name relative to the archive root, without leading
    /// or trailing `/`.
    pub name: String,
    /// Whether the entry is an explicit directory marker.
    pub is_dir: bool,
    /// Uncompressed size in bytes (always 0 for directories).
    pub size: u64,
}

/// Random access to the entries of an archive.
///
/// Implementations keep a single cursor into the archive, so every method
/// takes `&mut self`; callers sharing a reader across threads must wrap it in
/// a lock.
pub trait ArchiveReader: Send {
    /// Number of entries in the archive.
    fn total_entries(&self) -> usize;

    /// Describe the entry at `index`.
    fn entry_by_index(&mut self, index: usize) -> Result<EntryInfo>;

    /// Describe the entry named `name`, if any.
    ///
    /// Names are compared without leading or trailing `/`. When a file and a
    /// directory marker share a name, the file is returned.
    fn entry_by_name(&mut self, name: &str) -> Result<Option<EntryInfo>>;

    /// Decompress the whole entry at `index` into `buf`.
    ///
    /// `buf` must be exactly as long as the entry's uncompressed size.
    fn read_entry(&mut self, index: usize, buf: &mut [u8]) -> Result<()>;
}

/// [`ArchiveReader`] backed by a zip file.
#[derive(Debug)]
pub struct ZipArchiveReader<R: Read + Seek = File> {
    archive: zip::ZipArchive<R>,
    names: HashMap<String, usize>,
    path: Option<PathBuf>,
}

/// Archive name with surrounding separators removed.
fn normalize(name: &str) -> &str {
    name.trim_matches('/')
}

impl ZipArchiveReader<File> {
    /// Open the zip archive at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = Self::new(file)?;
        reader.path = Some(path.to_path_buf());
        Ok(reader)
    }
}

impl<R: Read + Seek> ZipArchiveReader<R> {
    /// Wrap any seekable source holding a zip archive.
    pub fn new(source: R) -> Result<Self> {
        let archive = zip::ZipArchive::new(source)?;
        let names = index_names(&archive);
        Ok(Self {
            archive,
            names,
            path: None,
        })
    }

    /// Path of the archive on disk, when opened through [`ZipArchiveReader::open`].
    pub fn archive_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let len = self.archive.len();
        if index >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        Ok(())
    }
}

/// Map every normalized entry name to the index `entry_by_name` returns.
fn index_names<R: Read + Seek>(archive: &zip::ZipArchive<R>) -> HashMap<String, usize> {
    let mut names: HashMap<String, (usize, bool)> = HashMap::with_capacity(archive.len());
    for index in 0..archive.len() {
        let Some(raw) = archive.name_for_index(index) else {
            continue;
        };
        let name = normalize(raw);
        if name.is_empty() {
            continue;
        }
        let is_dir = raw.ends_with('/');
        match names.entry(name.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert((index, is_dir));
            }
            // A file shadows a directory marker of the same name.
            Entry::Occupied(mut slot) => {
                if slot.get().1 && !is_dir {
                    slot.insert((index, is_dir));
                }
            }
        }
    }
    names
        .into_iter()
        .map(|(name, (index, _))| (name, index))
        .collect()
}

impl<R: Read + Seek + Send> ArchiveReader for ZipArchiveReader<R> {
    fn total_entries(&self) -> usize {
        self.archive.len()
    }

    fn entry_by_index(&mut self, index: usize) -> Result<EntryInfo> {
        self.check_index(index)?;
        let file = self.archive.by_index(index)?;
        let is_dir = file.is_dir();

        Ok(EntryInfo {
            index,
            name: normalize(file.name()).to_string(),
            is_dir,
            size: if is_dir { 0 } else { file.size() },
        })
    }

    fn entry_by_name(&mut self, name: &str) -> Result<Option<EntryInfo>> {
        match self.names.get(normalize(name)).copied() {
            Some(index) => self.entry_by_index(index).map(Some),
            None => {
                trace!("entry '{}' not in archive", name);
                Ok(None)
            }
        }
    }

    fn read_entry(&mut self, index: usize, buf: &mut [u8]) -> Result<()> {
        self.check_index(index)?;
        let mut file = self.archive.by_index(index)?;

        if file.is_dir() {
            return Err(Error::IsDirectory(index));
        }

        let expected = file.size();
        if expected != buf.len() as u64 {
            return Err(Error::SizeMismatch {
                index,
                expected,
                actual: buf.len(),
            });
        }

        file.read_exact(buf)?;
        trace!("decompressed entry {} ({} bytes)", index, expected);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::{write::FileOptions, ZipWriter};

    fn in_memory_zip() -> Cursor<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.add_directory("docs/", options).unwrap();
        zip.start_file("docs/readme.md", options).unwrap();
        zip.write_all(b"# readme").unwrap();
        zip.start_file("top.txt", options).unwrap();
        zip.write_all(b"top level").unwrap();

        let mut cursor = zip.finish().unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn directory_markers_drop_trailing_slash() {
        let mut reader = ZipArchiveReader::new(in_memory_zip()).unwrap();
        let entry = reader.entry_by_index(0).unwrap();

        assert_eq!(entry.name, "docs");
        assert!(entry.is_dir);
        assert_eq!(entry.size, 0);
    }

    #[test]
    fn lookup_by_name_matches_directories_without_slash() {
        let mut reader = ZipArchiveReader::new(in_memory_zip()).unwrap();

        let dir = reader.entry_by_name("docs").unwrap().unwrap();
        assert!(dir.is_dir);
        assert_eq!(dir.index, 0);

        let file = reader.entry_by_name("docs/readme.md").unwrap().unwrap();
        assert!(!file.is_dir);
        assert_eq!(file.size, 8);

        assert!(reader.entry_by_name("doc").unwrap().is_none());
        assert!(reader.entry_by_name("").unwrap().is_none());
    }

    #[test]
    fn rooted_names_are_normalized_for_lookup() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file("/abs/f.txt", options).unwrap();
        zip.write_all(b"rooted").unwrap();
        let mut cursor = zip.finish().unwrap();
        cursor.set_position(0);

        let mut reader = ZipArchiveReader::new(cursor).unwrap();
        assert_eq!(reader.entry_by_index(0).unwrap().name, "abs/f.txt");

        let entry = reader.entry_by_name("abs/f.txt").unwrap().unwrap();
        assert_eq!(entry.index, 0);
        assert_eq!(entry.size, 6);
        assert_eq!(reader.entry_by_name("/abs/f.txt").unwrap().unwrap().index, 0);
    }

    #[test]
    fn file_shadows_directory_marker_with_same_name() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options: FileOptions<()> =
            FileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.add_directory("x/", options).unwrap();
        zip.start_file("x", options).unwrap();
        zip.write_all(b"file").unwrap();
        let mut cursor = zip.finish().unwrap();
        cursor.set_position(0);

        let mut reader = ZipArchiveReader::new(cursor).unwrap();
        let entry = reader.entry_by_name("x").unwrap().unwrap();
        assert_eq!(entry.index, 1);
        assert!(!entry.is_dir);
        assert_eq!(entry.size, 4);
    }

    #[test]
    fn read_entry_decompresses_into_exact_buffer() {
        let mut reader = ZipArchiveReader::new(in_memory_zip()).unwrap();
        let mut buf = vec![0u8; 9];

        reader.read_entry(2, &mut buf).unwrap();
        assert_eq!(&buf, b"top level");
    }

    #[test]
    fn read_entry_rejects_wrong_buffer_size() {
        let mut reader = ZipArchiveReader::new(in_memory_zip()).unwrap();
        let mut buf = vec![0u8; 4];

        let err = reader.read_entry(2, &mut buf).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { expected: 9, .. }));
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let mut reader = ZipArchiveReader::new(in_memory_zip()).unwrap();

        let err = reader.entry_by_index(3).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfRange { index: 3, len: 3 }));
    }
}

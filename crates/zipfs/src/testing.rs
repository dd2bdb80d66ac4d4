//! In-memory archive reader for unit tests.

use zipfs_archive::{ArchiveReader, EntryInfo, Error, Result};

/// Archive held in memory; `None` data marks a directory entry.
#[derive(Debug, Default)]
pub(crate) struct MemoryArchive {
    entries: Vec<(String, Option<Vec<u8>>)>,
    pub(crate) decompressions: usize,
    /// Makes every metadata lookup fail with an I/O error.
    pub(crate) broken: bool,
}

impl MemoryArchive {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn file(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push((name.to_string(), Some(data.to_vec())));
        self
    }

    pub(crate) fn dir(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), None));
        self
    }

    fn info(&self, index: usize) -> Result<EntryInfo> {
        if self.broken {
            return Err(Error::IoError(std::io::Error::other("broken archive")));
        }
        let (name, data) = self.entries.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })?;
        Ok(EntryInfo {
            index,
            name: name.trim_matches('/').to_string(),
            is_dir: data.is_none(),
            size: data.as_ref().map_or(0, |d| d.len() as u64),
        })
    }
}

impl ArchiveReader for MemoryArchive {
    fn total_entries(&self) -> usize {
        self.entries.len()
    }

    fn entry_by_index(&mut self, index: usize) -> Result<EntryInfo> {
        self.info(index)
    }

    fn entry_by_name(&mut self, name: &str) -> Result<Option<EntryInfo>> {
        let name = name.trim_matches('/');
        let matching = |(_, (n, _)): &(usize, &(String, Option<Vec<u8>>))| {
            !name.is_empty() && n.trim_matches('/') == name
        };
        let file = self
            .entries
            .iter()
            .enumerate()
            .filter(matching)
            .find(|(_, (_, data))| data.is_some());
        match file.or_else(|| self.entries.iter().enumerate().find(matching)) {
            Some((index, _)) => self.info(index).map(Some),
            None => Ok(None),
        }
    }

    fn read_entry(&mut self, index: usize, buf: &mut [u8]) -> Result<()> {
        let data = match self.entries.get(index) {
            Some((_, Some(data))) => data,
            Some((_, None)) => return Err(Error::IsDirectory(index)),
            None => {
                return Err(Error::IndexOutOfRange {
                    index,
                    len: self.entries.len(),
                })
            }
        };
        if data.len() != buf.len() {
            return Err(Error::SizeMismatch {
                index,
                expected: data.len() as u64,
                actual: buf.len(),
            });
        }
        buf.copy_from_slice(data);
        self.decompressions += 1;
        Ok(())
    }
}

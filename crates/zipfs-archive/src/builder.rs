use crate::Result;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

#[derive(Debug, Clone)]
enum PendingEntry {
    File { name: String, data: Vec<u8> },
    Directory { name: String },
}

/// Builder for creating zip archives.
///
/// Entries are written in the order they were added, which lets callers
/// produce archives whose native order is not grouped by directory.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    entries: Vec<PendingEntry>,
    compression: CompressionMethod,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            compression: CompressionMethod::Deflated,
        }
    }
}

impl ArchiveBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression method used for file entries.
    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Add a regular file entry.
    pub fn with_file(mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.entries.push(PendingEntry::File {
            name: name.into(),
            data: data.into(),
        });
        self
    }

    /// Add an explicit directory marker.
    pub fn with_directory(mut self, name: impl Into<String>) -> Self {
        self.entries.push(PendingEntry::Directory { name: name.into() });
        self
    }

    /// Write the archive to the specified path.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut zip = ZipWriter::new(file);
        let options: FileOptions<()> = FileOptions::default().compression_method(self.compression);

        for entry in &self.entries {
            match entry {
                PendingEntry::File { name, data } => {
                    zip.start_file(name.as_str(), options)?;
                    zip.write_all(data)?;
                }
                PendingEntry::Directory { name } => {
                    zip.add_directory(name.as_str(), options)?;
                }
            }
        }

        zip.finish()?;

        Ok(path.to_path_buf())
    }
}

//! Single-slot read-through cache of decompressed entries.
//!
//! Reads from a compressed entry arrive in small chunks at increasing
//! offsets. Decompressing the whole entry once and serving every chunk from
//! memory keeps a sequential read of an N-byte file at one decompression
//! instead of N / chunk.
//!
//! The slot holds one entry at a time. Interleaved reads of two files evict
//! each other on every call.

use crate::error::{Error, Result};
use log::{debug, trace};
use std::io;
use zipfs_archive::ArchiveReader;

/// Cache holding the decompressed bytes of at most one entry.
#[derive(Debug)]
pub struct ReadCache {
    /// Archive index of the cached entry, `None` when the slot is empty.
    index: Option<usize>,
    /// Exact size of the cached entry.
    entry_size: usize,
    /// Backing buffer; its length is the slot's capacity.
    buf: Vec<u8>,
    /// Minimum capacity kept once allocated.
    min_buf_size: usize,
    /// Number of decompressions performed.
    loads: u64,
}

impl ReadCache {
    /// Create an empty cache. No memory is allocated until the first load.
    pub fn new(min_buf_size: usize) -> Self {
        Self {
            index: None,
            entry_size: 0,
            buf: Vec::new(),
            min_buf_size,
            loads: 0,
        }
    }

    /// Archive index of the cached entry.
    pub fn cached_index(&self) -> Option<usize> {
        self.index
    }

    /// Current buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of decompressions performed so far.
    pub fn loads(&self) -> u64 {
        self.loads
    }

    /// Drop the cached entry, keeping the buffer.
    pub fn invalidate(&mut self) {
        self.index = None;
        self.entry_size = 0;
    }

    /// Copy bytes of entry `index` (of `size` bytes) starting at `offset`.
    ///
    /// Returns the number of bytes copied into `out`, which is 0 at or past
    /// the end of the entry.
    pub fn read<R: ArchiveReader + ?Sized>(
        &mut self,
        reader: &mut R,
        index: usize,
        size: u64,
        offset: u64,
        out: &mut [u8],
    ) -> Result<usize> {
        if let Err(e) = self.ensure_loaded(reader, index, size) {
            self.invalidate();
            return Err(e);
        }

        let entry_size = self.entry_size as u64;
        if offset >= entry_size {
            trace!("Offset {} is out of bound for entry size {}", offset, entry_size);
            return Ok(0);
        }

        let start = offset as usize;
        let count = out.len().min(self.entry_size - start);
        out[..count].copy_from_slice(&self.buf[start..start + count]);
        trace!("{} byte(s) copied to buffer from offset {}", count, offset);
        Ok(count)
    }

    /// Decompress entry `index` into the slot unless it is already there.
    pub fn ensure_loaded<R: ArchiveReader + ?Sized>(
        &mut self,
        reader: &mut R,
        index: usize,
        size: u64,
    ) -> Result<()> {
        if self.index == Some(index) {
            return Ok(());
        }

        let need = usize::try_from(size).map_err(|_| {
            Error::Io(io::Error::new(
                io::ErrorKind::OutOfMemory,
                format!("entry {} of {} bytes does not fit in memory", index, size),
            ))
        })?;

        self.invalidate();
        let have = self.buf.len();
        if have < need || (have > need && have > self.min_buf_size) {
            self.reallocate(self.min_buf_size.max(need))?;
        }

        reader.read_entry(index, &mut self.buf[..need])?;
        self.index = Some(index);
        self.entry_size = need;
        self.loads += 1;
        debug!("Entry {} loaded ({} bytes, capacity {})", index, need, self.buf.len());
        Ok(())
    }

    fn reallocate(&mut self, capacity: usize) -> Result<()> {
        let have = self.buf.len();
        if capacity > have {
            self.buf.try_reserve_exact(capacity - have).map_err(|e| {
                Error::Io(io::Error::new(
                    io::ErrorKind::OutOfMemory,
                    format!("cannot grow read buffer to {} bytes: {}", capacity, e),
                ))
            })?;
            self.buf.resize(capacity, 0);
        } else {
            self.buf.truncate(capacity);
            self.buf.shrink_to_fit();
        }
        debug!("Buffer with size {} reallocated", capacity);
        Ok(())
    }
}

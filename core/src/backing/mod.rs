//! Backing stores
//!
//! A virtual disk reads its bytes from exactly one of three sources: an
//! owned memory buffer, a byte range of a real disk, or an open file. The
//! store is chosen by the caller and never changes for the life of the disk.

pub mod disk;
pub mod file;
pub mod memory;

pub use disk::{DiskRegion, SectorDevice};
pub use file::{FileHandle, FileSource, SectorAccess};
pub use memory::MemoryBuffer;

use crate::error::{IoError, MapError};

/// Size of a legacy disk sector. Traced accesses and drive-map entries use it.
pub const SECTOR_SIZE: u64 = 512;

/// Chunk size when copying a store into memory
const COPY_CHUNK: usize = 1024 * 1024;

/// Byte source behind a virtual disk
pub enum BackingStore<'a> {
    Memory(MemoryBuffer),
    Disk(DiskRegion<'a>),
    File(FileHandle<'a>),
}

impl<'a> BackingStore<'a> {
    /// Total size in bytes
    pub fn size(&self) -> u64 {
        match self {
            Self::Memory(m) => m.size(),
            Self::Disk(d) => d.size(),
            Self::File(f) => f.size(),
        }
    }

    /// Fill `buf` with the bytes at `offset`.
    ///
    /// Fails with `OutOfRange` when any part of the range lies past `size()`.
    pub fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, IoError> {
        let end = offset
            .checked_add(buf.len() as u64)
            .ok_or(IoError::OutOfRange)?;
        if end > self.size() {
            return Err(IoError::OutOfRange);
        }
        if buf.is_empty() {
            return Ok(0);
        }
        match self {
            Self::Memory(m) => m.read_at(buf, offset),
            Self::Disk(d) => d.read_at(buf, offset),
            Self::File(f) => f.read_at(buf, offset),
        }
    }

    /// Name of the backing file, empty for other stores
    pub fn name(&self) -> &str {
        match self {
            Self::File(f) => f.name(),
            _ => "",
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory(_))
    }

    /// Copy the whole store into an owned buffer.
    ///
    /// A memory store is returned unchanged. Allocation failure is reported
    /// as `OutOfMemory` before any byte is read.
    pub fn into_memory<'b>(self) -> Result<BackingStore<'b>, MapError> {
        let mut store = match self {
            Self::Memory(m) => return Ok(BackingStore::Memory(m)),
            other => other,
        };

        let size = store.size();
        log::info!("Loading {} ({} bytes) into memory", store.name(), size);

        let mut buffer = MemoryBuffer::allocate(size)?;
        let data = buffer.as_mut_slice();
        let mut offset = 0usize;
        while offset < data.len() {
            let len = (data.len() - offset).min(COPY_CHUNK);
            store.read_at(&mut data[offset..offset + len], offset as u64)?;
            offset += len;
        }
        Ok(BackingStore::Memory(buffer))
    }

    /// First 512-byte disk sector holding the store's data, `None` for memory.
    pub fn first_sector(&mut self) -> Result<Option<u64>, IoError> {
        match self {
            Self::Memory(_) => Ok(None),
            Self::Disk(d) => d.first_sector().map(Some),
            Self::File(f) => f.first_sector().map(Some),
        }
    }
}

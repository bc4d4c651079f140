// Owned in-memory image

use crate::error::{IoError, MapError};
use alloc::vec::Vec;

/// Image bytes owned by the virtual disk. Freed when the disk is dropped.
pub struct MemoryBuffer {
    data: Vec<u8>,
}

impl MemoryBuffer {
    /// Wrap bytes that are already in memory
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Zeroed buffer of `size` bytes, or `OutOfMemory` if it cannot be reserved
    pub fn allocate(size: u64) -> Result<Self, MapError> {
        let len = usize::try_from(size).map_err(|_| MapError::OutOfMemory)?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| MapError::OutOfMemory)?;
        data.resize(len, 0);
        Ok(Self { data })
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Address of the first byte, for tables that hand the image to real-mode code
    pub fn address(&self) -> u64 {
        self.data.as_ptr() as u64
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub(crate) fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize, IoError> {
        let start = usize::try_from(offset).map_err(|_| IoError::OutOfRange)?;
        let end = start.checked_add(buf.len()).ok_or(IoError::OutOfRange)?;
        let src = self.data.get(start..end).ok_or(IoError::OutOfRange)?;
        buf.copy_from_slice(src);
        Ok(buf.len())
    }
}

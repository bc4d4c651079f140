//! Firmware Block I/O as a sector device
//!
//! Lets a region of a real disk (`map (hd0,1)+1`, a partition holding an
//! image) serve as the backing store of a virtual disk.

use super::block_io::BlockIoProtocol;
use super::status::io_error;
use vmap_core::backing::SectorDevice;
use vmap_core::error::IoError;

/// Wrapper around a firmware `BlockIoProtocol`
pub struct FirmwareDisk {
    protocol: *mut BlockIoProtocol,
    block_size: u32,
    num_blocks: u64,
}

impl FirmwareDisk {
    /// Create a new wrapper
    ///
    /// # Safety
    /// The protocol pointer must be valid for the lifetime of this wrapper.
    pub unsafe fn new(protocol: *mut BlockIoProtocol) -> Self {
        let media = (*protocol).media();
        Self {
            protocol,
            block_size: media.block_size,
            num_blocks: media.last_block + 1,
        }
    }
}

impl SectorDevice for FirmwareDisk {
    fn sector_size(&self) -> u32 {
        self.block_size
    }

    fn total_sectors(&self) -> u64 {
        self.num_blocks
    }

    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> Result<(), IoError> {
        if self.block_size == 0 || buf.len() % self.block_size as usize != 0 {
            return Err(IoError::UnsupportedSectorSize);
        }
        let count = (buf.len() / self.block_size as usize) as u64;

        // SAFETY: Protocol pointer is valid (guaranteed by constructor)
        unsafe {
            let protocol = &mut *self.protocol;
            protocol.read_sectors(lba, count, buf).map_err(io_error)
        }
    }
}

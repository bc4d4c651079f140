// UEFI Block I/O Protocol for disk access

use super::status::{EFI_BAD_BUFFER_SIZE, EFI_SUCCESS};
use vmap_core::vdisk::Media;

/// Revision 1: the media struct ends at `last_block` for callers
pub const EFI_BLOCK_IO_PROTOCOL_REVISION: u64 = 0x0001_0000;

#[repr(C)]
pub struct BlockIoProtocol {
    pub revision: u64,
    pub media: *const BlockIoMedia,
    pub reset: extern "efiapi" fn(*mut BlockIoProtocol, bool) -> usize,
    pub read_blocks: extern "efiapi" fn(
        *mut BlockIoProtocol,
        u32,     // MediaId
        u64,     // LBA
        usize,   // BufferSize
        *mut u8, // Buffer
    ) -> usize,
    pub write_blocks: extern "efiapi" fn(*mut BlockIoProtocol, u32, u64, usize, *const u8) -> usize,
    pub flush_blocks: extern "efiapi" fn(*mut BlockIoProtocol) -> usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIoMedia {
    pub media_id: u32,
    pub removable_media: bool,
    pub media_present: bool,
    pub logical_partition: bool,
    pub read_only: bool,
    pub write_caching: bool,
    pub block_size: u32,
    pub io_align: u32,
    pub last_block: u64,
    // UEFI 2.0+
    pub lowest_aligned_lba: u64,
    pub logical_blocks_per_physical_block: u32,
    // UEFI 2.1+
    pub optimal_transfer_length_granularity: u32,
}

#[cfg(target_pointer_width = "64")]
const _: () = assert!(core::mem::size_of::<BlockIoProtocol>() == 48);
const _: () = assert!(core::mem::offset_of!(BlockIoMedia, block_size) == 12);
const _: () = assert!(core::mem::offset_of!(BlockIoMedia, last_block) == 24);

pub const EFI_BLOCK_IO_PROTOCOL_GUID: [u8; 16] = [
    0x21, 0x5b, 0x4e, 0x96, 0x59, 0x64, 0xd2, 0x11, 0x8e, 0x39, 0x00, 0xa0, 0xc9, 0x69, 0x72, 0x3b,
];

impl From<&Media> for BlockIoMedia {
    fn from(media: &Media) -> Self {
        Self {
            media_id: media.media_id,
            removable_media: media.removable_media,
            media_present: media.media_present,
            logical_partition: media.logical_partition,
            read_only: media.read_only,
            write_caching: media.write_caching,
            block_size: media.block_size,
            io_align: media.io_align,
            last_block: media.last_block,
            lowest_aligned_lba: 0,
            logical_blocks_per_physical_block: 1,
            optimal_transfer_length_granularity: 0,
        }
    }
}

impl BlockIoProtocol {
    /// Geometry reported by the device
    ///
    /// # Safety
    /// `media` must point at the device's live media struct.
    pub unsafe fn media(&self) -> &BlockIoMedia {
        &*self.media
    }

    /// Read `count` blocks at `lba` into `buffer`
    ///
    /// # Safety
    /// `self` must be a protocol instance owned by firmware or by this crate.
    pub unsafe fn read_sectors(&mut self, lba: u64, count: u64, buffer: &mut [u8]) -> Result<(), usize> {
        let media = *self.media();
        let total_size = media.block_size as usize * count as usize;

        if buffer.len() < total_size {
            return Err(EFI_BAD_BUFFER_SIZE);
        }

        let status = (self.read_blocks)(self, media.media_id, lba, total_size, buffer.as_mut_ptr());

        if status == EFI_SUCCESS {
            Ok(())
        } else {
            Err(status)
        }
    }
}

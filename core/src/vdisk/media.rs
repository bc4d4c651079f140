// Block device geometry

/// Media id of every virtual device. It never changes: the image cannot be swapped.
pub const VDISK_MEDIA_ID: u32 = 1;

/// Buffer alignment advertised to firmware
pub const VDISK_IO_ALIGN: u32 = 16;

/// Last addressable block for `total_size` bytes.
///
/// Counts a trailing partial block. `total_size` must be non-zero.
pub const fn last_block_for(total_size: u64, block_size: u32) -> u64 {
    total_size.div_ceil(block_size as u64) - 1
}

/// Geometry handed to firmware with the block device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Media {
    pub media_id: u32,
    pub removable_media: bool,
    pub media_present: bool,
    pub logical_partition: bool,
    pub read_only: bool,
    pub write_caching: bool,
    pub block_size: u32,
    pub io_align: u32,
    pub last_block: u64,
}

impl Media {
    /// Whole-disk media
    pub fn disk(block_size: u32, last_block: u64, read_only: bool) -> Self {
        Self {
            media_id: VDISK_MEDIA_ID,
            removable_media: false,
            media_present: true,
            logical_partition: false,
            read_only,
            write_caching: false,
            block_size,
            io_align: VDISK_IO_ALIGN,
            last_block,
        }
    }

    /// Media of a partition inside `parent`
    pub fn partition(parent: &Media, sector_count: u64) -> Self {
        Self {
            logical_partition: true,
            last_block: sector_count - 1,
            ..*parent
        }
    }

    /// Number of blocks
    pub fn block_count(&self) -> u64 {
        self.last_block + 1
    }
}

//! Virtual disks
//!
//! A `VirtualDisk` turns a backing store into a read-only block device:
//! 2048-byte blocks for optical images, 512 otherwise, with `last_block`
//! covering a trailing partial block. Partitioned images also get a
//! partition view for the boot partition.
//!
//! A published disk is shared with firmware, which reads from it while
//! `install` is still running. All state that changes after construction
//! (the store's file position, the registrations) is behind `spin::Mutex`,
//! so every accessor here takes `&self`.

pub mod block_io;
pub mod devpath;
pub mod media;
pub mod partition;

pub use block_io::{check_read, VirtualBlockIo};
pub use devpath::{DevicePath, DevicePathError, DevicePathNode, VDISK_GUID};
pub use media::{last_block_for, Media, VDISK_MEDIA_ID};
pub use partition::{PartitionIo, VirtualPartition};

use crate::backing::BackingStore;
use crate::disk::{find_boot_partition, ImageType};
use crate::error::{BlockIoError, MapError};
use crate::map::DeviceHandle;
use block_io::{read_window, Window};
use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use spin::Mutex;

/// Whether a device has been published to the platform. Registration is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Unregistered,
    Registered(DeviceHandle),
}

impl Registration {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }

    pub fn handle(&self) -> Option<DeviceHandle> {
        match self {
            Self::Registered(h) => Some(*h),
            Self::Unregistered => None,
        }
    }
}

/// Read-only block device over a backing store
pub struct VirtualDisk<'a> {
    store: Mutex<BackingStore<'a>>,
    size: u64,
    image_type: ImageType,
    media: Media,
    device_path: DevicePath,
    partition: Option<VirtualPartition>,
    registration: Mutex<Registration>,
}

impl<'a> VirtualDisk<'a> {
    /// Build the disk and look for its boot partition.
    ///
    /// `writable` only clears the read-only media flag; writes are refused either way.
    pub fn new(
        mut store: BackingStore<'a>,
        image_type: ImageType,
        writable: bool,
    ) -> Result<Self, MapError> {
        let size = store.size();
        if size == 0 {
            return Err(MapError::EmptyImage);
        }

        let block_size = image_type.block_size();
        let media = Media::disk(block_size, last_block_for(size, block_size), !writable);
        let device_path = DevicePath::vdisk();

        log::info!(
            "VDISK type={} size={:#x} blksize={} lastblk={:#x}",
            image_type,
            size,
            media.block_size,
            media.last_block
        );

        let partition = find_boot_partition(&mut store, image_type, media.last_block)
            .map(|info| VirtualPartition::new(info, &media, &device_path));

        Ok(Self {
            store: Mutex::new(store),
            size,
            image_type,
            media,
            device_path,
            partition,
            registration: Mutex::new(Registration::Unregistered),
        })
    }

    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    pub fn block_size(&self) -> u32 {
        self.media.block_size
    }

    pub fn last_block(&self) -> u64 {
        self.media.last_block
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// The image was copied into memory
    pub fn in_memory(&self) -> bool {
        self.store.lock().is_memory()
    }

    pub fn device_path(&self) -> &DevicePath {
        &self.device_path
    }

    pub fn partition(&self) -> Option<&VirtualPartition> {
        self.partition.as_ref()
    }

    /// Block I/O on the boot partition
    pub fn partition_io(&self) -> Option<PartitionIo<'_, 'a>> {
        let partition = self.partition.as_ref()?;
        Some(PartitionIo {
            disk: self,
            partition,
        })
    }

    pub fn registration(&self) -> Registration {
        *self.registration.lock()
    }

    pub(crate) fn register(&self, handle: DeviceHandle) {
        *self.registration.lock() = Registration::Registered(handle);
    }
}

impl VirtualBlockIo for VirtualDisk<'_> {
    fn media(&self) -> &Media {
        &self.media
    }

    fn read_blocks(&self, media_id: u32, lba: u64, buf: &mut [u8]) -> Result<(), BlockIoError> {
        let window = Window {
            start: 0,
            len: self.size,
        };
        read_window(&self.store, window, &self.media, media_id, lba, buf)
    }
}

/// `gpt_disk_io::BlockIo` over a whole virtual disk
pub struct DiskBlockIo<'d, 'a> {
    disk: &'d VirtualDisk<'a>,
}

impl<'a> VirtualDisk<'a> {
    /// View for code written against `gpt_disk_io`, such as GPT and ISO readers
    pub fn block_io(&self) -> DiskBlockIo<'_, 'a> {
        DiskBlockIo { disk: self }
    }
}

impl BlockIo for DiskBlockIo<'_, '_> {
    type Error = BlockIoError;

    fn block_size(&self) -> BlockSize {
        BlockSize::new(self.disk.media.block_size).unwrap_or(BlockSize::BS_512)
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok(self.disk.media.block_count())
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        self.disk.read_blocks(VDISK_MEDIA_ID, start_lba.0, dst)
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        self.disk.write_blocks(VDISK_MEDIA_ID, start_lba.0, src)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.disk.flush()
    }
}

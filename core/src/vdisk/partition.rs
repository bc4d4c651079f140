// Partition view of a virtual disk

use super::block_io::{read_window, VirtualBlockIo, Window};
use super::devpath::{DevicePath, DevicePathNode};
use super::media::Media;
use super::Registration;
use super::VirtualDisk;
use crate::disk::{PartitionInfo, PartitionKind};
use crate::error::BlockIoError;
use crate::map::DeviceHandle;
use spin::Mutex;

/// The bootable partition of a virtual disk.
///
/// Owned by its disk. Reads go through [`PartitionIo`], which borrows the
/// disk, so the view cannot outlive it.
#[derive(Debug)]
pub struct VirtualPartition {
    info: PartitionInfo,
    media: Media,
    device_path: DevicePath,
    registration: Mutex<Registration>,
}

impl VirtualPartition {
    pub(crate) fn new(info: PartitionInfo, parent: &Media, parent_path: &DevicePath) -> Self {
        let node = match info.kind {
            PartitionKind::ElTorito => DevicePathNode::CdRom {
                boot_entry: info.number,
                start: info.start_lba,
                size: info.sector_count,
            },
            PartitionKind::Mbr | PartitionKind::Gpt => DevicePathNode::HardDrive {
                partition_number: info.number,
                start: info.start_lba,
                size: info.sector_count,
                signature: info.signature,
            },
        };
        Self {
            media: Media::partition(parent, info.sector_count),
            device_path: parent_path.with(node),
            info,
            registration: Mutex::new(Registration::Unregistered),
        }
    }

    pub fn info(&self) -> &PartitionInfo {
        &self.info
    }

    pub fn media(&self) -> &Media {
        &self.media
    }

    pub fn device_path(&self) -> &DevicePath {
        &self.device_path
    }

    pub fn registration(&self) -> Registration {
        *self.registration.lock()
    }

    pub(crate) fn register(&self, handle: DeviceHandle) {
        *self.registration.lock() = Registration::Registered(handle);
    }

    /// Bytes of the backing store the partition covers, clipped to the store
    pub(crate) fn window(&self, store_size: u64) -> Window {
        let block_size = self.media.block_size as u64;
        let start = self.info.start_lba * block_size;
        let len = (self.info.sector_count * block_size).min(store_size.saturating_sub(start));
        Window { start, len }
    }
}

/// Block I/O on a partition, borrowing its disk
pub struct PartitionIo<'d, 'a> {
    pub(crate) disk: &'d VirtualDisk<'a>,
    pub(crate) partition: &'d VirtualPartition,
}

impl VirtualBlockIo for PartitionIo<'_, '_> {
    fn media(&self) -> &Media {
        &self.partition.media
    }

    fn read_blocks(&self, media_id: u32, lba: u64, buf: &mut [u8]) -> Result<(), BlockIoError> {
        let window = self.partition.window(self.disk.size());
        read_window(&self.disk.store, window, &self.partition.media, media_id, lba, buf)
    }
}

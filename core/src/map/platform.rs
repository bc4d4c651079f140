//! Platform services
//!
//! Everything the mapping layer needs from firmware, as a trait. The UEFI
//! binding implements it over Boot Services; tests implement it in memory.

use crate::error::PlatformError;
use crate::vdisk::{DevicePath, Media};
use alloc::vec::Vec;

/// Opaque handle of a published device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(pub usize);

/// Opaque handle of a loaded boot image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub usize);

/// Which of the two virtual devices is being published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceRole {
    Disk,
    Partition,
}

pub trait Platform {
    /// Publish a block device under `path` and return its new handle
    fn install_block_device(
        &mut self,
        role: DeviceRole,
        path: &DevicePath,
        media: &Media,
    ) -> Result<DeviceHandle, PlatformError>;

    /// Let drivers (partition, file system) bind to the new device
    fn connect_controller(&mut self, handle: DeviceHandle) -> Result<(), PlatformError>;

    fn load_image(&mut self, path: &DevicePath) -> Result<ImageHandle, PlatformError>;

    fn start_image(&mut self, image: ImageHandle) -> Result<(), PlatformError>;

    /// Every handle with a file system, with its device path
    fn file_system_handles(&mut self) -> Result<Vec<(DeviceHandle, DevicePath)>, PlatformError>;

    /// Block until the user presses a key
    fn wait_for_key(&mut self) {}
}

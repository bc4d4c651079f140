//! Block I/O protocol instances for mapped disks
//!
//! Firmware calls back through the function pointers in the protocol and
//! hands us the protocol pointer as `This`. The protocol is the first field
//! of `EfiBlockDevice`, so the pointer converts straight back to the device.
//! Callbacks only ever form shared references: firmware may re-enter a
//! device while another call on the same disk is still running.

use crate::uefi::block_io::{BlockIoMedia, BlockIoProtocol, EFI_BLOCK_IO_PROTOCOL_REVISION};
use crate::uefi::status::{block_io_status, EFI_INVALID_PARAMETER, EFI_SUCCESS};
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::ffi::c_void;
use core::slice;
use vmap_core::error::BlockIoError;
use vmap_core::map::DeviceRole;
use vmap_core::vdisk::{DevicePath, DevicePathError, Media, VirtualBlockIo, VirtualDisk};

/// One published block device: the whole disk or its boot partition
#[repr(C)]
pub struct EfiBlockDevice {
    protocol: BlockIoProtocol,
    media: BlockIoMedia,
    role: DeviceRole,
    disk: &'static VirtualDisk<'static>,
    device_path: Vec<u8>,
}

impl EfiBlockDevice {
    /// Build a device answering reads from `disk`.
    ///
    /// The device is boxed so the media pointer inside the protocol stays valid.
    pub fn new(
        disk: &'static VirtualDisk<'static>,
        role: DeviceRole,
        path: &DevicePath,
        media: &Media,
    ) -> Result<Box<Self>, DevicePathError> {
        let mut device = Box::new(Self {
            protocol: BlockIoProtocol {
                revision: EFI_BLOCK_IO_PROTOCOL_REVISION,
                media: core::ptr::null(),
                reset: efi_reset,
                read_blocks: efi_read_blocks,
                write_blocks: efi_write_blocks,
                flush_blocks: efi_flush_blocks,
            },
            media: BlockIoMedia::from(media),
            role,
            disk,
            device_path: path.to_bytes()?,
        });
        device.protocol.media = &device.media;
        Ok(device)
    }

    pub fn role(&self) -> DeviceRole {
        self.role
    }

    pub fn media(&self) -> &BlockIoMedia {
        &self.media
    }

    /// The protocol firmware sees for a leaked device
    pub fn protocol_ptr(this: *mut Self) -> *mut BlockIoProtocol {
        this.cast()
    }

    /// Encoded device path, End node included
    ///
    /// # Safety
    /// `this` must be a live device that firmware is not calling into yet.
    pub unsafe fn device_path_ptr(this: *mut Self) -> *mut c_void {
        (*this).device_path.as_mut_ptr() as *mut c_void
    }

    /// # Safety
    /// `this` must be null or the protocol of a live `EfiBlockDevice`.
    unsafe fn from_protocol<'p>(this: *mut BlockIoProtocol) -> Option<&'p Self> {
        (this as *const Self).as_ref()
    }

    fn read(&self, media_id: u32, lba: u64, buf: &mut [u8]) -> Result<(), BlockIoError> {
        match self.role {
            DeviceRole::Disk => self.disk.read_blocks(media_id, lba, buf),
            DeviceRole::Partition => self
                .disk
                .partition_io()
                .ok_or(BlockIoError::InvalidParameter)?
                .read_blocks(media_id, lba, buf),
        }
    }

    fn write(&self, media_id: u32, lba: u64, buf: &[u8]) -> Result<(), BlockIoError> {
        self.disk.write_blocks(media_id, lba, buf)
    }
}

extern "efiapi" fn efi_reset(this: *mut BlockIoProtocol, _extended: bool) -> usize {
    // SAFETY: firmware passes back the protocol we installed
    match unsafe { EfiBlockDevice::from_protocol(this) } {
        Some(_) => EFI_SUCCESS,
        None => EFI_INVALID_PARAMETER,
    }
}

extern "efiapi" fn efi_read_blocks(
    this: *mut BlockIoProtocol,
    media_id: u32,
    lba: u64,
    buffer_size: usize,
    buffer: *mut u8,
) -> usize {
    // SAFETY: firmware passes back the protocol we installed
    let Some(device) = (unsafe { EfiBlockDevice::from_protocol(this) }) else {
        return EFI_INVALID_PARAMETER;
    };
    let buf: &mut [u8] = if buffer_size == 0 {
        &mut []
    } else if buffer.is_null() {
        return EFI_INVALID_PARAMETER;
    } else {
        // SAFETY: the caller owns `buffer_size` writable bytes at `buffer`
        unsafe { slice::from_raw_parts_mut(buffer, buffer_size) }
    };
    block_io_status(device.read(media_id, lba, buf))
}

extern "efiapi" fn efi_write_blocks(
    this: *mut BlockIoProtocol,
    media_id: u32,
    lba: u64,
    buffer_size: usize,
    buffer: *const u8,
) -> usize {
    // SAFETY: firmware passes back the protocol we installed
    let Some(device) = (unsafe { EfiBlockDevice::from_protocol(this) }) else {
        return EFI_INVALID_PARAMETER;
    };
    let buf: &[u8] = if buffer.is_null() || buffer_size == 0 {
        &[]
    } else {
        // SAFETY: the caller owns `buffer_size` readable bytes at `buffer`
        unsafe { slice::from_raw_parts(buffer, buffer_size) }
    };
    block_io_status(device.write(media_id, lba, buf))
}

extern "efiapi" fn efi_flush_blocks(this: *mut BlockIoProtocol) -> usize {
    if this.is_null() {
        EFI_INVALID_PARAMETER
    } else {
        EFI_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uefi::status::{EFI_BAD_BUFFER_SIZE, EFI_MEDIA_CHANGED, EFI_WRITE_PROTECTED};
    use alloc::vec;
    use vmap_core::backing::{BackingStore, MemoryBuffer};
    use vmap_core::disk::ImageType;
    use vmap_core::vdisk::VDISK_MEDIA_ID;

    /// MBR disk of 64 sectors, active partition at 8 for 16 sectors
    fn leaked_disk() -> &'static VirtualDisk<'static> {
        let mut data = vec![0u8; 64 * 512];
        for (i, chunk) in data.chunks_exact_mut(512).enumerate() {
            chunk[0] = i as u8;
        }
        data[446] = 0x80;
        data[446 + 4] = 0x0C;
        data[446 + 8..446 + 12].copy_from_slice(&8u32.to_le_bytes());
        data[446 + 12..446 + 16].copy_from_slice(&16u32.to_le_bytes());
        data[510] = 0x55;
        data[511] = 0xAA;

        let store = BackingStore::Memory(MemoryBuffer::from_vec(data));
        Box::leak(Box::new(VirtualDisk::new(store, ImageType::Mbr, false).expect("disk")))
    }

    /// A leaked device, as firmware would hold it
    fn device_on(disk: &'static VirtualDisk<'static>, role: DeviceRole) -> *mut BlockIoProtocol {
        let (path, media) = match role {
            DeviceRole::Disk => (disk.device_path().clone(), *disk.media()),
            DeviceRole::Partition => {
                let p = disk.partition().expect("partition");
                (p.device_path().clone(), *p.media())
            }
        };
        let device = EfiBlockDevice::new(disk, role, &path, &media).expect("device");
        EfiBlockDevice::protocol_ptr(Box::into_raw(device))
    }

    fn device(role: DeviceRole) -> *mut BlockIoProtocol {
        device_on(leaked_disk(), role)
    }

    fn read(this: *mut BlockIoProtocol, media_id: u32, lba: u64, buf: &mut [u8]) -> usize {
        // SAFETY: `this` is a live protocol
        let read_blocks = unsafe { (*this).read_blocks };
        read_blocks(this, media_id, lba, buf.len(), buf.as_mut_ptr())
    }

    #[test]
    fn test_media_points_into_device() {
        let this = device(DeviceRole::Disk);
        // SAFETY: `this` is a live protocol
        let media = unsafe { (*this).media() };
        assert_eq!(media.block_size, 512);
        assert_eq!(media.last_block, 63);
        assert!(media.read_only);
    }

    #[test]
    fn test_disk_read() {
        let this = device(DeviceRole::Disk);
        let mut buf = vec![0u8; 1024];
        assert_eq!(read(this, VDISK_MEDIA_ID, 5, &mut buf), EFI_SUCCESS);
        assert_eq!((buf[0], buf[512]), (5, 6));
    }

    #[test]
    fn test_partition_read_is_offset() {
        let this = device(DeviceRole::Partition);
        // SAFETY: `this` is the protocol of a leaked device
        let dev = unsafe { EfiBlockDevice::from_protocol(this) }.expect("device");
        assert_eq!(dev.role(), DeviceRole::Partition);
        assert!(dev.media().logical_partition);
        assert_eq!(dev.media().last_block, 15);
        let mut buf = vec![0u8; 512];
        assert_eq!(read(this, VDISK_MEDIA_ID, 0, &mut buf), EFI_SUCCESS);
        assert_eq!(buf[0], 8);
        assert_eq!(read(this, VDISK_MEDIA_ID, 16, &mut buf), EFI_INVALID_PARAMETER);
    }

    #[test]
    fn test_both_devices_share_one_disk() {
        let disk = leaked_disk();
        let part = device_on(disk, DeviceRole::Partition);
        let whole = device_on(disk, DeviceRole::Disk);
        let mut a = vec![0u8; 512];
        let mut b = vec![0u8; 512];
        assert_eq!(read(part, VDISK_MEDIA_ID, 1, &mut a), EFI_SUCCESS);
        assert_eq!(read(whole, VDISK_MEDIA_ID, 9, &mut b), EFI_SUCCESS);
        assert_eq!(a, b);
    }

    #[test]
    fn test_read_errors() {
        let this = device(DeviceRole::Disk);
        let mut buf = vec![0u8; 100];
        assert_eq!(read(this, VDISK_MEDIA_ID + 1, 0, &mut buf), EFI_MEDIA_CHANGED);
        assert_eq!(read(this, VDISK_MEDIA_ID, 0, &mut buf), EFI_BAD_BUFFER_SIZE);

        // SAFETY: `this` is a live protocol
        let read_blocks = unsafe { (*this).read_blocks };
        assert_eq!(read_blocks(this, VDISK_MEDIA_ID, 0, 512, core::ptr::null_mut()), EFI_INVALID_PARAMETER);
        assert_eq!(read_blocks(this, VDISK_MEDIA_ID, 0, 0, core::ptr::null_mut()), EFI_SUCCESS);
        assert_eq!(read_blocks(core::ptr::null_mut(), VDISK_MEDIA_ID, 0, 0, core::ptr::null_mut()), EFI_INVALID_PARAMETER);
    }

    #[test]
    fn test_writes_are_refused() {
        let this = device(DeviceRole::Partition);
        let buf = [0u8; 512];
        // SAFETY: `this` is a live protocol
        let (write_blocks, flush_blocks, reset) =
            unsafe { ((*this).write_blocks, (*this).flush_blocks, (*this).reset) };
        assert_eq!(write_blocks(this, VDISK_MEDIA_ID, 0, 512, buf.as_ptr()), EFI_WRITE_PROTECTED);
        assert_eq!(flush_blocks(this), EFI_SUCCESS);
        assert_eq!(reset(this, true), EFI_SUCCESS);
    }
}

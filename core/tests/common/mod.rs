//! Shared fixtures: a recording platform and small disk-image builders

#![allow(dead_code)]

use gpt_disk_types::GptPartitionType;
use uguid::Guid;
use vmap_core::backing::{BackingStore, MemoryBuffer};
use vmap_core::error::PlatformError;
use vmap_core::map::{DeviceHandle, DeviceRole, ImageHandle, Platform, REMOVABLE_MEDIA_FILE};
use vmap_core::vdisk::{DevicePath, Media};

/// Something the platform was asked to do
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Install(DeviceRole, DeviceHandle),
    Connect(DeviceHandle),
    Load(DevicePath),
    Start(ImageHandle),
    WaitForKey,
}

/// Platform that records every call and can be told to fail
#[derive(Default)]
pub struct MockPlatform {
    pub events: Vec<Event>,
    pub installed: Vec<(DeviceRole, DevicePath, Media)>,
    next_handle: usize,
    pub fail_install: Option<DeviceRole>,
    pub fail_connect: Option<DeviceRole>,
    pub fail_start: bool,
    /// Devices whose removable-media boot file exists
    pub bootable: Vec<DevicePath>,
    /// Reported by `file_system_handles`
    pub file_systems: Vec<(DeviceHandle, DevicePath)>,
    roles: Vec<(DeviceHandle, DeviceRole)>,
}

pub const STATUS_DEVICE_ERROR: usize = 0x8000_0000_0000_0007;
pub const STATUS_NOT_FOUND: usize = 0x8000_0000_0000_000E;

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bootable(mut self, device: DevicePath) -> Self {
        self.bootable.push(device);
        self
    }

    pub fn with_file_system(mut self, handle: usize, device: DevicePath) -> Self {
        self.file_systems.push((DeviceHandle(handle), device));
        self
    }

    pub fn loads(&self) -> Vec<&DevicePath> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Load(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn role_of(&self, handle: DeviceHandle) -> Option<DeviceRole> {
        self.roles.iter().find(|(h, _)| *h == handle).map(|(_, r)| *r)
    }
}

impl Platform for MockPlatform {
    fn install_block_device(
        &mut self,
        role: DeviceRole,
        path: &DevicePath,
        media: &Media,
    ) -> Result<DeviceHandle, PlatformError> {
        if self.fail_install == Some(role) {
            return Err(PlatformError(STATUS_DEVICE_ERROR));
        }
        self.next_handle += 1;
        let handle = DeviceHandle(self.next_handle);
        self.events.push(Event::Install(role, handle));
        self.installed.push((role, path.clone(), *media));
        self.roles.push((handle, role));
        Ok(handle)
    }

    fn connect_controller(&mut self, handle: DeviceHandle) -> Result<(), PlatformError> {
        self.events.push(Event::Connect(handle));
        match self.role_of(handle) {
            Some(role) if self.fail_connect == Some(role) => Err(PlatformError(STATUS_NOT_FOUND)),
            _ => Ok(()),
        }
    }

    fn load_image(&mut self, path: &DevicePath) -> Result<ImageHandle, PlatformError> {
        self.events.push(Event::Load(path.clone()));
        let found = self
            .bootable
            .iter()
            .any(|device| *path == device.with_file(REMOVABLE_MEDIA_FILE));
        if found {
            Ok(ImageHandle(100 + self.loads().len()))
        } else {
            Err(PlatformError(STATUS_NOT_FOUND))
        }
    }

    fn start_image(&mut self, image: ImageHandle) -> Result<(), PlatformError> {
        self.events.push(Event::Start(image));
        if self.fail_start {
            Err(PlatformError(STATUS_DEVICE_ERROR))
        } else {
            Ok(())
        }
    }

    fn file_system_handles(&mut self) -> Result<Vec<(DeviceHandle, DevicePath)>, PlatformError> {
        Ok(self.file_systems.clone())
    }

    fn wait_for_key(&mut self) {
        self.events.push(Event::WaitForKey);
    }
}

pub fn memory_store(data: Vec<u8>) -> BackingStore<'static> {
    BackingStore::Memory(MemoryBuffer::from_vec(data))
}

/// One MBR partition: `(active, type, start, count)`
pub type MbrPart = (bool, u8, u32, u32);

/// MBR disk of `sectors` 512-byte sectors with disk signature `signature`
pub fn mbr_image(sectors: usize, signature: u32, parts: &[MbrPart]) -> Vec<u8> {
    let mut data = vec![0u8; sectors * 512];
    data[440..444].copy_from_slice(&signature.to_le_bytes());
    for (i, (active, kind, start, count)) in parts.iter().enumerate() {
        let at = 446 + i * 16;
        data[at] = if *active { 0x80 } else { 0x00 };
        data[at + 4] = *kind;
        data[at + 8..at + 12].copy_from_slice(&start.to_le_bytes());
        data[at + 12..at + 16].copy_from_slice(&count.to_le_bytes());
    }
    data[510] = 0x55;
    data[511] = 0xAA;
    data
}

/// One GPT entry: `(type, unique, first_lba, last_lba)`
pub type GptPart = (GptPartitionType, Guid, u64, u64);

/// GPT disk with a protective MBR, header at LBA 1 and 128 entries at LBA 2
pub fn gpt_image(sectors: usize, parts: &[GptPart]) -> Vec<u8> {
    let mut data = mbr_image(sectors, 0, &[(false, 0xEE, 1, (sectors - 1) as u32)]);

    let hdr = 512;
    data[hdr..hdr + 8].copy_from_slice(b"EFI PART");
    data[hdr + 8..hdr + 12].copy_from_slice(&0x0001_0000u32.to_le_bytes());
    data[hdr + 12..hdr + 16].copy_from_slice(&92u32.to_le_bytes());
    data[hdr + 24..hdr + 32].copy_from_slice(&1u64.to_le_bytes());
    data[hdr + 32..hdr + 40].copy_from_slice(&(sectors as u64 - 1).to_le_bytes());
    data[hdr + 40..hdr + 48].copy_from_slice(&34u64.to_le_bytes());
    data[hdr + 48..hdr + 56].copy_from_slice(&(sectors as u64 - 34).to_le_bytes());
    data[hdr + 72..hdr + 80].copy_from_slice(&2u64.to_le_bytes());
    data[hdr + 80..hdr + 84].copy_from_slice(&128u32.to_le_bytes());
    data[hdr + 84..hdr + 88].copy_from_slice(&128u32.to_le_bytes());

    for (i, (kind, unique, first, last)) in parts.iter().enumerate() {
        let at = 1024 + i * 128;
        data[at..at + 16].copy_from_slice(&kind.0.to_bytes());
        data[at + 16..at + 32].copy_from_slice(&unique.to_bytes());
        data[at + 32..at + 40].copy_from_slice(&first.to_le_bytes());
        data[at + 40..at + 48].copy_from_slice(&last.to_le_bytes());
    }
    data
}

const CD_SECTOR: usize = 2048;

/// ISO image of `sectors` 2048-byte sectors whose El Torito catalog at
/// sector 20 has an x86 initial entry and one EFI entry at `efi_rba`
pub fn cd_image(sectors: usize, efi_rba: u32, efi_count: u16) -> Vec<u8> {
    let mut data = vec![0u8; sectors * CD_SECTOR];
    let descriptor = |data: &mut Vec<u8>, sector: usize, code: u8| {
        let at = sector * CD_SECTOR;
        data[at] = code;
        data[at + 1..at + 6].copy_from_slice(b"CD001");
        data[at + 6] = 1;
    };
    descriptor(&mut data, 16, 1);
    descriptor(&mut data, 17, 0);
    descriptor(&mut data, 18, 255);

    let br = 17 * CD_SECTOR;
    data[br + 7..br + 30].copy_from_slice(b"EL TORITO SPECIFICATION");
    data[br + 0x47..br + 0x4B].copy_from_slice(&20u32.to_le_bytes());

    let cat = 20 * CD_SECTOR;
    data[cat] = 0x01;
    data[cat + 30] = 0x55;
    data[cat + 31] = 0xAA;
    let sum = data[cat..cat + 32]
        .chunks_exact(2)
        .map(|w| u16::from_le_bytes([w[0], w[1]]))
        .fold(0u16, u16::wrapping_add);
    data[cat + 28..cat + 30].copy_from_slice(&0u16.wrapping_sub(sum).to_le_bytes());

    // Initial entry: bootable x86 image at sector 24
    data[cat + 32] = 0x88;
    data[cat + 38..cat + 40].copy_from_slice(&4u16.to_le_bytes());
    data[cat + 40..cat + 44].copy_from_slice(&24u32.to_le_bytes());

    // Final section header for EFI with one entry
    data[cat + 64] = 0x91;
    data[cat + 65] = 0xEF;
    data[cat + 66..cat + 68].copy_from_slice(&1u16.to_le_bytes());
    data[cat + 96] = 0x88;
    data[cat + 102..cat + 104].copy_from_slice(&efi_count.to_le_bytes());
    data[cat + 104..cat + 108].copy_from_slice(&efi_rba.to_le_bytes());
    data
}

//! Common types and constants for ISO9660

/// ISO9660 sector size (always 2048 bytes)
pub const SECTOR_SIZE: usize = 2048;

/// Volume descriptor set starts at sector 16
pub const VOLUME_DESCRIPTOR_START: u64 = 16;

/// Upper bound on descriptors walked before giving up on a terminator
pub const MAX_VOLUME_DESCRIPTORS: u64 = 32;

/// Volume descriptor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VolumeDescriptorType {
    /// Boot Record (El Torito)
    BootRecord = 0,
    /// Primary Volume Descriptor
    Primary = 1,
    /// Supplementary Volume Descriptor (Joliet)
    Supplementary = 2,
    /// Volume Partition Descriptor
    Partition = 3,
    /// Volume Descriptor Set Terminator
    Terminator = 255,
}

impl VolumeDescriptorType {
    /// Map a raw type byte, `None` for reserved codes
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::BootRecord),
            1 => Some(Self::Primary),
            2 => Some(Self::Supplementary),
            3 => Some(Self::Partition),
            255 => Some(Self::Terminator),
            _ => None,
        }
    }
}

/// Boot image information (El Torito)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootImage {
    /// Bootable flag
    pub bootable: bool,

    /// Boot media type
    pub media_type: BootMediaType,

    /// Load segment (x86)
    pub load_segment: u16,

    /// System type
    pub system_type: u8,

    /// Sector count (512-byte virtual sectors)
    pub sector_count: u16,

    /// Image location in 2048-byte ISO sectors
    pub load_rba: u32,

    /// Platform ID of the section the entry came from
    pub platform: BootPlatform,
}

impl BootImage {
    /// Image size declared by the catalog, in bytes
    pub fn declared_size(&self) -> u64 {
        self.sector_count as u64 * 512
    }
}

/// Boot media type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BootMediaType {
    /// No emulation
    NoEmulation = 0,
    /// 1.2MB floppy
    Floppy12M = 1,
    /// 1.44MB floppy
    Floppy144M = 2,
    /// 2.88MB floppy
    Floppy288M = 3,
    /// Hard disk
    HardDisk = 4,
}

/// Boot platform ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BootPlatform {
    /// x86 PC
    X86 = 0,
    /// PowerPC
    PowerPC = 1,
    /// Mac
    Mac = 2,
    /// EFI
    Efi = 0xEF,
}

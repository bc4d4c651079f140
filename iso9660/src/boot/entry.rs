//! Boot catalog entry types
//!
//! Initial/Default, Section Header, and Section entries.

use crate::types::{BootImage, BootMediaType, BootPlatform};

/// Catalog entry size (32 bytes)
pub const ENTRY_SIZE: usize = 32;

/// Boot Catalog Entry (initial/default or section entry)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootEntry {
    /// Boot indicator (0x88 = bootable, 0x00 = not bootable)
    pub boot_indicator: u8,

    /// Boot media type
    pub boot_media_type: u8,

    /// Load segment (0 = default 0x7C0)
    pub load_segment: u16,

    /// System type (partition type from MBR)
    pub system_type: u8,

    /// Sector count (virtual sectors, 512 bytes each)
    pub sector_count: u16,

    /// Load RBA (ISO sector, 2048 bytes)
    pub load_rba: u32,
}

impl BootEntry {
    /// Bootable indicator
    pub const BOOTABLE: u8 = 0x88;

    /// Not bootable indicator
    pub const NOT_BOOTABLE: u8 = 0x00;

    /// Parse a 32-byte entry
    pub fn parse(entry: &[u8]) -> Option<Self> {
        if entry.len() < ENTRY_SIZE {
            return None;
        }
        Some(Self {
            boot_indicator: entry[0],
            boot_media_type: entry[1],
            load_segment: u16::from_le_bytes([entry[2], entry[3]]),
            system_type: entry[4],
            sector_count: u16::from_le_bytes([entry[6], entry[7]]),
            load_rba: u32::from_le_bytes([entry[8], entry[9], entry[10], entry[11]]),
        })
    }

    /// Is this entry bootable?
    pub fn is_bootable(&self) -> bool {
        self.boot_indicator == Self::BOOTABLE
    }

    /// Parse boot media type (low nibble)
    pub fn media_type(&self) -> BootMediaType {
        match self.boot_media_type & 0x0F {
            1 => BootMediaType::Floppy12M,
            2 => BootMediaType::Floppy144M,
            3 => BootMediaType::Floppy288M,
            4 => BootMediaType::HardDisk,
            _ => BootMediaType::NoEmulation,
        }
    }

    /// Image description for the given owning platform
    pub fn to_boot_image(&self, platform: BootPlatform) -> BootImage {
        BootImage {
            bootable: self.is_bootable(),
            media_type: self.media_type(),
            load_segment: self.load_segment,
            system_type: self.system_type,
            sector_count: self.sector_count,
            load_rba: self.load_rba,
            platform,
        }
    }
}

/// Section Header Entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// 0x90 when more headers follow, 0x91 for the final one
    pub indicator: u8,

    /// Platform ID for every entry in the section
    pub platform_id: u8,

    /// Number of section entries that follow this header
    pub entry_count: u16,
}

impl SectionHeader {
    /// Header followed by further headers
    pub const MORE: u8 = 0x90;

    /// Last header in the catalog
    pub const FINAL: u8 = 0x91;

    /// Parse a 32-byte entry as a section header
    pub fn parse(entry: &[u8]) -> Option<Self> {
        if entry.len() < ENTRY_SIZE || !matches!(entry[0], Self::MORE | Self::FINAL) {
            return None;
        }
        Some(Self {
            indicator: entry[0],
            platform_id: entry[1],
            entry_count: u16::from_le_bytes([entry[2], entry[3]]),
        })
    }

    /// Whether this is the last section header
    pub fn is_final(&self) -> bool {
        self.indicator == Self::FINAL
    }

    /// Decoded platform
    pub fn platform(&self) -> BootPlatform {
        BootPlatform::from_id(self.platform_id)
    }
}

/// Section entry extension marker
pub const EXTENSION_INDICATOR: u8 = 0x44;

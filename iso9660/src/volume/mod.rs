//! Volume descriptor probing
//!
//! ISO9660 volume descriptors start at sector 16. Each one opens with a
//! 7-byte header: type code, `CD001` and version 1. El Torito adds a Boot
//! Record descriptor (type 0) that points at the boot catalog.

use crate::error::{Iso9660Error, Result};
use crate::types::{
    VolumeDescriptorType, MAX_VOLUME_DESCRIPTORS, SECTOR_SIZE, VOLUME_DESCRIPTOR_START,
};
use crate::utils::sector::read_iso_sector;
use gpt_disk_io::BlockIo;

/// Volume Descriptor header (first 7 bytes of each descriptor)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeDescriptorHeader {
    /// Type code (0=boot, 1=primary, 2=supplementary, 255=terminator)
    pub type_code: u8,

    /// Standard identifier "CD001"
    pub identifier: [u8; 5],

    /// Version (always 1)
    pub version: u8,
}

impl VolumeDescriptorHeader {
    /// CD001 magic bytes
    pub const MAGIC: &'static [u8; 5] = b"CD001";

    /// Split the header off a descriptor sector
    pub fn parse(sector: &[u8]) -> Option<Self> {
        if sector.len() < 7 {
            return None;
        }
        let mut identifier = [0u8; 5];
        identifier.copy_from_slice(&sector[1..6]);
        Some(Self {
            type_code: sector[0],
            identifier,
            version: sector[6],
        })
    }

    /// `CD001` is the only requirement; some mastering tools leave the
    /// version byte at zero.
    pub fn has_magic(&self) -> bool {
        &self.identifier == Self::MAGIC
    }

    /// Decoded type code
    pub fn descriptor_type(&self) -> Option<VolumeDescriptorType> {
        VolumeDescriptorType::from_code(self.type_code)
    }
}

/// El Torito Boot Record volume descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootRecordDescriptor {
    /// Boot system identifier (32 bytes, NUL padded)
    pub boot_system_id: [u8; 32],

    /// Absolute sector of the boot catalog
    pub catalog_lba: u32,
}

impl BootRecordDescriptor {
    /// Boot system identifier required by El Torito
    pub const EL_TORITO_ID: &'static [u8] = b"EL TORITO SPECIFICATION";

    /// Parse a boot record out of a descriptor sector.
    ///
    /// Returns `None` unless the sector is a type 0 descriptor carrying the
    /// El Torito system identifier.
    pub fn parse(sector: &[u8]) -> Option<Self> {
        let header = VolumeDescriptorHeader::parse(sector)?;
        if !header.has_magic() || header.descriptor_type() != Some(VolumeDescriptorType::BootRecord) {
            return None;
        }
        if sector.len() < 0x4B {
            return None;
        }
        let mut boot_system_id = [0u8; 32];
        boot_system_id.copy_from_slice(&sector[7..39]);
        if !boot_system_id.starts_with(Self::EL_TORITO_ID) {
            return None;
        }
        let catalog_lba = u32::from_le_bytes([sector[0x47], sector[0x48], sector[0x49], sector[0x4A]]);
        Some(Self {
            boot_system_id,
            catalog_lba,
        })
    }
}

/// Check whether an ISO9660 volume descriptor lives at `iso_sector`.
///
/// Returns the descriptor type on a `CD001` match, `None` when the sector
/// holds something else. Read failures (including a device too short to
/// hold the sector) are reported as `Ok(None)` so callers can use this as a
/// plain format probe.
pub fn probe_sector<B: BlockIo>(
    block_io: &mut B,
    start_sector: u64,
    iso_sector: u64,
) -> Option<VolumeDescriptorType> {
    let mut buffer = [0u8; SECTOR_SIZE];
    read_iso_sector(block_io, start_sector, iso_sector, &mut buffer).ok()?;
    let header = VolumeDescriptorHeader::parse(&buffer)?;
    if !header.has_magic() {
        return None;
    }
    header.descriptor_type()
}

/// Probe for an ISO9660 volume.
///
/// Looks at the El Torito boot record slot (sector 17) first, then the
/// primary descriptor slot (sector 16).
pub fn probe<B: BlockIo>(block_io: &mut B, start_sector: u64) -> Option<VolumeDescriptorType> {
    [VOLUME_DESCRIPTOR_START + 1, VOLUME_DESCRIPTOR_START]
        .into_iter()
        .find_map(|sector| probe_sector(block_io, start_sector, sector))
}

/// Walk the descriptor set and return the boot catalog sector.
///
/// # Arguments
/// * `block_io` - Block device containing the ISO
/// * `start_sector` - Starting block of the ISO (0 if raw ISO)
pub fn find_boot_catalog<B: BlockIo>(block_io: &mut B, start_sector: u64) -> Result<u32> {
    let mut buffer = [0u8; SECTOR_SIZE];

    for sector in VOLUME_DESCRIPTOR_START..VOLUME_DESCRIPTOR_START + MAX_VOLUME_DESCRIPTORS {
        read_iso_sector(block_io, start_sector, sector, &mut buffer)?;

        let header = VolumeDescriptorHeader::parse(&buffer).ok_or(Iso9660Error::InvalidSignature)?;
        if !header.has_magic() {
            return Err(Iso9660Error::InvalidSignature);
        }

        match header.descriptor_type() {
            Some(VolumeDescriptorType::BootRecord) => {
                if let Some(record) = BootRecordDescriptor::parse(&buffer) {
                    return Ok(record.catalog_lba);
                }
            }
            Some(VolumeDescriptorType::Terminator) => break,
            _ => {}
        }
    }

    Err(Iso9660Error::NoBootRecord)
}

//! Boot catalog validation entry
//!
//! The validation entry verifies catalog integrity via checksum.

use crate::error::{Iso9660Error, Result};
use crate::types::BootPlatform;
use crate::utils::checksum;

/// Validation Entry (first 32 bytes of the catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationEntry {
    /// Platform ID of the initial entry
    pub platform_id: u8,

    /// Manufacturer/developer ID string (24 bytes)
    pub id_string: [u8; 24],

    /// Checksum word
    pub checksum: u16,
}

impl ValidationEntry {
    /// Header ID constant
    pub const HEADER_ID: u8 = 0x01;

    /// Key bytes constant
    pub const KEY_BYTES: [u8; 2] = [0x55, 0xAA];

    /// Parse and verify a validation entry
    pub fn parse(entry: &[u8]) -> Result<Self> {
        if entry.len() < 32 || entry[0] != Self::HEADER_ID || entry[30..32] != Self::KEY_BYTES {
            return Err(Iso9660Error::InvalidBootCatalog);
        }
        if !checksum::is_zero_sum(&entry[..32]) {
            return Err(Iso9660Error::ChecksumFailed);
        }
        let mut id_string = [0u8; 24];
        id_string.copy_from_slice(&entry[4..28]);
        Ok(Self {
            platform_id: entry[1],
            id_string,
            checksum: u16::from_le_bytes([entry[28], entry[29]]),
        })
    }

    /// Platform of the initial/default entry
    pub fn platform(&self) -> BootPlatform {
        BootPlatform::from_id(self.platform_id)
    }
}

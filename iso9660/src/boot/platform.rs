//! Boot platform identifiers

use crate::types::BootPlatform;

impl BootPlatform {
    /// Parse from a validation entry or section header platform ID.
    ///
    /// Unknown IDs map to x86, the El Torito default.
    pub fn from_id(id: u8) -> Self {
        match id {
            0x01 => BootPlatform::PowerPC,
            0x02 => BootPlatform::Mac,
            0xEF => BootPlatform::Efi,
            _ => BootPlatform::X86,
        }
    }
}

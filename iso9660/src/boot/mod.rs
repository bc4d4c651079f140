//! El Torito boot support
//!
//! Locating the boot image a given firmware platform would start.

pub mod catalog;
pub mod entry;
pub mod platform;
pub mod validation;

pub use catalog::BootCatalog;

use crate::error::{Iso9660Error, Result};
use crate::types::{BootImage, BootPlatform, SECTOR_SIZE};
use crate::utils::sector::read_iso_sector;
use gpt_disk_io::BlockIo;

/// Find the first bootable catalog entry for `platform`
///
/// # Arguments
/// * `block_io` - Block device
/// * `start_sector` - Starting block of the ISO (0 if raw ISO)
/// * `catalog_lba` - Catalog sector from [`crate::find_boot_catalog`]
/// * `platform` - Platform whose section to search
///
/// Only the first catalog sector (64 entries) is inspected.
pub fn find_boot_entry<B: BlockIo>(
    block_io: &mut B,
    start_sector: u64,
    catalog_lba: u32,
    platform: BootPlatform,
) -> Result<BootImage> {
    let mut buffer = [0u8; SECTOR_SIZE];
    read_iso_sector(block_io, start_sector, catalog_lba as u64, &mut buffer)?;

    let catalog = BootCatalog::parse(&buffer)?;
    catalog
        .find_bootable(platform)
        .ok_or(Iso9660Error::NoBootEntry)
}

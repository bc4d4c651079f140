//! Sector reads relative to the start of an ISO image

use crate::error::{Iso9660Error, Result};
use crate::types::SECTOR_SIZE;
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

/// Read one 2048-byte ISO sector.
///
/// `start_sector` is where the image begins on the device, in device
/// blocks. Devices with a smaller native block size are read with as many
/// blocks as one ISO sector spans.
pub fn read_iso_sector<B: BlockIo>(
    block_io: &mut B,
    start_sector: u64,
    iso_sector: u64,
    buffer: &mut [u8; SECTOR_SIZE],
) -> Result<()> {
    let block_size = block_io.block_size().to_u64();
    if block_size > SECTOR_SIZE as u64 || SECTOR_SIZE as u64 % block_size != 0 {
        return Err(Iso9660Error::IoError);
    }
    let per_sector = SECTOR_SIZE as u64 / block_size;
    let lba = iso_sector
        .checked_mul(per_sector)
        .and_then(|l| l.checked_add(start_sector))
        .ok_or(Iso9660Error::IoError)?;
    block_io
        .read_blocks(Lba(lba), buffer)
        .map_err(|_| Iso9660Error::IoError)
}

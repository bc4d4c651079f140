// Disk-region backing store
//
// Reads are translated into whole-sector reads on the owning device. Spans
// that cover complete sectors go straight into the caller's buffer; a
// partial first or last sector goes through a bounce buffer.

use super::SECTOR_SIZE;
use crate::error::IoError;

/// Largest native sector size the bounce buffer can hold
pub const MAX_SECTOR_SIZE: usize = 4096;

/// A real disk, owned by whoever opened it
pub trait SectorDevice {
    /// Native sector size in bytes
    fn sector_size(&self) -> u32;

    fn total_sectors(&self) -> u64;

    /// Read `buf.len() / sector_size` whole sectors starting at `lba`
    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> Result<(), IoError>;
}

/// Byte range of a disk starting at `base_sector`
pub struct DiskRegion<'a> {
    disk: &'a mut dyn SectorDevice,
    base_sector: u64,
    size: u64,
}

impl<'a> DiskRegion<'a> {
    /// Everything from `base_sector` to the end of the disk
    pub fn new(disk: &'a mut dyn SectorDevice, base_sector: u64) -> Self {
        let sectors = disk.total_sectors().saturating_sub(base_sector);
        let size = sectors.saturating_mul(disk.sector_size() as u64);
        Self {
            disk,
            base_sector,
            size,
        }
    }

    /// The whole disk
    pub fn whole_disk(disk: &'a mut dyn SectorDevice) -> Self {
        Self::new(disk, 0)
    }

    /// Limit the region to `size` bytes (never past the end of the disk)
    pub fn with_length(mut self, size: u64) -> Self {
        self.size = self.size.min(size);
        self
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn base_sector(&self) -> u64 {
        self.base_sector
    }

    fn sector_size(&self) -> Result<usize, IoError> {
        let ss = self.disk.sector_size() as usize;
        if ss == 0 || ss > MAX_SECTOR_SIZE {
            return Err(IoError::UnsupportedSectorSize);
        }
        Ok(ss)
    }

    /// Base of the region in 512-byte units
    pub(crate) fn first_sector(&self) -> Result<u64, IoError> {
        let ss = self.sector_size()? as u64;
        Ok(self.base_sector * ss / SECTOR_SIZE)
    }

    pub(crate) fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, IoError> {
        let ss = self.sector_size()?;
        let mut bounce = [0u8; MAX_SECTOR_SIZE];
        let mut pos = offset;
        let mut done = 0usize;

        while done < buf.len() {
            let sector = self.base_sector + pos / ss as u64;
            let in_sector = (pos % ss as u64) as usize;
            let remaining = buf.len() - done;

            let len = if in_sector == 0 && remaining >= ss {
                let len = remaining - remaining % ss;
                self.disk.read_sectors(sector, &mut buf[done..done + len])?;
                len
            } else {
                let len = (ss - in_sector).min(remaining);
                self.disk.read_sectors(sector, &mut bounce[..ss])?;
                buf[done..done + len].copy_from_slice(&bounce[in_sector..in_sector + len]);
                len
            };

            done += len;
            pos += len as u64;
        }

        Ok(done)
    }
}

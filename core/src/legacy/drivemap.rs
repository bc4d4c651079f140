//! grub4dos drive-map table
//!
//! Each slot redirects one BIOS drive to a run of sectors. A loader that
//! hooks INT 13h reads the table from a page in conventional memory, found
//! by the signature stored right after the slots.

use crate::backing::{BackingStore, SECTOR_SIZE};
use crate::error::MapError;

/// Bytes per serialized slot
pub const DRIVE_MAP_SLOT_SIZE: usize = 24;
/// Slots available when booted from UEFI
pub const EFI_DRIVE_MAP_SIZE: usize = 8;
/// Slots available under a BIOS grub4dos
pub const BIOS_DRIVE_MAP_SIZE: usize = 16;

/// Marker the INT 13h hook scans for
pub const DRIVE_MAP_SIGNATURE: &[u8; 19] = b"   $INT13SFGRUB4DOS";
/// Offset of the signature inside the table page
pub const DRIVE_MAP_SIGNATURE_OFFSET: usize = 0xE0;
/// Size of the table page
pub const DRIVE_MAP_PAGE_SIZE: usize = 4096;

/// End of usable conventional memory below the EBDA
pub const CONVENTIONAL_MEMORY_TOP: u64 = 0x9F000;

const FIRST_HARD_DISK: u8 = 0x80;
const MEMORY_DRIVE: u8 = 0xFF;
const DEFAULT_MAX_HEAD: u8 = 0xFE;
const DEFAULT_TO_SECTOR: u8 = 0x02;

/// One drive redirection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveMapSlot {
    pub from_drive: u8,
    pub to_drive: u8,
    pub max_head: u8,
    pub max_sector: u8,
    pub disable_lba: bool,
    pub read_only: bool,
    pub to_cylinder: u16,
    pub from_cdrom: bool,
    pub to_cdrom: bool,
    pub to_support_lba: bool,
    pub to_head: u8,
    pub to_sector: u8,
    pub start_sector: u64,
    pub sector_count: u64,
}

impl DriveMapSlot {
    /// A slot with `from_drive == 0` is free
    pub const fn is_free(&self) -> bool {
        self.from_drive == 0
    }

    pub fn to_bytes(&self) -> [u8; DRIVE_MAP_SLOT_SIZE] {
        let mut out = [0u8; DRIVE_MAP_SLOT_SIZE];
        out[0] = self.from_drive;
        out[1] = self.to_drive;
        out[2] = self.max_head;
        out[3] = (self.max_sector & 0x3F)
            | ((self.disable_lba as u8) << 6)
            | ((self.read_only as u8) << 7);

        let packed = (self.to_cylinder & 0x1FFF)
            | ((self.from_cdrom as u16) << 13)
            | ((self.to_cdrom as u16) << 14)
            | ((self.to_support_lba as u16) << 15);
        out[4..6].copy_from_slice(&packed.to_le_bytes());

        out[6] = self.to_head;
        out[7] = self.to_sector & 0x3F;
        out[8..16].copy_from_slice(&self.start_sector.to_le_bytes());
        out[16..24].copy_from_slice(&self.sector_count.to_le_bytes());
        out
    }
}

/// Fixed-capacity table of drive redirections
#[derive(Debug, Clone)]
pub struct DriveMapTable<const N: usize> {
    slots: [DriveMapSlot; N],
}

impl<const N: usize> Default for DriveMapTable<N> {
    fn default() -> Self {
        Self {
            slots: [DriveMapSlot::default(); N],
        }
    }
}

impl<const N: usize> DriveMapTable<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[DriveMapSlot; N] {
        &self.slots
    }

    pub fn used(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_free()).count()
    }

    /// Map `store` into the first free slot and return its index.
    ///
    /// A memory store is redirected to drive 0xFF at its load address,
    /// anything else to drive 0x80 at the first sector it occupies. A full
    /// table is left untouched.
    pub fn add_drive(
        &mut self,
        store: &mut BackingStore<'_>,
        from_cdrom: bool,
    ) -> Result<usize, MapError> {
        let index = match self.slots.iter().position(DriveMapSlot::is_free) {
            Some(index) => index,
            None => {
                log::warn!("drive map: all {} slots in use", N);
                return Err(MapError::DriveSlotTableFull);
            }
        };
        let from_drive = self.next_drive().ok_or(MapError::DriveSlotTableFull)?;

        let (to_drive, start_sector) = match &mut *store {
            BackingStore::Memory(m) => (MEMORY_DRIVE, m.address() / SECTOR_SIZE),
            other => (FIRST_HARD_DISK, other.first_sector()?.unwrap_or(0)),
        };

        let slot = DriveMapSlot {
            from_drive,
            to_drive,
            max_head: DEFAULT_MAX_HEAD,
            from_cdrom,
            to_sector: DEFAULT_TO_SECTOR,
            start_sector,
            sector_count: store.size().div_ceil(SECTOR_SIZE),
            ..DriveMapSlot::default()
        };
        self.slots[index] = slot;

        log::info!(
            "drive map: slot {} 0x{:02x}->0x{:02x} start={} count={}",
            index,
            slot.from_drive,
            slot.to_drive,
            slot.start_sector,
            slot.sector_count
        );
        Ok(index)
    }

    /// Lowest hard-disk number no slot claims yet
    fn next_drive(&self) -> Option<u8> {
        (FIRST_HARD_DISK..=u8::MAX).find(|id| self.slots.iter().all(|s| s.from_drive != *id))
    }

    /// Serialize the slots back to back
    pub fn write_slots(&self, out: &mut [u8]) -> Result<(), MapError> {
        if out.len() < N * DRIVE_MAP_SLOT_SIZE {
            return Err(MapError::OutOfMemory);
        }
        for (slot, chunk) in self
            .slots
            .iter()
            .zip(out.chunks_exact_mut(DRIVE_MAP_SLOT_SIZE))
        {
            chunk.copy_from_slice(&slot.to_bytes());
        }
        Ok(())
    }
}

impl DriveMapTable<EFI_DRIVE_MAP_SIZE> {
    /// Fill the page the INT 13h hook locates by signature
    pub fn write_page(&self, page: &mut [u8; DRIVE_MAP_PAGE_SIZE]) -> Result<(), MapError> {
        page.fill(0);
        self.write_slots(&mut page[..DRIVE_MAP_SIGNATURE_OFFSET])?;
        page[DRIVE_MAP_SIGNATURE_OFFSET..DRIVE_MAP_SIGNATURE_OFFSET + DRIVE_MAP_SIGNATURE.len()]
            .copy_from_slice(DRIVE_MAP_SIGNATURE);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryKind {
    Available,
    Reserved,
}

/// One entry of the firmware memory map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRegion {
    pub base: u64,
    pub length: u64,
    pub kind: MemoryKind,
}

/// Address of the page that receives the drive-map table.
///
/// Walks the memory map in order and moves below the top of every
/// available region of at least one page that ends under 0x9F000.
pub fn conventional_memory_top(regions: &[MemoryRegion]) -> u64 {
    regions.iter().fold(CONVENTIONAL_MEMORY_TOP, |top, region| {
        if region.kind != MemoryKind::Available
            || region.base > top
            || region.length < DRIVE_MAP_PAGE_SIZE as u64
        {
            return top;
        }
        let end = region.base.saturating_add(region.length);
        if end < CONVENTIONAL_MEMORY_TOP {
            end - DRIVE_MAP_PAGE_SIZE as u64
        } else {
            top
        }
    })
}

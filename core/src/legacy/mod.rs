//! Legacy BIOS helpers
//!
//! The grub4dos drive-map table lets a chainloaded real-mode loader see a
//! mapped image as BIOS drive 0x80. The blocklist renders the disk sectors
//! a file occupies.

pub mod blocklist;
pub mod drivemap;

pub use blocklist::{BlockRun, Blocklist, BlocklistBuilder};
pub use drivemap::{
    conventional_memory_top, DriveMapSlot, DriveMapTable, MemoryKind, MemoryRegion,
    BIOS_DRIVE_MAP_SIZE, EFI_DRIVE_MAP_SIZE,
};

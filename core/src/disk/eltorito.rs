// El Torito EFI boot image as a CD partition

use super::partition::{PartitionInfo, PartitionKind, PartitionSignature};
use super::StoreBlockIo;
use crate::backing::BackingStore;
use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use iso9660::BootPlatform;

const CD_SECTOR: u64 = 2048;

/// Smallest image assumed for an EFI boot entry (1.44 MB floppy)
pub const MIN_IMAGE_SIZE: u64 = 0xB40 * 512;

/// Offset of the FAT BPB total-sector field inside the boot image
const BPB_TOTAL_SECTORS: usize = 0x13;

/// Boot entry number reported in the CDROM device-path node
pub const EFI_BOOT_ENTRY: u32 = 1;

/// Partition covering the El Torito EFI boot image, in 2048-byte blocks.
///
/// The catalog's sector count is often wrong for EFI images, so the size
/// is the larger of the catalog count and the image's own FAT sector count,
/// never less than a 1.44 MB floppy, and never past the end of the disk.
pub fn find_boot_partition(store: &mut BackingStore<'_>) -> Option<PartitionInfo> {
    let disk_size = store.size();
    let mut io = StoreBlockIo::new(store, BlockSize::new(CD_SECTOR as u32)?);

    let catalog = iso9660::find_boot_catalog(&mut io, 0).ok()?;
    let image = iso9660::find_boot_entry(&mut io, 0, catalog, BootPlatform::Efi).ok()?;

    let start = image.load_rba as u64 * CD_SECTOR;
    if start >= disk_size {
        return None;
    }

    let mut first = [0u8; CD_SECTOR as usize];
    io.read_blocks(Lba(image.load_rba as u64), &mut first).ok()?;
    let bpb_sectors =
        u16::from_le_bytes([first[BPB_TOTAL_SECTORS], first[BPB_TOTAL_SECTORS + 1]]) as u64;

    let size = image
        .declared_size()
        .max(bpb_sectors * 512)
        .max(MIN_IMAGE_SIZE)
        .min(disk_size - start);

    Some(PartitionInfo {
        kind: PartitionKind::ElTorito,
        number: EFI_BOOT_ENTRY,
        start_lba: image.load_rba as u64,
        sector_count: size.div_ceil(CD_SECTOR),
        signature: PartitionSignature::None,
    })
}

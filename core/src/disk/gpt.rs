// GPT boot partition lookup using gpt-disk-rs

use super::partition::{PartitionInfo, PartitionKind, PartitionSignature};
use super::StoreBlockIo;
use crate::backing::BackingStore;
use gpt_disk_io::Disk;
use gpt_disk_types::{BlockSize, GptPartitionType};

/// The first EFI System Partition, else the first used entry.
///
/// Requires a primary header with the `EFI PART` signature at LBA 1.
pub fn find_boot_partition(store: &mut BackingStore<'_>) -> Option<PartitionInfo> {
    let mut disk = Disk::new(StoreBlockIo::new(store, BlockSize::BS_512)).ok()?;

    let header = disk.read_primary_gpt_header(&mut [0u8; 512]).ok()?;
    if !header.is_signature_valid() {
        log::debug!("GPT header signature missing");
        return None;
    }

    let layout = header.get_partition_entry_array_layout().ok()?;
    let mut block = [0u8; 512];
    let iter = disk.gpt_partition_entry_array_iter(layout, &mut block).ok()?;

    let mut first_used = None;
    for (index, entry) in iter.enumerate() {
        let Ok(entry) = entry else {
            break;
        };
        if !entry.is_used() {
            continue;
        }

        let start = entry.starting_lba.to_u64();
        let end = entry.ending_lba.to_u64();
        if end < start {
            continue;
        }

        let info = PartitionInfo {
            kind: PartitionKind::Gpt,
            number: index as u32 + 1,
            start_lba: start,
            sector_count: end - start + 1,
            signature: PartitionSignature::Gpt(entry.unique_partition_guid),
        };

        // Copy the guid to avoid unaligned reference
        let partition_type = entry.partition_type_guid;
        if partition_type == GptPartitionType::EFI_SYSTEM {
            return Some(info);
        }
        first_used.get_or_insert(info);
    }

    first_used
}

// Boot partition information

use super::{eltorito, gpt, mbr::Mbr, ImageType};
use crate::backing::BackingStore;
use uguid::Guid;

/// Where the partition came from
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartitionKind {
    Mbr,
    Gpt,
    ElTorito,
}

/// Identity recorded in the partition's device-path node
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartitionSignature {
    None,
    Mbr(u32),
    Gpt(Guid),
}

/// Partition in the parent disk's block units
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PartitionInfo {
    pub kind: PartitionKind,
    /// 1-based table index (El Torito: boot entry number)
    pub number: u32,
    pub start_lba: u64,
    pub sector_count: u64,
    pub signature: PartitionSignature,
}

impl PartitionInfo {
    /// Last block of the partition in parent units, `None` if empty
    pub fn end_lba(&self) -> Option<u64> {
        self.start_lba
            .checked_add(self.sector_count)?
            .checked_sub(1)
    }

    /// Whether the partition lies entirely within blocks `0..=last_block`
    pub fn fits(&self, last_block: u64) -> bool {
        self.sector_count > 0 && self.end_lba().is_some_and(|end| end <= last_block)
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            PartitionKind::Mbr => "MBR",
            PartitionKind::Gpt => "GPT",
            PartitionKind::ElTorito => "El Torito",
        }
    }
}

/// Find the partition firmware should boot from.
///
/// Floppy images have none. Entries that do not fit inside the disk are
/// ignored, as are read errors while looking.
pub fn find_boot_partition(
    store: &mut BackingStore<'_>,
    image_type: ImageType,
    last_block: u64,
) -> Option<PartitionInfo> {
    let found = match image_type {
        ImageType::Fd => None,
        ImageType::Mbr => {
            let mut sector0 = [0u8; 512];
            store.read_at(&mut sector0, 0).ok()?;
            Mbr::parse(&sector0).boot_partition()
        }
        ImageType::Gpt => gpt::find_boot_partition(store),
        ImageType::Cd => eltorito::find_boot_partition(store),
    }?;

    if !found.fits(last_block) {
        log::warn!(
            "{} partition {} at {:#x}+{:#x} lies outside the disk",
            found.type_name(),
            found.number,
            found.start_lba,
            found.sector_count
        );
        return None;
    }

    log::info!(
        "{} boot partition {}: start={:#x} count={:#x}",
        found.type_name(),
        found.number,
        found.start_lba,
        found.sector_count
    );
    Some(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(start: u64, count: u64) -> PartitionInfo {
        PartitionInfo {
            kind: PartitionKind::Mbr,
            number: 1,
            start_lba: start,
            sector_count: count,
            signature: PartitionSignature::None,
        }
    }

    #[test]
    fn test_fits() {
        assert!(info(0, 100).fits(99));
        assert!(!info(1, 100).fits(99));
        assert!(!info(10, 0).fits(99));
        assert!(!info(u64::MAX, 2).fits(u64::MAX));
    }
}

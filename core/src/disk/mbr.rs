// Master Boot Record parsing
//
// Byte offsets within sector 0:
//   440  disk signature (u32 LE)
//   446  four 16-byte partition entries
//   510  boot signature 0x55 0xAA

use super::partition::{PartitionInfo, PartitionKind, PartitionSignature};

pub const DISK_SIGNATURE_OFFSET: usize = 440;
pub const PARTITION_TABLE_OFFSET: usize = 446;
pub const BOOT_SIGNATURE_OFFSET: usize = 510;
pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];

/// Partition type of the single entry covering a GPT disk
pub const PROTECTIVE_TYPE: u8 = 0xEE;

/// Boot indicator of the active partition
pub const ACTIVE_FLAG: u8 = 0x80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MbrEntry {
    pub boot_indicator: u8,
    pub partition_type: u8,
    pub start_lba: u32,
    pub sector_count: u32,
}

impl MbrEntry {
    fn parse(raw: &[u8]) -> Self {
        Self {
            boot_indicator: raw[0],
            partition_type: raw[4],
            start_lba: u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]),
            sector_count: u32::from_le_bytes([raw[12], raw[13], raw[14], raw[15]]),
        }
    }

    pub fn is_active(&self) -> bool {
        self.boot_indicator == ACTIVE_FLAG
    }

    pub fn is_used(&self) -> bool {
        self.partition_type != 0 && self.sector_count != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mbr {
    pub disk_signature: u32,
    pub entries: [MbrEntry; 4],
    boot_signature: [u8; 2],
}

impl Mbr {
    pub fn parse(sector: &[u8; 512]) -> Self {
        let mut entries = [MbrEntry::default(); 4];
        for (i, entry) in entries.iter_mut().enumerate() {
            let at = PARTITION_TABLE_OFFSET + i * 16;
            *entry = MbrEntry::parse(&sector[at..at + 16]);
        }
        let sig = &sector[DISK_SIGNATURE_OFFSET..DISK_SIGNATURE_OFFSET + 4];
        Self {
            disk_signature: u32::from_le_bytes([sig[0], sig[1], sig[2], sig[3]]),
            entries,
            boot_signature: [sector[BOOT_SIGNATURE_OFFSET], sector[BOOT_SIGNATURE_OFFSET + 1]],
        }
    }

    pub fn has_boot_signature(&self) -> bool {
        self.boot_signature == BOOT_SIGNATURE
    }

    /// First entry is the GPT protective partition
    pub fn is_protective(&self) -> bool {
        self.entries[0].partition_type == PROTECTIVE_TYPE
    }

    /// The active entry, or the first used one when none is marked active
    pub fn boot_entry(&self) -> Option<(usize, MbrEntry)> {
        let active = self.entries.iter().position(|e| e.is_active() && e.is_used());
        let index = active.or_else(|| self.entries.iter().position(MbrEntry::is_used))?;
        Some((index, self.entries[index]))
    }

    /// Boot partition in 512-byte sectors
    pub fn boot_partition(&self) -> Option<PartitionInfo> {
        let (index, entry) = self.boot_entry()?;
        Some(PartitionInfo {
            kind: PartitionKind::Mbr,
            number: index as u32 + 1,
            start_lba: entry.start_lba as u64,
            sector_count: entry.sector_count as u64,
            signature: PartitionSignature::Mbr(self.disk_signature),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sector_with(entries: &[(usize, u8, u8, u32, u32)]) -> [u8; 512] {
        let mut s = [0u8; 512];
        s[440..444].copy_from_slice(&0xDEADBEEFu32.to_le_bytes());
        for &(i, flag, ty, start, count) in entries {
            let at = 446 + i * 16;
            s[at] = flag;
            s[at + 4] = ty;
            s[at + 8..at + 12].copy_from_slice(&start.to_le_bytes());
            s[at + 12..at + 16].copy_from_slice(&count.to_le_bytes());
        }
        s[510] = 0x55;
        s[511] = 0xAA;
        s
    }

    #[test]
    fn test_active_entry_wins() {
        let mbr = Mbr::parse(&sector_with(&[(0, 0, 0x83, 2048, 100), (2, 0x80, 0x0C, 4096, 200)]));
        let part = mbr.boot_partition().expect("partition");
        assert_eq!(part.number, 3);
        assert_eq!(part.start_lba, 4096);
        assert_eq!(part.sector_count, 200);
        assert_eq!(part.signature, PartitionSignature::Mbr(0xDEADBEEF));
    }

    #[test]
    fn test_first_used_without_active() {
        let mbr = Mbr::parse(&sector_with(&[(1, 0, 0x07, 63, 1000), (3, 0, 0x83, 5000, 10)]));
        assert_eq!(mbr.boot_partition().map(|p| p.number), Some(2));
    }

    #[test]
    fn test_empty_table() {
        let mbr = Mbr::parse(&sector_with(&[]));
        assert!(mbr.has_boot_signature());
        assert!(!mbr.is_protective());
        assert!(mbr.boot_partition().is_none());
    }
}

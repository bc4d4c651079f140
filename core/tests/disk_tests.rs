//! Virtual disks over a region of a real disk

mod common;

use common::mbr_image;
use vmap_core::backing::{BackingStore, DiskRegion, SectorDevice};
use vmap_core::disk::ImageType;
use vmap_core::error::{BlockIoError, IoError};
use vmap_core::legacy::{DriveMapTable, BIOS_DRIVE_MAP_SIZE};
use vmap_core::map::{self, MapOptions};
use vmap_core::vdisk::{VirtualBlockIo, VDISK_MEDIA_ID};

/// Host disk with 4K native sectors
struct HostDisk {
    data: Vec<u8>,
}

impl SectorDevice for HostDisk {
    fn sector_size(&self) -> u32 {
        4096
    }

    fn total_sectors(&self) -> u64 {
        (self.data.len() / 4096) as u64
    }

    fn read_sectors(&mut self, lba: u64, buf: &mut [u8]) -> Result<(), IoError> {
        let start = lba as usize * 4096;
        let src = self.data.get(start..start + buf.len()).ok_or(IoError::ReadFailed)?;
        buf.copy_from_slice(src);
        Ok(())
    }
}

/// 1 MiB of padding followed by an MBR image in the remaining space
fn host_with_image() -> HostDisk {
    let mut data = vec![0u8; 1024 * 1024];
    let mut image = mbr_image(2048, 0xCAFE_F00D, &[(true, 0x0C, 8, 2000)]);
    image[8 * 512] = 0xEB;
    image[2047 * 512 + 511] = 0x77;
    data.extend_from_slice(&image);
    HostDisk { data }
}

#[test]
fn test_region_maps_like_an_image() {
    let mut host = host_with_image();
    let region = DiskRegion::new(&mut host, 256);
    let disk = map::prepare(&MapOptions::new("hd0,1"), BackingStore::Disk(region)).expect("prepare");

    assert_eq!(disk.image_type(), ImageType::Mbr);
    assert_eq!(disk.last_block(), 2047);

    let mut last = [0u8; 512];
    disk.read_blocks(VDISK_MEDIA_ID, 2047, &mut last).expect("read");
    assert_eq!(last[511], 0x77);

    let io = disk.partition_io().expect("partition");
    let mut first = [0u8; 1024];
    io.read_blocks(VDISK_MEDIA_ID, 0, &mut first).expect("read");
    assert_eq!(first[0], 0xEB);
}

#[test]
fn test_read_checks() {
    let mut host = host_with_image();
    let region = DiskRegion::new(&mut host, 256);
    let disk = map::prepare(&MapOptions::new("hd0,1"), BackingStore::Disk(region)).expect("prepare");
    let mut buf = [0u8; 1024];

    assert_eq!(disk.read_blocks(2, 0, &mut buf), Err(BlockIoError::MediaChanged));
    assert_eq!(disk.read_blocks(VDISK_MEDIA_ID, 0, &mut buf[..100]), Err(BlockIoError::BadBufferSize));
    assert_eq!(disk.read_blocks(VDISK_MEDIA_ID, 2048, &mut buf), Err(BlockIoError::InvalidParameter));
    assert_eq!(disk.read_blocks(VDISK_MEDIA_ID, 2047, &mut buf), Err(BlockIoError::InvalidParameter));
    assert_eq!(disk.read_blocks(VDISK_MEDIA_ID, u64::MAX, &mut []), Ok(()));
    assert_eq!(disk.write_blocks(VDISK_MEDIA_ID, 0, &buf), Err(BlockIoError::WriteProtected));
}

#[test]
fn test_drive_map_points_at_region() {
    let mut host = host_with_image();
    let mut store = BackingStore::Disk(DiskRegion::new(&mut host, 256));
    let mut table = DriveMapTable::<BIOS_DRIVE_MAP_SIZE>::new();
    table.add_drive(&mut store, false).expect("slot");

    let slot = table.slots()[0];
    assert_eq!(slot.from_drive, 0x80);
    assert_eq!(slot.to_drive, 0x80);
    // 256 sectors of 4096 bytes
    assert_eq!(slot.start_sector, 2048);
    assert_eq!(slot.sector_count, 2048);
}

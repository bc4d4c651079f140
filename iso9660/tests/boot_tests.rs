//! Boot tests (El Torito)

mod common;

use common::IsoBuilder;
use iso9660::boot::BootCatalog;
use iso9660::{find_boot_catalog, find_boot_entry, BootPlatform, Iso9660Error};

#[test]
fn test_efi_section_entry() {
    let mut device = IsoBuilder::new()
        .with_boot_catalog(20)
        .initial_entry(0x00, true, 30, 4)
        .section(0xEF, vec![(true, 32, 2880)])
        .build();

    let catalog = find_boot_catalog(&mut device, 0).expect("boot record");
    let image = find_boot_entry(&mut device, 0, catalog, BootPlatform::Efi).expect("efi entry");

    assert!(image.bootable);
    assert_eq!(image.platform, BootPlatform::Efi);
    assert_eq!(image.load_rba, 32);
    assert_eq!(image.sector_count, 2880);
    assert_eq!(image.declared_size(), 2880 * 512);
}

#[test]
fn test_initial_entry_for_efi_validation_platform() {
    let mut device = IsoBuilder::new()
        .with_boot_catalog(20)
        .initial_entry(0xEF, true, 40, 8)
        .build();

    let image = find_boot_entry(&mut device, 0, 20, BootPlatform::Efi).expect("initial entry");
    assert_eq!(image.load_rba, 40);
}

#[test]
fn test_skips_non_bootable_entries() {
    let mut device = IsoBuilder::new()
        .with_boot_catalog(20)
        .initial_entry(0x00, true, 30, 4)
        .section(0x00, vec![(true, 31, 4)])
        .section(0xEF, vec![(false, 33, 4), (true, 34, 4)])
        .build();

    let image = find_boot_entry(&mut device, 0, 20, BootPlatform::Efi).expect("efi entry");
    assert_eq!(image.load_rba, 34);

    let bios = find_boot_entry(&mut device, 0, 20, BootPlatform::X86).expect("bios entry");
    assert_eq!(bios.load_rba, 30);
}

#[test]
fn test_no_efi_entry() {
    let mut device = IsoBuilder::new()
        .with_boot_catalog(20)
        .initial_entry(0x00, true, 30, 4)
        .build();

    let result = find_boot_entry(&mut device, 0, 20, BootPlatform::Efi);
    assert_eq!(result, Err(Iso9660Error::NoBootEntry));
}

#[test]
fn test_invalid_boot_catalog_signature() {
    let mut device = IsoBuilder::new()
        .with_boot_catalog(20)
        .initial_entry(0xEF, true, 30, 4)
        .build();
    device.data[20 * 2048 + 30] = 0x00;

    let result = find_boot_entry(&mut device, 0, 20, BootPlatform::Efi);
    assert_eq!(result, Err(Iso9660Error::InvalidBootCatalog));
}

#[test]
fn test_checksum_mismatch() {
    let mut device = IsoBuilder::new()
        .with_boot_catalog(20)
        .initial_entry(0xEF, true, 30, 4)
        .build();
    device.data[20 * 2048 + 5] ^= 0xFF;

    let result = find_boot_entry(&mut device, 0, 20, BootPlatform::Efi);
    assert_eq!(result, Err(Iso9660Error::ChecksumFailed));
}

#[test]
fn test_catalog_entry_walk() {
    let device = IsoBuilder::new()
        .with_boot_catalog(20)
        .initial_entry(0x00, true, 30, 4)
        .section(0x00, vec![(true, 31, 4)])
        .section(0xEF, vec![(true, 32, 4), (false, 33, 4)])
        .build();

    let catalog = BootCatalog::parse(&device.data[20 * 2048..21 * 2048]).expect("catalog");
    let walked: Vec<_> = catalog.entries().map(|(p, e)| (p, e.load_rba)).collect();
    assert_eq!(
        walked,
        vec![
            (BootPlatform::X86, 30),
            (BootPlatform::X86, 31),
            (BootPlatform::Efi, 32),
            (BootPlatform::Efi, 33),
        ]
    );
}

// Boot image selection

use super::platform::{ImageHandle, Platform};
use crate::error::MapError;
use crate::vdisk::VirtualDisk;
use alloc::vec::Vec;

/// Removable-media boot file for the architecture this crate is built for
#[cfg(target_arch = "x86_64")]
pub const REMOVABLE_MEDIA_FILE: &str = "\\EFI\\BOOT\\BOOTX64.EFI";
#[cfg(target_arch = "x86")]
pub const REMOVABLE_MEDIA_FILE: &str = "\\EFI\\BOOT\\BOOTIA32.EFI";
#[cfg(target_arch = "aarch64")]
pub const REMOVABLE_MEDIA_FILE: &str = "\\EFI\\BOOT\\BOOTAA64.EFI";
#[cfg(target_arch = "arm")]
pub const REMOVABLE_MEDIA_FILE: &str = "\\EFI\\BOOT\\BOOTARM.EFI";
#[cfg(target_arch = "riscv64")]
pub const REMOVABLE_MEDIA_FILE: &str = "\\EFI\\BOOT\\BOOTRISCV64.EFI";
#[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "x86",
    target_arch = "aarch64",
    target_arch = "arm",
    target_arch = "riscv64"
)))]
pub const REMOVABLE_MEDIA_FILE: &str = "\\EFI\\BOOT\\BOOTX64.EFI";

/// Load the boot file from a published virtual disk.
///
/// Tries the registered partition first, then every file system whose
/// device path lies on a virtual disk.
pub fn select_boot_image<P: Platform + ?Sized>(
    disk: &VirtualDisk<'_>,
    platform: &mut P,
) -> Result<ImageHandle, MapError> {
    if let Some(part) = disk.partition().filter(|p| p.registration().is_registered()) {
        let path = part.device_path().with_file(REMOVABLE_MEDIA_FILE);
        log::info!("LoadImage {}", path);
        match platform.load_image(&path) {
            Ok(image) => return Ok(image),
            Err(e) => log::warn!("LoadImage failed: {}", e),
        }
    }

    let handles = platform.file_system_handles().unwrap_or_else(|e| {
        log::warn!("file system enumeration failed: {}", e);
        Vec::new()
    });

    for (_, fs_path) in handles.iter().filter(|(_, p)| p.is_vdisk()) {
        let path = fs_path.with_file(REMOVABLE_MEDIA_FILE);
        log::info!("LoadImage {}", path);
        if let Ok(image) = platform.load_image(&path) {
            return Ok(image);
        }
    }

    log::error!("boot file not found on virtual disk");
    Err(MapError::NoBootImage)
}

//! vmap UEFI binding
//!
//! Publishes a mapped disk image to firmware as Block I/O devices and boots
//! the removable-media loader found on it. The image handling itself lives
//! in `vmap-core`; this crate supplies the `#[repr(C)]` protocol structs,
//! the `efiapi` callbacks and the `Platform` implementation.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod console;
pub mod device;
pub mod platform;
pub mod uefi;

pub use console::Console;
pub use device::EfiBlockDevice;
pub use platform::EfiPlatform;

use log::LevelFilter;
use vmap_core::backing::BackingStore;
use vmap_core::error::MapError;
use vmap_core::map::{self, ImageHandle, MapOptions};

/// Map `store` and load the boot file from it.
///
/// Returns the platform holding the published devices together with the
/// loaded image; start it with `Platform::start_image`. On failure the
/// diagnostics recorded so far are printed on the console.
///
/// # Safety
/// `system_table` and `image_handle` must be the ones passed to the image
/// entry point, and boot services must still be available.
pub unsafe fn map_image(
    system_table: *const uefi::boot_services::SystemTable,
    image_handle: *mut (),
    options: &MapOptions,
    store: BackingStore<'static>,
) -> Result<(EfiPlatform, ImageHandle), MapError> {
    vmap_core::logger::init(LevelFilter::Info);

    let st = &*system_table;
    let disk = match map::prepare(options, store) {
        Ok(disk) => disk,
        Err(e) => {
            log::error!("map {}: {}", options.filename, e);
            Console::new(st.con_out).flush_log();
            return Err(e);
        }
    };

    let mut platform = EfiPlatform::new(system_table, image_handle, disk);
    match platform.publish(options) {
        Ok(image) => Ok((platform, image)),
        Err(e) => {
            log::error!("map {}: {}", options.filename, e);
            platform.console().flush_log();
            Err(e)
        }
    }
}

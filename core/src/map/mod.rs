//! The `map` command
//!
//! Turns an opened image into a booted virtual disk:
//! prepare (optional copy to memory, classification, geometry and
//! partition discovery), publish (installation, optional pause, boot
//! image selection) and finally boot.

pub mod boot;
pub mod install;
pub mod platform;

pub use boot::{select_boot_image, REMOVABLE_MEDIA_FILE};
pub use install::install;
pub use platform::{DeviceHandle, DeviceRole, ImageHandle, Platform};

use crate::backing::BackingStore;
use crate::disk::{classify, TypeHint};
use crate::error::MapError;
use crate::vdisk::VirtualDisk;
use alloc::string::String;

/// Options of one `map` invocation.
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    /// Copy the image into memory before mapping
    pub mem: bool,
    /// Wait for a key after installation
    pub pause: bool,
    /// Skip detection and use this image type
    pub type_hint: Option<TypeHint>,
    /// Path of the image, used for logging and extension checks
    pub filename: String,
    /// Clear the read-only media flag (writes are still refused)
    pub writable: bool,
}

impl MapOptions {
    pub fn new(filename: &str) -> Self {
        Self {
            filename: String::from(filename),
            ..Default::default()
        }
    }

    pub fn with_mem(mut self, mem: bool) -> Self {
        self.mem = mem;
        self
    }

    pub fn with_pause(mut self, pause: bool) -> Self {
        self.pause = pause;
        self
    }

    pub fn with_type_hint(mut self, hint: TypeHint) -> Self {
        self.type_hint = Some(hint);
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }
}

/// Build the virtual disk for `store`. Nothing is published yet.
pub fn prepare<'a>(options: &MapOptions, store: BackingStore<'a>) -> Result<VirtualDisk<'a>, MapError> {
    let mut store = if options.mem { store.into_memory()? } else { store };

    let name = if options.filename.is_empty() {
        String::from(store.name())
    } else {
        options.filename.clone()
    };
    let image_type = classify(&mut store, &name, options.type_hint);

    VirtualDisk::new(store, image_type, options.writable)
}

/// Install `disk`, optionally pause, and load its boot image
pub fn publish<P: Platform + ?Sized>(
    disk: &VirtualDisk<'_>,
    options: &MapOptions,
    platform: &mut P,
) -> Result<ImageHandle, MapError> {
    install(disk, platform)?;

    if options.pause {
        log::info!("Press any key to continue");
        platform.wait_for_key();
    }

    select_boot_image(disk, platform)
}

/// A mapped disk and its loaded boot image.
///
/// Dropping the session frees an in-memory image.
pub struct MapSession<'a> {
    pub disk: VirtualDisk<'a>,
    pub image: ImageHandle,
}

impl MapSession<'_> {
    /// Hand control to the boot image
    pub fn boot<P: Platform + ?Sized>(&self, platform: &mut P) -> Result<(), MapError> {
        platform.start_image(self.image).map_err(MapError::BootFailed)
    }
}

/// Prepare and publish in one step
pub fn run<'a, P: Platform + ?Sized>(
    options: &MapOptions,
    store: BackingStore<'a>,
    platform: &mut P,
) -> Result<MapSession<'a>, MapError> {
    let disk = prepare(options, store)?;
    let image = publish(&disk, options, platform)?;
    Ok(MapSession { disk, image })
}

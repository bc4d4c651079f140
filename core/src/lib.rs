//! vmap Core Library
//!
//! Virtual block devices over disk images: backing stores, image-type
//! detection, partition discovery, the block I/O engine, device paths,
//! firmware registration and boot selection, plus the legacy drive-map
//! and blocklist helpers.
//! Designed to be no_std compatible.

#![no_std]
#![allow(clippy::new_without_default)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod backing;
pub mod disk;
pub mod error;
pub mod legacy;
pub mod logger;
pub mod map;
pub mod vdisk;

pub use backing::BackingStore;
pub use disk::ImageType;
pub use error::{BlockIoError, IoError, MapError};
pub use map::{MapOptions, Platform};
pub use vdisk::{VirtualBlockIo, VirtualDisk};

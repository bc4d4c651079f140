//! ISO9660 volume probing and El Torito boot catalog parsing
//!
//! A `no_std` crate for recognising optical-disc images and locating the
//! El Torito boot image that firmware would start from them.
//!
//! # Overview
//!
//! Only the parts of ISO9660 a virtual block device needs are covered:
//! - Volume descriptor probing (`CD001` at sectors 16+)
//! - Boot Record volume descriptor lookup (El Torito catalog location)
//! - Boot catalog parsing: validation entry, initial entry and
//!   section headers with their section entries
//!
//! # Usage
//!
//! ```ignore
//! use iso9660::{probe, find_boot_catalog, find_boot_entry, BootPlatform};
//!
//! if probe(&mut block_io, 0).is_some() {
//!     let catalog = find_boot_catalog(&mut block_io, 0)?;
//!     let entry = find_boot_entry(&mut block_io, catalog, BootPlatform::Efi)?;
//! }
//! ```

#![no_std]
#![warn(missing_docs)]

pub mod boot;
pub mod error;
pub mod types;
pub mod utils;
pub mod volume;

pub use error::{Iso9660Error, Result};
pub use types::{BootImage, BootMediaType, BootPlatform, VolumeDescriptorType};

// High-level API exports
pub use boot::find_boot_entry;
pub use volume::{find_boot_catalog, probe};

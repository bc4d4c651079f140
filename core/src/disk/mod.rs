//! Image classification and partition discovery
//!
//! Decides what kind of image a backing store holds and, for partitioned
//! images, which partition firmware should boot from.

pub mod eltorito;
pub mod gpt;
pub mod mbr;
pub mod partition;
pub mod store_io;

pub use partition::{find_boot_partition, PartitionInfo, PartitionKind, PartitionSignature};
pub use store_io::StoreBlockIo;

use crate::backing::BackingStore;
use core::fmt;
use core::str::FromStr;
use gpt_disk_types::BlockSize;
use mbr::Mbr;

/// What a backing store holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    /// Optical disc image (2048-byte sectors)
    Cd,
    /// Unpartitioned floppy or superfloppy image
    Fd,
    /// MBR partitioned hard disk image
    Mbr,
    /// GPT partitioned hard disk image
    Gpt,
}

impl ImageType {
    /// Sector size the virtual disk presents
    pub fn block_size(&self) -> u32 {
        match self {
            Self::Cd => 2048,
            _ => 512,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cd => "CD",
            Self::Fd => "FD",
            Self::Mbr => "MBR",
            Self::Gpt => "GPT",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller override for image detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    Cd,
    Hd,
    Fd,
}

/// Unrecognised `--type` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownTypeHint;

impl fmt::Display for UnknownTypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown image type, expected cd, hd or fd")
    }
}

impl FromStr for TypeHint {
    type Err = UnknownTypeHint;

    /// Only the first letter matters: `cd`, `CDROM` and `c` all select CD.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes().first().map(u8::to_ascii_lowercase) {
            Some(b'c') => Ok(Self::Cd),
            Some(b'h') => Ok(Self::Hd),
            Some(b'f') => Ok(Self::Fd),
            _ => Err(UnknownTypeHint),
        }
    }
}

/// File extensions treated as optical images without looking inside
const OPTICAL_EXTENSIONS: &[&str] = &[".iso"];

fn has_optical_extension(name: &str) -> bool {
    OPTICAL_EXTENSIONS.iter().any(|ext| {
        name.len() >= ext.len()
            && name.is_char_boundary(name.len() - ext.len())
            && name[name.len() - ext.len()..].eq_ignore_ascii_case(ext)
    })
}

/// Read the first 512 bytes, `None` if the store is shorter
fn read_sector0(store: &mut BackingStore<'_>) -> Option<[u8; 512]> {
    let mut sector = [0u8; 512];
    store.read_at(&mut sector, 0).ok()?;
    Some(sector)
}

/// MBR vs GPT from sector 0 alone
fn hard_disk_kind(sector0: Option<&[u8; 512]>) -> ImageType {
    match sector0.map(Mbr::parse) {
        Some(mbr) if mbr.is_protective() => ImageType::Gpt,
        _ => ImageType::Mbr,
    }
}

fn is_optical(store: &mut BackingStore<'_>) -> bool {
    let Some(block_size) = BlockSize::new(2048) else {
        return false;
    };
    let mut io = StoreBlockIo::new(store, block_size);
    iso9660::probe(&mut io, 0).is_some()
}

/// Decide the image type of `store`, whose file name is `name`.
///
/// The result depends only on the store's bytes, the name and the hint.
/// Stores too short for a check simply fail that check; the fallback is
/// a floppy image.
pub fn classify(store: &mut BackingStore<'_>, name: &str, hint: Option<TypeHint>) -> ImageType {
    let image_type = match hint {
        Some(TypeHint::Cd) => ImageType::Cd,
        Some(TypeHint::Fd) => ImageType::Fd,
        Some(TypeHint::Hd) => hard_disk_kind(read_sector0(store).as_ref()),
        None => detect(store, name),
    };
    log::debug!("image {:?} detected as {}", name, image_type);
    image_type
}

fn detect(store: &mut BackingStore<'_>, name: &str) -> ImageType {
    if has_optical_extension(name) || is_optical(store) {
        return ImageType::Cd;
    }

    match read_sector0(store) {
        Some(sector0) if Mbr::parse(&sector0).has_boot_signature() => {
            hard_disk_kind(Some(&sector0))
        }
        _ => ImageType::Fd,
    }
}

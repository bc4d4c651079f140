//! Error types for ISO9660 operations

use core::fmt;

/// Result type for ISO9660 operations
pub type Result<T> = core::result::Result<T, Iso9660Error>;

/// Errors that can occur during ISO9660 operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iso9660Error {
    /// I/O error reading from block device
    IoError,

    /// Invalid volume descriptor signature
    InvalidSignature,

    /// Boot record not found
    NoBootRecord,

    /// Invalid boot catalog
    InvalidBootCatalog,

    /// Validation entry checksum failed
    ChecksumFailed,

    /// No bootable entry for the requested platform
    NoBootEntry,
}

impl Iso9660Error {
    /// Short human readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::IoError => "I/O error reading block device",
            Self::InvalidSignature => "Invalid volume descriptor signature",
            Self::NoBootRecord => "Boot record volume descriptor not found",
            Self::InvalidBootCatalog => "Invalid El Torito boot catalog",
            Self::ChecksumFailed => "Validation entry checksum failed",
            Self::NoBootEntry => "No bootable catalog entry for platform",
        }
    }
}

impl fmt::Display for Iso9660Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

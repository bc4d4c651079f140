//! Error types for the mapping layer
//!
//! Plain `Copy` enums with a static description, following the same
//! pattern throughout the crate: I/O failures from a backing store,
//! block I/O status codes, and the errors of the `map` command itself.

use core::fmt;

/// Failures reading a backing store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// Requested range extends past the end of the store
    OutOfRange,
    /// The underlying medium reported a read failure
    ReadFailed,
    /// The file has no sectors on a disk (e.g. it lives in memory)
    NotDiskBacked,
    /// Disk sector size is zero or larger than the bounce buffer
    UnsupportedSectorSize,
}

impl IoError {
    /// Get a human-readable description of the error
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfRange => "Read beyond end of backing store",
            Self::ReadFailed => "Backing store read failed",
            Self::NotDiskBacked => "File is not stored on a disk",
            Self::UnsupportedSectorSize => "Unsupported disk sector size",
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Block I/O results, one per firmware status the engine can return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockIoError {
    /// Caller's media id does not match the device
    MediaChanged,
    /// Transfer length is not a multiple of the block size
    BadBufferSize,
    /// LBA range outside the device, or a malformed request
    InvalidParameter,
    /// Every write is refused
    WriteProtected,
    /// The backing store failed underneath a valid request
    Device(IoError),
}

impl BlockIoError {
    /// Get a human-readable description of the error
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MediaChanged => "Media changed",
            Self::BadBufferSize => "Buffer size is not a multiple of the block size",
            Self::InvalidParameter => "Invalid parameter",
            Self::WriteProtected => "Write protected",
            Self::Device(_) => "Device error",
        }
    }
}

impl fmt::Display for BlockIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(e) => write!(f, "{}: {}", self.as_str(), e),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl From<IoError> for BlockIoError {
    fn from(e: IoError) -> Self {
        Self::Device(e)
    }
}

/// Raw status returned by a platform service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformError(pub usize);

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "platform status {:#x}", self.0)
    }
}

/// Which installation step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStage {
    /// The disk was already published
    AlreadyRegistered,
    /// Publishing the partition device
    Partition,
    /// Connecting drivers to the partition device
    PartitionConnect,
    /// Publishing the whole-disk device
    Disk,
    /// Connecting drivers to the whole-disk device
    DiskConnect,
}

impl InstallStage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyRegistered => "virtual disk already installed",
            Self::Partition => "failed to install partition block device",
            Self::PartitionConnect => "failed to connect partition drivers",
            Self::Disk => "failed to install disk block device",
            Self::DiskConnect => "failed to connect disk drivers",
        }
    }
}

/// Installation failure with the step and the platform status behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallError {
    pub stage: InstallStage,
    pub cause: Option<PlatformError>,
    /// The partition device was published before the failure
    pub partition_registered: bool,
}

impl InstallError {
    /// True when the partition got published but the disk did not finish
    pub fn is_partial(&self) -> bool {
        self.partition_registered
            && matches!(self.stage, InstallStage::Disk | InstallStage::DiskConnect)
    }
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cause {
            Some(cause) => write!(f, "{} ({})", self.stage.as_str(), cause),
            None => f.write_str(self.stage.as_str()),
        }
    }
}

/// Errors of the `map` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// Copying the image into memory could not allocate
    OutOfMemory,
    /// Zero-length image
    EmptyImage,
    /// Backing store failure
    Io(IoError),
    /// Registration with the platform failed
    InstallationFailed(InstallError),
    /// No loadable boot file on the mapped devices
    NoBootImage,
    /// The platform refused to start the boot image
    BootFailed(PlatformError),
    /// Every drive-map slot is taken
    DriveSlotTableFull,
}

impl MapError {
    /// Get a human-readable description of the error
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "Out of memory",
            Self::EmptyImage => "Image is empty",
            Self::Io(_) => "Backing store I/O error",
            Self::InstallationFailed(_) => "Failed to install virtual disk",
            Self::NoBootImage => "No boot image found on virtual disk",
            Self::BootFailed(_) => "Failed to start boot image",
            Self::DriveSlotTableFull => "Drive map slot table is full",
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{}: {}", self.as_str(), e),
            Self::InstallationFailed(e) => write!(f, "{}: {}", self.as_str(), e),
            Self::BootFailed(e) => write!(f, "{}: {}", self.as_str(), e),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl From<IoError> for MapError {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

impl From<InstallError> for MapError {
    fn from(e: InstallError) -> Self {
        Self::InstallationFailed(e)
    }
}

// EFI status codes and their mapping from the core error types

use core::mem::size_of;
use vmap_core::error::{BlockIoError, IoError, PlatformError};

pub const EFI_SUCCESS: usize = 0;
pub const EFI_ERROR_BIT: usize = 1usize << (size_of::<usize>() * 8 - 1);
pub const EFI_INVALID_PARAMETER: usize = EFI_ERROR_BIT | 2;
pub const EFI_UNSUPPORTED: usize = EFI_ERROR_BIT | 3;
pub const EFI_BAD_BUFFER_SIZE: usize = EFI_ERROR_BIT | 4;
pub const EFI_BUFFER_TOO_SMALL: usize = EFI_ERROR_BIT | 5;
pub const EFI_NOT_READY: usize = EFI_ERROR_BIT | 6;
pub const EFI_DEVICE_ERROR: usize = EFI_ERROR_BIT | 7;
pub const EFI_WRITE_PROTECTED: usize = EFI_ERROR_BIT | 8;
pub const EFI_OUT_OF_RESOURCES: usize = EFI_ERROR_BIT | 9;
pub const EFI_MEDIA_CHANGED: usize = EFI_ERROR_BIT | 13;
pub const EFI_NOT_FOUND: usize = EFI_ERROR_BIT | 14;

pub const fn is_error(status: usize) -> bool {
    status & EFI_ERROR_BIT != 0
}

/// Status returned to firmware for a block I/O result
pub fn block_io_status(result: Result<(), BlockIoError>) -> usize {
    match result {
        Ok(()) => EFI_SUCCESS,
        Err(BlockIoError::MediaChanged) => EFI_MEDIA_CHANGED,
        Err(BlockIoError::BadBufferSize) => EFI_BAD_BUFFER_SIZE,
        Err(BlockIoError::InvalidParameter) => EFI_INVALID_PARAMETER,
        Err(BlockIoError::WriteProtected) => EFI_WRITE_PROTECTED,
        Err(BlockIoError::Device(_)) => EFI_DEVICE_ERROR,
    }
}

/// `Ok` on success, the raw status otherwise
pub fn check(status: usize) -> Result<(), PlatformError> {
    if is_error(status) {
        Err(PlatformError(status))
    } else {
        Ok(())
    }
}

/// Firmware disk failure as a backing-store error
pub fn io_error(status: usize) -> IoError {
    log::debug!("firmware read failed: {:#x}", status);
    IoError::ReadFailed
}

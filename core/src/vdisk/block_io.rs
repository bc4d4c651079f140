//! Block I/O engine
//!
//! The whole disk and its partition view share one read path: validate the
//! request against the device's `Media`, then copy bytes from a window of
//! the backing store. Writes are always refused.
//!
//! Every operation takes `&self`: firmware calls back into a device while
//! the disk is still being published, so the store sits behind a lock.

use super::media::Media;
use crate::backing::BackingStore;
use crate::error::BlockIoError;
use spin::Mutex;

/// Block device operations exposed to firmware
pub trait VirtualBlockIo {
    fn media(&self) -> &Media;

    /// Nothing to reset on a virtual device
    fn reset(&self, extended: bool) -> Result<(), BlockIoError> {
        let _ = extended;
        Ok(())
    }

    /// Read `buf.len()` bytes starting at block `lba`
    fn read_blocks(&self, media_id: u32, lba: u64, buf: &mut [u8]) -> Result<(), BlockIoError>;

    /// The backing store is never modified
    fn write_blocks(&self, media_id: u32, lba: u64, buf: &[u8]) -> Result<(), BlockIoError> {
        let _ = (media_id, lba, buf);
        Err(BlockIoError::WriteProtected)
    }

    fn flush(&self) -> Result<(), BlockIoError> {
        Ok(())
    }
}

/// Validate a read request, returning the number of blocks.
///
/// Checks run in a fixed order: media id, empty transfer, transfer size,
/// first block, last block.
pub fn check_read(media: &Media, media_id: u32, lba: u64, len: usize) -> Result<u64, BlockIoError> {
    if media_id != media.media_id {
        return Err(BlockIoError::MediaChanged);
    }
    if len == 0 {
        return Ok(0);
    }
    let block_size = media.block_size as u64;
    if len as u64 % block_size != 0 {
        return Err(BlockIoError::BadBufferSize);
    }
    if lba > media.last_block {
        return Err(BlockIoError::InvalidParameter);
    }
    let blocks = len as u64 / block_size;
    let last = lba
        .checked_add(blocks - 1)
        .ok_or(BlockIoError::InvalidParameter)?;
    if last > media.last_block {
        return Err(BlockIoError::InvalidParameter);
    }
    Ok(blocks)
}

/// Byte range of the backing store a device reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub start: u64,
    pub len: u64,
}

/// Checked read through `window`. Bytes past the window's end read as zero.
///
/// The store lock is held for the copy only.
pub(crate) fn read_window(
    store: &Mutex<BackingStore<'_>>,
    window: Window,
    media: &Media,
    media_id: u32,
    lba: u64,
    buf: &mut [u8],
) -> Result<(), BlockIoError> {
    if check_read(media, media_id, lba, buf.len())? == 0 {
        return Ok(());
    }

    let offset = lba * media.block_size as u64;
    let avail = window.len.saturating_sub(offset).min(buf.len() as u64) as usize;
    store.lock().read_at(&mut buf[..avail], window.start + offset)?;
    buf[avail..].fill(0);
    Ok(())
}

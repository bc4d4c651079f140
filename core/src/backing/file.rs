// File backing store and traced reads

use super::SECTOR_SIZE;
use crate::error::IoError;

/// One run of disk bytes touched while reading a file.
///
/// `sector` is an absolute 512-byte disk sector; `offset` and `length`
/// select bytes inside the run starting at that sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorAccess {
    pub sector: u64,
    pub offset: u32,
    pub length: u32,
}

/// An open file, owned by the caller
pub trait FileSource {
    fn name(&self) -> &str;

    fn size(&self) -> u64;

    fn seek(&mut self, offset: u64) -> Result<(), IoError>;

    /// Read from the current position. Returns 0 only at end of file.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError>;

    /// Like `read`, reporting every disk run the read touches.
    ///
    /// Files that do not live on a disk keep the default.
    fn read_traced(
        &mut self,
        buf: &mut [u8],
        trace: &mut dyn FnMut(SectorAccess),
    ) -> Result<usize, IoError> {
        let _ = (buf, trace);
        Err(IoError::NotDiskBacked)
    }

    /// Absolute sector of the partition holding the file
    fn partition_start(&self) -> u64 {
        0
    }
}

/// File backing store
pub struct FileHandle<'a> {
    source: &'a mut dyn FileSource,
}

impl<'a> FileHandle<'a> {
    pub fn new(source: &'a mut dyn FileSource) -> Self {
        Self { source }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn size(&self) -> u64 {
        self.source.size()
    }

    pub fn source(&mut self) -> &mut dyn FileSource {
        &mut *self.source
    }

    pub(crate) fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, IoError> {
        self.source.seek(offset)?;
        let mut done = 0;
        while done < buf.len() {
            match self.source.read(&mut buf[done..])? {
                0 => return Err(IoError::ReadFailed),
                n => done += n,
            }
        }
        Ok(done)
    }

    pub(crate) fn first_sector(&mut self) -> Result<u64, IoError> {
        let mut probe = [0u8; SECTOR_SIZE as usize];
        let len = (self.size().min(SECTOR_SIZE)) as usize;
        let mut first = None;

        self.source.seek(0)?;
        self.source.read_traced(&mut probe[..len], &mut |access| {
            if first.is_none() {
                first = Some(access.sector);
            }
        })?;

        first.ok_or(IoError::NotDiskBacked)
    }
}

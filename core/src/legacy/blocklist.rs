//! Blocklists
//!
//! A blocklist names the disk sectors behind a file in the form
//! `start[+count][[offset-end]]`, comma separated, with sectors relative
//! to the partition holding the file.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::backing::{FileSource, SectorAccess, SECTOR_SIZE};
use crate::error::IoError;

const TRACE_CHUNK: usize = 64 * 1024;

/// One blocklist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRun {
    pub sector: u64,
    /// Whole sectors in the run, 0 for a partial sector
    pub count: u64,
    pub offset: u32,
    pub length: u32,
}

impl fmt::Display for BlockRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sector)?;
        if self.count > 0 {
            write!(f, "+{}", self.count)?;
        }
        if self.offset != 0 || self.length != 0 {
            write!(f, "[{}-{}]", self.offset, self.offset + self.length)?;
        }
        Ok(())
    }
}

/// Collects traced accesses into entries
pub struct BlocklistBuilder {
    part_start: u64,
    run_start: u64,
    run_len: u64,
    entries: Vec<BlockRun>,
}

impl BlocklistBuilder {
    pub fn new(part_start: u64) -> Self {
        Self {
            part_start,
            run_start: 0,
            run_len: 0,
            entries: Vec::new(),
        }
    }

    /// Feed one access. Contiguous whole sectors extend the open run.
    pub fn record(&mut self, access: SectorAccess) {
        let mut sector = access.sector + access.offset as u64 / SECTOR_SIZE;
        let mut offset = access.offset as u64 % SECTOR_SIZE;
        let mut length = access.length as u64;

        if self.run_len > 0 {
            if self.run_start + self.run_len == sector && offset == 0 && length >= SECTOR_SIZE {
                let whole = length / SECTOR_SIZE;
                self.run_len += whole;
                sector += whole;
                length %= SECTOR_SIZE;
            }
            if length == 0 {
                return;
            }
            self.close_run();
        }

        if offset != 0 {
            let head = length.min(SECTOR_SIZE - offset);
            self.push(sector, 0, offset, head);
            length -= head;
            sector += 1;
            offset = 0;
        }
        if length == 0 {
            return;
        }

        let whole = length / SECTOR_SIZE;
        let tail = length % SECTOR_SIZE;
        if tail == 0 {
            self.run_start = sector;
            self.run_len = whole;
            return;
        }
        if whole > 0 {
            self.push(sector, whole, 0, 0);
        }
        self.push(sector + whole, 0, offset, tail);
    }

    pub fn finish(mut self) -> Blocklist {
        self.close_run();
        Blocklist {
            entries: self.entries,
        }
    }

    fn close_run(&mut self) {
        if self.run_len > 0 {
            self.push(self.run_start, self.run_len, 0, 0);
            self.run_len = 0;
        }
    }

    fn push(&mut self, sector: u64, count: u64, offset: u64, length: u64) {
        self.entries.push(BlockRun {
            sector: sector.saturating_sub(self.part_start),
            count,
            offset: offset as u32,
            length: length as u32,
        });
    }
}

/// Sectors behind one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    entries: Vec<BlockRun>,
}

impl Blocklist {
    /// Read the whole file while tracing which disk sectors it touches
    pub fn from_file(file: &mut dyn FileSource) -> Result<Self, IoError> {
        let size = file.size();
        let mut builder = BlocklistBuilder::new(file.partition_start());
        let mut buf = vec![0u8; TRACE_CHUNK];

        file.seek(0)?;
        let mut done = 0u64;
        while done < size {
            let want = (size - done).min(TRACE_CHUNK as u64) as usize;
            let n = file.read_traced(&mut buf[..want], &mut |access| builder.record(access))?;
            if n == 0 {
                log::warn!("blocklist: {} ended at {} of {} bytes", file.name(), done, size);
                return Err(IoError::ReadFailed);
            }
            done += n as u64;
        }
        Ok(builder.finish())
    }

    pub fn entries(&self) -> &[BlockRun] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for Blocklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

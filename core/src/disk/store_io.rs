//! `gpt_disk_io::BlockIo` view of a backing store
//!
//! Lets the GPT reader and the ISO9660 prober walk a backing store with
//! whatever block size they expect. Bytes past the end of the store read
//! as zeros so the last partial block is still addressable.

use crate::backing::BackingStore;
use crate::error::IoError;
use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};

pub struct StoreBlockIo<'s, 'a> {
    store: &'s mut BackingStore<'a>,
    block_size: BlockSize,
}

impl<'s, 'a> StoreBlockIo<'s, 'a> {
    pub fn new(store: &'s mut BackingStore<'a>, block_size: BlockSize) -> Self {
        Self { store, block_size }
    }
}

impl BlockIo for StoreBlockIo<'_, '_> {
    type Error = IoError;

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok(self.store.size().div_ceil(self.block_size.to_u64()))
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        let offset = start_lba
            .0
            .checked_mul(self.block_size.to_u64())
            .ok_or(IoError::OutOfRange)?;
        let size = self.store.size();
        if offset >= size {
            return Err(IoError::OutOfRange);
        }
        let avail = (size - offset).min(dst.len() as u64) as usize;
        self.store.read_at(&mut dst[..avail], offset)?;
        dst[avail..].fill(0);
        Ok(())
    }

    fn write_blocks(&mut self, _start_lba: Lba, _src: &[u8]) -> Result<(), Self::Error> {
        Err(IoError::ReadFailed)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backing::MemoryBuffer;
    use alloc::vec;

    #[test]
    fn test_partial_last_block_zero_filled() {
        let mut store = BackingStore::Memory(MemoryBuffer::from_vec(vec![0xAB; 600]));
        let mut io = StoreBlockIo::new(&mut store, BlockSize::BS_512);
        assert_eq!(io.num_blocks(), Ok(2));
        let mut buf = [0xFFu8; 512];
        io.read_blocks(Lba(1), &mut buf).expect("read");
        assert!(buf[..88].iter().all(|b| *b == 0xAB));
        assert!(buf[88..].iter().all(|b| *b == 0));
        assert_eq!(io.read_blocks(Lba(2), &mut buf), Err(IoError::OutOfRange));
    }
}

//! Host-side plumbing: a block device backed by a regular file.

use std::fs::File;
use std::io;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Mutex;

use block_dev::{BlockDevice, DeviceError};
use slow_fs::BLOCK_SIZE;

/// A block device stored in a host file of exact length
/// `num_blocks * 4096`. Trailing bytes of an oddly-sized file are not
/// addressable.
pub struct BlockFile {
    file: Mutex<File>,
    num_blocks: usize,
}

impl BlockFile {
    pub fn new(file: File) -> io::Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self {
            file: Mutex::new(file),
            num_blocks: (len / BLOCK_SIZE as u64) as usize,
        })
    }

    fn seek_to(&self, block_id: usize) -> Result<std::sync::MutexGuard<'_, File>, DeviceError> {
        if block_id >= self.num_blocks {
            return Err(DeviceError::OutOfRange {
                block: block_id,
                total: self.num_blocks,
            });
        }
        let mut file = self.file.lock().unwrap();
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))?;
        Ok(file)
    }
}

impl BlockDevice for BlockFile {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), DeviceError> {
        assert_eq!(buf.len(), BLOCK_SIZE, "not a complete block!");
        let mut file = self.seek_to(block_id)?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), DeviceError> {
        assert_eq!(buf.len(), BLOCK_SIZE, "not a complete block!");
        let mut file = self.seek_to(block_id)?;
        file.write_all(buf)?;
        Ok(())
    }

    fn num_blocks(&self) -> usize {
        self.num_blocks
    }
}

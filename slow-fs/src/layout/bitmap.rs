use vfs::Result;

use crate::BlockDriver;
use crate::{BLOCK_BITS, BLOCK_SIZE};

/// An allocation bitmap: one bit per slot of the region it tracks,
/// 1 = allocated. Bits are packed LSB-first within each byte.
///
/// The map is decoded into memory at mount and written back to its
/// blocks on every allocation, so the medium never lags behind an
/// allocation that has been handed out.
#[derive(Debug)]
pub struct Bitmap {
    /// First block of the bitmap region.
    start_block: u32,
    /// Blocks the bitmap occupies.
    blocks: u32,
    /// Number of slots actually backed by the tracked region; bits at
    /// or past this index are dead padding.
    capacity: usize,
    bytes: Vec<u8>,
}

impl Bitmap {
    pub fn new(start_block: u32, blocks: u32, capacity: usize) -> Self {
        assert!(capacity <= blocks as usize * BLOCK_BITS);
        Self {
            start_block,
            blocks,
            capacity,
            bytes: vec![0; blocks as usize * BLOCK_SIZE],
        }
    }

    /// Decode the bitmap from its on-medium blocks.
    pub fn load(
        driver: &BlockDriver,
        start_block: u32,
        blocks: u32,
        capacity: usize,
    ) -> Result<Self> {
        let mut bitmap = Self::new(start_block, blocks, capacity);
        for i in 0..blocks {
            let data = driver.bread(start_block + i)?;
            bitmap.bytes[i as usize * BLOCK_SIZE..][..BLOCK_SIZE].copy_from_slice(&data);
        }
        Ok(bitmap)
    }

    /// Write the bitmap back to its blocks.
    pub fn flush(&self, driver: &BlockDriver) -> Result<()> {
        for i in 0..self.blocks {
            let chunk = &self.bytes[i as usize * BLOCK_SIZE..][..BLOCK_SIZE];
            driver.bwrite(self.start_block + i, chunk.try_into().unwrap())?;
        }
        Ok(())
    }

    /// Lowest free slot, if any. Deterministic tie-break: always the
    /// lowest index.
    pub fn next_free(&self) -> Option<usize> {
        self.bytes
            .iter()
            .enumerate()
            .find(|(_, &byte)| byte != u8::MAX)
            .map(|(i, &byte)| i * 8 + byte.trailing_ones() as usize)
            .filter(|&slot| slot < self.capacity)
    }

    pub fn set(&mut self, slot: usize) {
        assert!(slot < self.capacity);
        let (byte, bit) = (slot / 8, slot % 8);
        assert_eq!(self.bytes[byte] & (1 << bit), 0, "bit already allocated");
        self.bytes[byte] |= 1 << bit;
    }

    #[inline]
    pub fn is_set(&self, slot: usize) -> bool {
        slot < self.capacity && self.bytes[slot / 8] & (1 << (slot % 8)) != 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

use vfs::{Error, Result};

use crate::{BLOCK_SIZE, MAGIC};

/// The first block of the volume: identifies the filesystem and
/// locates the other regions.
///
/// Packed form is the first 32 bytes of block 0, eight little-endian
/// `u32` fields in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperBlock {
    pub magic: u32,
    pub block_size: u32,
    pub num_blocks: u32,
    pub inode_bitmap_start: u32,
    pub data_bitmap_start: u32,
    pub inode_table_start: u32,
    pub data_region_start: u32,
    pub num_inodes: u32,
}

impl SuperBlock {
    pub const SIZE: usize = 32;

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let fields = [
            self.magic,
            self.block_size,
            self.num_blocks,
            self.inode_bitmap_start,
            self.data_bitmap_start,
            self.inode_table_start,
            self.data_region_start,
            self.num_inodes,
        ];

        let mut bytes = [0; Self::SIZE];
        for (chunk, field) in bytes.chunks_exact_mut(4).zip(fields) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut fields = [0u32; 8];
        for (field, chunk) in fields.iter_mut().zip(bytes.chunks_exact(4)) {
            *field = u32::from_le_bytes(chunk.try_into().unwrap());
        }

        let [magic, block_size, num_blocks, inode_bitmap_start, data_bitmap_start, inode_table_start, data_region_start, num_inodes] =
            fields;
        Self {
            magic,
            block_size,
            num_blocks,
            inode_bitmap_start,
            data_bitmap_start,
            inode_table_start,
            data_region_start,
            num_inodes,
        }
    }

    /// Check that the volume actually carries this filesystem.
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC || self.block_size != BLOCK_SIZE as u32 {
            log::error!(
                "bad superblock: magic={:#x} block_size={}",
                self.magic,
                self.block_size
            );
            return Err(Error::Io);
        }
        Ok(())
    }

    /// Blocks covered by the inode bitmap.
    #[inline]
    pub fn inode_bitmap_blocks(&self) -> u32 {
        self.data_bitmap_start - self.inode_bitmap_start
    }

    /// Blocks covered by the data bitmap.
    #[inline]
    pub fn data_bitmap_blocks(&self) -> u32 {
        self.inode_table_start - self.data_bitmap_start
    }

    /// Blocks available for file and directory data.
    #[inline]
    pub fn data_blocks(&self) -> u32 {
        self.num_blocks - self.data_region_start
    }
}

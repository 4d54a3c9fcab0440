//! Block driver layer.
//!
//! Mediates all block I/O: every layer above goes through
//! [`BlockDriver`] instead of calling the device directly. Today it
//! is a thin façade, but it is the boundary behind which a scheduler,
//! a write-back cache or request merging could appear without
//! touching the filesystem.

use std::sync::Arc;

use block_dev::BlockDevice;
use log::error;
use vfs::{Error, Result};

use crate::{DataBlock, BLOCK_SIZE};

pub struct BlockDriver {
    device: Arc<dyn BlockDevice>,
}

impl core::fmt::Debug for BlockDriver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BlockDriver")
            .field("num_blocks", &self.num_blocks())
            .finish()
    }
}

impl BlockDriver {
    #[inline]
    pub fn new(device: Arc<dyn BlockDevice>) -> Self {
        Self { device }
    }

    /// Read one whole block.
    pub fn bread(&self, block_id: u32) -> Result<DataBlock> {
        let mut data = [0; BLOCK_SIZE];
        self.device
            .read_block(block_id as usize, &mut data)
            .map_err(|err| {
                error!("bread of block {block_id} failed: {err}");
                Error::Io
            })?;
        Ok(data)
    }

    /// Write one whole block; acknowledged only after the device
    /// write returned.
    pub fn bwrite(&self, block_id: u32, data: &DataBlock) -> Result<()> {
        self.device
            .write_block(block_id as usize, data)
            .map_err(|err| {
                error!("bwrite of block {block_id} failed: {err}");
                Error::Io
            })
    }

    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.device.num_blocks()
    }
}

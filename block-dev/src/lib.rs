//! Block device interface layer.
//!
//! A block device stores data in fixed-size blocks; [`BlockDevice`] is
//! the abstraction for reading and writing such a device, and a type
//! implementing it acts as the device itself. Everything above this
//! layer moves whole blocks only — partial transfers do not exist.

use std::io;

use derive_more::{Display, From};

mod mem;
pub use mem::MemDisk;

/// Transfer failure reported by a block device.
#[derive(Debug, Display, From)]
pub enum DeviceError {
    /// The requested block does not exist on this device.
    #[display("block {block} out of range (device has {total} blocks)")]
    OutOfRange { block: usize, total: usize },
    /// The host medium backing the device failed.
    #[display("host i/o error: {_0}")]
    #[from]
    Host(io::Error),
}

impl std::error::Error for DeviceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::OutOfRange { .. } => None,
            Self::Host(err) => Some(err),
        }
    }
}

/// A random-access array of fixed-size blocks.
///
/// `buf` must be exactly one block long in both operations; the block
/// size itself is a property of the filesystem stamped onto the
/// device, not of the device.
pub trait BlockDevice: Send + Sync {
    fn read_block(&self, block_id: usize, buf: &mut [u8]) -> Result<(), DeviceError>;
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<(), DeviceError>;

    /// Total number of blocks addressable on this device.
    fn num_blocks(&self) -> usize;
}

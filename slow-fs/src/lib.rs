//! The slowfs on-medium filesystem, bottom up:
//!
//! 1. [`BlockDriver`] — the only way higher layers touch the block
//!    device; reads and writes whole blocks per request.
//! 2. [`layout`] — the packed on-medium structures: superblock,
//!    bitmaps, inode records, directory entries.
//! 3. [`SlowFileSystem`] — one mounted volume: region offsets,
//!    allocators, inode-table access and the pinned inode cache.
//! 4. [`Inode`] — the in-memory object exposing file and directory
//!    operations; block boundaries are its private concern.
//!
//! Every metadata change is written through the driver before the
//! call returns; there is no page cache and no journal.

mod driver;
pub use driver::BlockDriver;

pub mod layout;

mod sfs;
pub use sfs::{SlowFileSystem, ROOT_INO};

mod inode;
pub use inode::Inode;

/// Superblock identifier.
pub const MAGIC: u32 = 0x051057F5;
/// Unit of all device I/O, in bytes.
pub const BLOCK_SIZE: usize = 4096;
/// Allocation slots tracked by one bitmap block.
pub const BLOCK_BITS: usize = BLOCK_SIZE * 8;

type DataBlock = [u8; BLOCK_SIZE];

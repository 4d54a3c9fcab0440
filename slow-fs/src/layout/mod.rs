//! On-medium data structures.
//!
//! Everything in this module has a fixed packed width and is encoded
//! little-endian, so an image written on one host reads identically
//! on any other.

mod bitmap;
mod dir_entry;
mod disk_inode;
mod super_block;

pub use self::{
    bitmap::Bitmap,
    dir_entry::{validate_name, DirEntry, DIR_ENTRY_SIZE, NAME_MAX_LEN},
    disk_inode::{DiskInode, InodeKind, DIRECT_COUNT, INODE_SIZE, MAX_FILE_SIZE},
    super_block::SuperBlock,
};

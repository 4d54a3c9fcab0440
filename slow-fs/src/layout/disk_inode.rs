use log::error;
use vfs::{Error, NodeKind, Result};

use crate::BLOCK_SIZE;

/// Direct block pointers per inode; there is no indirect indexing.
pub const DIRECT_COUNT: usize = 60;
/// Packed width of one inode record.
pub const INODE_SIZE: usize = 256;
/// Largest representable file: all direct pointers populated.
pub const MAX_FILE_SIZE: usize = DIRECT_COUNT * BLOCK_SIZE;

/// One inode record as stored in the inode table.
///
/// Packed form, little-endian:
///
/// ```text
/// offset  size  field
/// 0       1     kind (1 = regular file, 2 = directory)
/// 1       3     padding
/// 4       4     size in bytes
/// 8       2     link_count
/// 10      2     padding
/// 12      240   direct[60] block numbers, 0 = no block
/// ```
///
/// The inode number is not stored; it is implied by the slot index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskInode {
    pub kind: InodeKind,
    pub size: u32,
    pub link_count: u16,
    pub direct: [u32; DIRECT_COUNT],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InodeKind {
    Regular = 1,
    Directory = 2,
}

impl DiskInode {
    /// A freshly allocated inode: empty, one link (the directory
    /// entry its creator is about to add).
    pub fn new(kind: InodeKind) -> Self {
        Self {
            kind,
            size: 0,
            link_count: 1,
            direct: [0; DIRECT_COUNT],
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == InodeKind::Directory
    }

    pub fn to_bytes(&self) -> [u8; INODE_SIZE] {
        let mut bytes = [0; INODE_SIZE];
        bytes[0] = self.kind as u8;
        bytes[4..8].copy_from_slice(&self.size.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.link_count.to_le_bytes());
        for (chunk, block) in bytes[12..].chunks_exact_mut(4).zip(self.direct) {
            chunk.copy_from_slice(&block.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let kind = match bytes[0] {
            1 => InodeKind::Regular,
            2 => InodeKind::Directory,
            other => {
                error!("inode record with unknown kind byte {other}");
                return Err(Error::Io);
            }
        };

        let mut direct = [0; DIRECT_COUNT];
        for (block, chunk) in direct.iter_mut().zip(bytes[12..].chunks_exact(4)) {
            *block = u32::from_le_bytes(chunk.try_into().unwrap());
        }

        Ok(Self {
            kind,
            size: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            link_count: u16::from_le_bytes(bytes[8..10].try_into().unwrap()),
            direct,
        })
    }
}

impl From<InodeKind> for NodeKind {
    #[inline]
    fn from(kind: InodeKind) -> Self {
        match kind {
            InodeKind::Regular => Self::Regular,
            InodeKind::Directory => Self::Directory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let mut inode = DiskInode::new(InodeKind::Directory);
        inode.size = 96;
        inode.link_count = 2;
        inode.direct[0] = 17;
        inode.direct[DIRECT_COUNT - 1] = 42;

        let decoded = DiskInode::from_bytes(&inode.to_bytes()).unwrap();
        assert_eq!(decoded, inode);
    }

    #[test]
    fn field_offsets() {
        let mut inode = DiskInode::new(InodeKind::Regular);
        inode.size = 0x0102_0304;
        inode.link_count = 0x0506;
        inode.direct[1] = 0x0708_090A;

        let bytes = inode.to_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(&bytes[1..4], &[0, 0, 0]);
        assert_eq!(&bytes[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[8..10], &[0x06, 0x05]);
        assert_eq!(&bytes[10..12], &[0, 0]);
        assert_eq!(&bytes[16..20], &[0x0A, 0x09, 0x08, 0x07]);
    }

    #[test]
    fn garbage_kind_is_corruption() {
        let mut bytes = DiskInode::new(InodeKind::Regular).to_bytes();
        bytes[0] = 0;
        assert_eq!(DiskInode::from_bytes(&bytes), Err(Error::Io));
    }
}

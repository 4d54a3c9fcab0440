//! Volume manager layer: establishes the on-medium layout and owns
//! the allocators and the pinned inode cache.

use std::collections::BTreeMap;
use std::sync::Arc;

use block_dev::BlockDevice;
use log::{debug, info};
use vfs::{Error, Result};

use crate::layout::{Bitmap, DiskInode, InodeKind, SuperBlock, INODE_SIZE};
use crate::{BlockDriver, Inode};
use crate::{BLOCK_BITS, BLOCK_SIZE, MAGIC};

/// The root directory always lives in inode slot 1; slot 0 is
/// reserved so that a zero byte on the medium can never be mistaken
/// for a live inode number.
pub const ROOT_INO: u32 = 1;

const INODES_PER_BLOCK: usize = BLOCK_SIZE / INODE_SIZE;

/// One mounted slowfs volume.
///
/// Holds the decoded superblock and bitmaps plus the inode cache.
/// Cached [`Inode`] objects stay pinned for the life of the mount and
/// are the single owner of in-memory inode state; they refer to this
/// instance only through the explicit parameter of each operation.
#[derive(Debug)]
pub struct SlowFileSystem {
    pub(crate) driver: BlockDriver,
    layout: SuperBlock,
    inode_bitmap: Bitmap,
    data_bitmap: Bitmap,
    inodes: BTreeMap<u32, Arc<Inode>>,
}

impl SlowFileSystem {
    /// Build a fresh filesystem on `device` (mkfs).
    ///
    /// Zeroes the volume, writes the superblock and bitmaps, and
    /// creates the root directory in inode 1 with its `.` and `..`
    /// entries. `inode_table_blocks` fixes how many inode slots the
    /// volume will ever have.
    pub fn format(device: Arc<dyn BlockDevice>, inode_table_blocks: u32) -> Result<Self> {
        let driver = BlockDriver::new(device);
        let num_blocks = driver.num_blocks() as u32;
        let num_inodes = inode_table_blocks * INODES_PER_BLOCK as u32;
        if num_inodes < 2 {
            // Slot 0 is reserved, and the root needs a slot.
            return Err(Error::NoSpace);
        }
        let inode_bitmap_blocks = (num_inodes as usize).div_ceil(BLOCK_BITS) as u32;

        // Region order: superblock, inode bitmap, data bitmap, inode
        // table, data. The data bitmap has to cover exactly the blocks
        // the fixed regions leave over; at least one bitmap block and
        // one data block must fit.
        let fixed = 1 + inode_bitmap_blocks + inode_table_blocks;
        if num_blocks < fixed + 2 {
            return Err(Error::NoSpace);
        }
        let remaining = num_blocks - fixed;
        let data_bitmap_blocks = (remaining + BLOCK_BITS as u32) / (BLOCK_BITS as u32 + 1);
        let data_region_start = fixed + data_bitmap_blocks;

        let layout = SuperBlock {
            magic: MAGIC,
            block_size: BLOCK_SIZE as u32,
            num_blocks,
            inode_bitmap_start: 1,
            data_bitmap_start: 1 + inode_bitmap_blocks,
            inode_table_start: 1 + inode_bitmap_blocks + data_bitmap_blocks,
            data_region_start,
            num_inodes,
        };

        for block in 0..num_blocks {
            driver.bwrite(block, &[0; BLOCK_SIZE])?;
        }
        let mut block0 = [0; BLOCK_SIZE];
        block0[..SuperBlock::SIZE].copy_from_slice(&layout.to_bytes());
        driver.bwrite(0, &block0)?;

        let mut fs = Self {
            inode_bitmap: Bitmap::new(
                layout.inode_bitmap_start,
                inode_bitmap_blocks,
                num_inodes as usize,
            ),
            data_bitmap: Bitmap::new(
                layout.data_bitmap_start,
                data_bitmap_blocks,
                layout.data_blocks() as usize,
            ),
            driver,
            layout,
            inodes: BTreeMap::new(),
        };

        // Reserve slot 0, then slot 1 becomes the root directory.
        fs.inode_bitmap.set(0);
        fs.inode_bitmap.flush(&fs.driver)?;
        let root = fs.allocate_inode(InodeKind::Directory)?;
        debug_assert_eq!(root.ino(), ROOT_INO);
        root.init_dir(ROOT_INO, &mut fs)?;

        info!(
            "formatted volume: {num_blocks} blocks, {num_inodes} inode slots, \
             data region at block {data_region_start}"
        );
        Ok(fs)
    }

    /// Open an already-formatted volume: read the superblock and
    /// bitmaps into memory and pin the root inode.
    pub fn mount(device: Arc<dyn BlockDevice>) -> Result<Self> {
        let driver = BlockDriver::new(device);
        let block0 = driver.bread(0)?;
        let layout = SuperBlock::from_bytes(&block0[..SuperBlock::SIZE]);
        layout.validate()?;

        let inode_bitmap = Bitmap::load(
            &driver,
            layout.inode_bitmap_start,
            layout.inode_bitmap_blocks(),
            layout.num_inodes as usize,
        )?;
        let data_bitmap = Bitmap::load(
            &driver,
            layout.data_bitmap_start,
            layout.data_bitmap_blocks(),
            layout.data_blocks() as usize,
        )?;

        let mut fs = Self {
            driver,
            layout,
            inode_bitmap,
            data_bitmap,
            inodes: BTreeMap::new(),
        };
        fs.get_inode(ROOT_INO)?;

        info!("mounted volume: {} blocks", fs.layout.num_blocks);
        Ok(fs)
    }

    /// The root directory's inode object.
    #[inline]
    pub fn root_inode(&mut self) -> Result<Arc<Inode>> {
        self.get_inode(ROOT_INO)
    }

    /// The cached inode object for `ino`, reading it from the table
    /// on first access.
    pub fn get_inode(&mut self, ino: u32) -> Result<Arc<Inode>> {
        if let Some(inode) = self.inodes.get(&ino) {
            return Ok(inode.clone());
        }

        let record = self.read_inode(ino)?;
        let inode = Arc::new(Inode::new(ino, record));
        self.inodes.insert(ino, inode.clone());
        Ok(inode)
    }

    /// Claim the lowest free inode slot and persist an empty record
    /// of the given kind into it.
    pub fn allocate_inode(&mut self, kind: InodeKind) -> Result<Arc<Inode>> {
        let ino = self.inode_bitmap.next_free().ok_or(Error::NoSpace)? as u32;
        self.inode_bitmap.set(ino as usize);
        self.inode_bitmap.flush(&self.driver)?;

        let record = DiskInode::new(kind);
        self.write_inode(ino, &record)?;

        debug!("allocated inode {ino} ({kind:?})");
        let inode = Arc::new(Inode::new(ino, record));
        self.inodes.insert(ino, inode.clone());
        Ok(inode)
    }

    /// Claim the lowest free data block, zero it, and return its
    /// absolute block number. The bitmap hits the medium before the
    /// block number is handed out.
    pub fn allocate_block(&mut self) -> Result<u32> {
        let slot = self.data_bitmap.next_free().ok_or(Error::NoSpace)?;
        self.data_bitmap.set(slot);
        self.data_bitmap.flush(&self.driver)?;

        let block = self.layout.data_region_start + slot as u32;
        self.driver.bwrite(block, &[0; BLOCK_SIZE])?;

        debug!("allocated data block {block}");
        Ok(block)
    }

    /// Read one inode record from the table.
    pub fn read_inode(&self, ino: u32) -> Result<DiskInode> {
        let (block, offset) = self.inode_pos(ino)?;
        let data = self.driver.bread(block)?;
        DiskInode::from_bytes(&data[offset..offset + INODE_SIZE])
    }

    /// Persist one inode record: read its table block, patch the
    /// packed slot, write the block back.
    pub fn write_inode(&self, ino: u32, record: &DiskInode) -> Result<()> {
        let (block, offset) = self.inode_pos(ino)?;
        let mut data = self.driver.bread(block)?;
        data[offset..offset + INODE_SIZE].copy_from_slice(&record.to_bytes());
        self.driver.bwrite(block, &data)
    }

    /// Whether `slot` is marked allocated in the data bitmap, where
    /// `slot` is relative to the data region. Exposed for consistency
    /// checks.
    pub fn data_block_allocated(&self, slot: usize) -> bool {
        self.data_bitmap.is_set(slot)
    }

    /// Absolute block number of the first data-region block.
    #[inline]
    pub fn data_region_start(&self) -> u32 {
        self.layout.data_region_start
    }

    fn inode_pos(&self, ino: u32) -> Result<(u32, usize)> {
        if ino == 0 || ino >= self.layout.num_inodes {
            log::error!("inode number {ino} outside the table");
            return Err(Error::Io);
        }
        let block = self.layout.inode_table_start + ino / INODES_PER_BLOCK as u32;
        let offset = ino as usize % INODES_PER_BLOCK * INODE_SIZE;
        Ok((block, offset))
    }
}

#[cfg(test)]
mod tests {
    use block_dev::MemDisk;
    use vfs::NodeKind;

    use super::*;

    fn mem_device(blocks: usize) -> Arc<MemDisk> {
        Arc::new(MemDisk::new(blocks, BLOCK_SIZE))
    }

    #[test]
    fn format_reserves_slot_zero_and_roots_at_one() {
        let mut fs = SlowFileSystem::format(mem_device(64), 5).unwrap();
        let root = fs.root_inode().unwrap();
        assert_eq!(root.ino(), ROOT_INO);
        assert!(root.is_dir());
        assert_eq!(root.size(), 64);
    }

    #[test]
    fn format_then_mount_round_trips_the_layout() {
        let device = mem_device(64);
        let layout = {
            let fs = SlowFileSystem::format(device.clone(), 5).unwrap();
            fs.layout
        };

        let fs = SlowFileSystem::mount(device).unwrap();
        assert_eq!(fs.layout, layout);
        assert_eq!(fs.layout.num_inodes, 80);
        assert_eq!(fs.layout.data_region_start, 8);
        assert_eq!(fs.layout.data_blocks(), 56);
    }

    #[test]
    fn mount_rejects_a_blank_device() {
        assert_eq!(
            SlowFileSystem::mount(mem_device(64)).unwrap_err(),
            Error::Io
        );
    }

    #[test]
    fn format_refuses_a_tiny_device() {
        assert_eq!(
            SlowFileSystem::format(mem_device(4), 5).unwrap_err(),
            Error::NoSpace
        );
    }

    #[test]
    fn allocators_hand_out_lowest_slots_first() {
        let mut fs = SlowFileSystem::format(mem_device(64), 5).unwrap();
        // Root took inode 1 and one data block.
        let inode = fs.allocate_inode(InodeKind::Regular).unwrap();
        assert_eq!(inode.ino(), 2);
        assert_eq!(NodeKind::from(inode.kind()), NodeKind::Regular);

        let first = fs.allocate_block().unwrap();
        let second = fs.allocate_block().unwrap();
        assert_eq!(first, fs.data_region_start() + 1);
        assert_eq!(second, first + 1);
    }

    #[test]
    fn inode_exhaustion_reports_no_space() {
        let mut fs = SlowFileSystem::format(mem_device(64), 1).unwrap();
        // 16 slots, minus the reserved slot 0 and the root.
        for _ in 0..14 {
            fs.allocate_inode(InodeKind::Regular).unwrap();
        }
        assert_eq!(
            fs.allocate_inode(InodeKind::Regular).unwrap_err(),
            Error::NoSpace
        );
    }

    #[test]
    fn inode_records_survive_the_table_round_trip() {
        let mut fs = SlowFileSystem::format(mem_device(64), 5).unwrap();
        let mut record = DiskInode::new(InodeKind::Regular);
        record.size = 12345;
        record.direct[3] = 9;
        fs.write_inode(7, &record).unwrap();
        assert_eq!(fs.read_inode(7).unwrap(), record);
        // Neighbouring slots are untouched by the read-modify-write.
        assert_eq!(fs.read_inode(ROOT_INO).unwrap().kind, InodeKind::Directory);
    }

    #[test]
    fn get_inode_returns_the_pinned_object() {
        let mut fs = SlowFileSystem::format(mem_device(64), 5).unwrap();
        let a = fs.get_inode(ROOT_INO).unwrap();
        let b = fs.get_inode(ROOT_INO).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}

use slow_fs::layout::{
    DirEntry, DiskInode, InodeKind, SuperBlock, DIR_ENTRY_SIZE, INODE_SIZE, MAX_FILE_SIZE,
};
use slow_fs::{BLOCK_SIZE, MAGIC};

#[test]
fn on_medium_widths() {
    assert_eq!(32, SuperBlock::SIZE);
    assert_eq!(256, INODE_SIZE);
    assert_eq!(256, DiskInode::new(InodeKind::Regular).to_bytes().len());
    assert_eq!(32, DIR_ENTRY_SIZE);
    assert_eq!(32, DirEntry::new("a", 1).unwrap().to_bytes().len());
}

#[test]
fn derived_limits() {
    // 60 direct pointers of 4 KiB blocks.
    assert_eq!(MAX_FILE_SIZE, 245_760);
    assert_eq!(BLOCK_SIZE % INODE_SIZE, 0);
    assert_eq!(BLOCK_SIZE % DIR_ENTRY_SIZE, 0);
    assert_eq!(MAGIC, 0x051057F5);
}

#![allow(dead_code)] // each test binary uses a different subset

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use kernel::{start_kernel, Process};
use slow_fs::{SlowFileSystem, BLOCK_SIZE};
use slow_fs_fuse::BlockFile;

/// Create an image file of exactly `blocks * 4096` bytes.
pub fn create_image(path: &Path, blocks: u64) -> Arc<BlockFile> {
    let fd = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .unwrap();
    fd.set_len(blocks * BLOCK_SIZE as u64).unwrap();
    Arc::new(BlockFile::new(fd).unwrap())
}

/// Reopen an existing image.
pub fn open_image(path: &Path) -> Arc<BlockFile> {
    let fd = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .unwrap();
    Arc::new(BlockFile::new(fd).unwrap())
}

/// Format a fresh image at `path` and hand back a process with the
/// volume mounted at `/`.
pub fn booted(path: &Path, blocks: u64) -> Process {
    let volume = SlowFileSystem::format(create_image(path, blocks), 5).unwrap();
    let proc = Process::new(start_kernel());
    proc.mount("/", volume).unwrap();
    proc
}

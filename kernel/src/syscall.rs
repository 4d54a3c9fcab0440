//! The system-call table.
//!
//! A real kernel maps syscall numbers to handlers; here the table is
//! the shape of this trait. [`crate::start_kernel`] hands a
//! `Arc<dyn Syscalls>` to whoever builds processes, and process code
//! depends only on it — there is no global kernel state.

use std::sync::Arc;

use enumflags2::BitFlags;
use slow_fs::SlowFileSystem;
use vfs::{DirEntry, Partial, Result, Stat};

use crate::file::{OpenFile, OpenFlag, Whence};

pub trait Syscalls {
    /// Open (optionally creating) the file at `path`, yielding a
    /// fresh open-file description. `mode` is accepted for interface
    /// fidelity; permissions are not enforced.
    fn open(&self, path: &str, flags: BitFlags<OpenFlag>, mode: u32) -> Result<Arc<OpenFile>>;

    /// Release an open-file description. All writes are already
    /// through, so this only validates the handle.
    fn close(&self, file: &OpenFile) -> Result<()>;

    /// Read up to `count` bytes at the description's offset,
    /// advancing it by what was read.
    fn read(&self, file: &OpenFile, count: usize) -> Result<Vec<u8>>;

    /// Write `buf` at the description's offset, advancing it by what
    /// was written — also on a partial write.
    fn write(&self, file: &OpenFile, buf: &[u8]) -> core::result::Result<usize, Partial>;

    /// Reposition the description's offset; returns the new offset.
    fn seek(&self, file: &OpenFile, offset: i64, whence: Whence) -> Result<usize>;

    fn mkdir(&self, path: &str, mode: u32) -> Result<()>;

    fn getattr(&self, path: &str) -> Result<Stat>;

    /// Live entries of the directory at `path`, in on-medium order.
    fn readdir(&self, path: &str) -> Result<Vec<DirEntry>>;

    /// Mount `fs` at `path`, which must already exist as a directory.
    fn mount(&self, path: &str, fs: SlowFileSystem) -> Result<()>;

    /// Detach the filesystem mounted at `path`. State is written
    /// through on every operation, so nothing is flushed here.
    fn unmount(&self, path: &str) -> Result<()>;
}

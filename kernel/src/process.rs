//! The process abstraction: a file-descriptor table plus the
//! convenience API user code calls. A process knows the kernel only
//! through the syscall table it was given at construction.

use std::sync::Arc;

use enumflags2::BitFlags;
use log::debug;
use slow_fs::SlowFileSystem;
use vfs::{DirEntry, Error, Partial, Result, Stat};

use crate::file::{OpenFile, OpenFlag, Whence};
use crate::syscall::Syscalls;

/// File-descriptor table slots per process.
pub const RLIMIT_NOFILE: usize = 1024;

pub struct Process {
    syscalls: Arc<dyn Syscalls>,
    /// `None` means the descriptor is free; `open` takes the lowest
    /// free slot.
    fd_table: Vec<Option<Arc<OpenFile>>>,
    cwd: String,
}

impl Process {
    pub fn new(syscalls: Arc<dyn Syscalls>) -> Self {
        Self {
            syscalls,
            fd_table: vec![None; RLIMIT_NOFILE],
            cwd: String::from("/"),
        }
    }

    /// The working directory is fixed at `/`; all paths handed to
    /// this process must be absolute.
    #[inline]
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// open(2). Returns the lowest free file descriptor.
    pub fn open(&mut self, path: &str, flags: BitFlags<OpenFlag>, mode: u32) -> Result<usize> {
        let fd = self
            .fd_table
            .iter()
            .position(Option::is_none)
            .ok_or(Error::NoSpace)?;
        let file = self.syscalls.open(path, flags, mode)?;
        debug!("fd {fd} -> {path:?}");
        self.fd_table[fd] = Some(file);
        Ok(fd)
    }

    /// close(2). Frees the descriptor; using it afterwards fails with
    /// `BadFd`.
    pub fn close(&mut self, fd: usize) -> Result<()> {
        let file = self
            .fd_table
            .get_mut(fd)
            .and_then(Option::take)
            .ok_or(Error::BadFd)?;
        self.syscalls.close(&file)
    }

    /// read(2): up to `count` bytes from the descriptor's offset.
    pub fn read(&self, fd: usize, count: usize) -> Result<Vec<u8>> {
        self.syscalls.read(self.file(fd)?, count)
    }

    /// write(2). On a partial write the returned [`Partial`] reports
    /// how far it got and why it stopped.
    pub fn write(&self, fd: usize, buf: &[u8]) -> core::result::Result<usize, Partial> {
        let file = self.file(fd).map_err(Partial::from)?;
        self.syscalls.write(file, buf)
    }

    /// lseek(2); returns the new offset.
    pub fn seek(&self, fd: usize, offset: i64, whence: Whence) -> Result<usize> {
        self.syscalls.seek(self.file(fd)?, offset, whence)
    }

    /// mkdir(2).
    pub fn mkdir(&self, path: &str, mode: u32) -> Result<()> {
        self.syscalls.mkdir(path, mode)
    }

    /// stat(2).
    pub fn stat(&self, path: &str) -> Result<Stat> {
        self.syscalls.getattr(path)
    }

    /// The directory's live entries in on-medium order.
    pub fn listdir(&self, path: &str) -> Result<Vec<DirEntry>> {
        self.syscalls.readdir(path)
    }

    /// mount(2).
    pub fn mount(&self, path: &str, fs: SlowFileSystem) -> Result<()> {
        self.syscalls.mount(path, fs)
    }

    /// umount(2).
    pub fn unmount(&self, path: &str) -> Result<()> {
        self.syscalls.unmount(path)
    }

    fn file(&self, fd: usize) -> Result<&Arc<OpenFile>> {
        self.fd_table
            .get(fd)
            .and_then(Option::as_ref)
            .ok_or(Error::BadFd)
    }
}

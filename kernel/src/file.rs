//! Open-file descriptions and the flags that create them.

use enumflags2::{bitflags, BitFlags};
use spin::Mutex;
use vfs::{Error, Partial, Result};

use crate::vfs::NodeHandle;

#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFlag {
    /// Write only
    WRONLY = 0b0000_0000_0001,
    /// Read and write
    RDWR   = 0b0000_0000_0010,
    /// With `CREATE`: fail if the path already exists
    EXCL   = 0b0000_1000_0000,
    /// Create the file if it does not exist
    CREATE = 0b0010_0000_0000,
    /// Reset an existing file to length zero when opened writable
    TRUNC  = 0b0100_0000_0000,
    /// Start at end of file, and return there before every write
    APPEND = 0b1000_0000_0000,
}

impl OpenFlag {
    // enumflags2 rejects zero-valued flags
    /// Read only
    pub const RDONLY: u32 = 0b0000_0000_0000;

    #[inline]
    pub fn read_only() -> BitFlags<OpenFlag> {
        BitFlags::empty()
    }
}

/// Origin for [`OpenFile::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set,
    Cur,
    End,
}

/// An open-file description: the target node, the file offset and the
/// access mode fixed at `open` time.
///
/// Every `open` creates a fresh description; file descriptors holding
/// an `Arc` of it stand in for the reference count a future `dup`
/// would bump.
pub struct OpenFile {
    node: NodeHandle,
    readable: bool,
    writable: bool,
    append: bool,
    offset: Mutex<usize>,
}

impl core::fmt::Debug for OpenFile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("OpenFile")
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .field("append", &self.append)
            .field("offset", &self.offset())
            .finish_non_exhaustive()
    }
}

impl OpenFile {
    pub(crate) fn new(node: NodeHandle, flags: BitFlags<OpenFlag>, offset: usize) -> Self {
        Self {
            node,
            readable: !flags.contains(OpenFlag::WRONLY),
            writable: flags.intersects(OpenFlag::WRONLY | OpenFlag::RDWR),
            append: flags.contains(OpenFlag::APPEND),
            offset: Mutex::new(offset),
        }
    }

    #[inline]
    pub fn readable(&self) -> bool {
        self.readable
    }

    #[inline]
    pub fn writable(&self) -> bool {
        self.writable
    }

    /// Current file offset.
    #[inline]
    pub fn offset(&self) -> usize {
        *self.offset.lock()
    }

    pub(crate) fn read(&self, count: usize) -> Result<Vec<u8>> {
        if !self.readable {
            return Err(Error::BadFd);
        }
        let NodeHandle::Slow { vol, inode } = &self.node else {
            return Err(Error::IsADirectory);
        };
        if inode.is_dir() {
            return Err(Error::IsADirectory);
        }

        let fs = vol.lock();
        let mut offset = self.offset.lock();
        let mut buf = vec![0; count];
        let read = inode.read_at(*offset, &mut buf, &fs)?;
        buf.truncate(read);
        *offset += read;
        Ok(buf)
    }

    pub(crate) fn write(&self, buf: &[u8]) -> core::result::Result<usize, Partial> {
        if !self.writable {
            return Err(Error::BadFd.into());
        }
        let NodeHandle::Slow { vol, inode } = &self.node else {
            return Err(Error::IsADirectory.into());
        };
        if inode.is_dir() {
            return Err(Error::IsADirectory.into());
        }

        let mut fs = vol.lock();
        let mut offset = self.offset.lock();
        if self.append {
            *offset = inode.size() as usize;
        }

        match inode.write_at(*offset, buf, &mut fs) {
            Ok(written) => {
                *offset += written;
                Ok(written)
            }
            Err(partial) => {
                *offset += partial.written;
                Err(partial)
            }
        }
    }

    pub(crate) fn seek(&self, offset: i64, whence: Whence) -> Result<usize> {
        let NodeHandle::Slow { inode, .. } = &self.node else {
            return Err(Error::IsADirectory);
        };
        if inode.is_dir() {
            return Err(Error::IsADirectory);
        }

        let mut cur = self.offset.lock();
        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => *cur as i64,
            Whence::End => inode.size() as i64,
        };
        // Seeking past end of file is allowed; a later write turns
        // the gap into a sparse zero region.
        match base.checked_add(offset).filter(|&t| t >= 0) {
            Some(target) => {
                *cur = target as usize;
                Ok(target as usize)
            }
            None => Err(Error::InvalidSeek),
        }
    }
}

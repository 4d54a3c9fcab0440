use core::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Structured failure kinds, carried as a value through the whole
/// inode → VFS → process stack without being retried anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    NotFound,
    AlreadyExists,
    NotADirectory,
    IsADirectory,
    /// Path is not absolute, or empty.
    InvalidPath,
    /// Filename violates the length or character-set rules.
    InvalidName,
    /// Repositioning would land before the start of the file.
    InvalidSeek,
    /// An allocator (or a fixed-size table) is exhausted.
    NoSpace,
    /// The write would need a block index past the last direct pointer.
    FileTooBig,
    /// Unknown or already-closed file descriptor.
    BadFd,
    /// The device or driver failed; details are in the log.
    Io,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::NotFound => "no such file or directory",
            Self::AlreadyExists => "already exists",
            Self::NotADirectory => "not a directory",
            Self::IsADirectory => "is a directory",
            Self::InvalidPath => "invalid path",
            Self::InvalidName => "invalid filename",
            Self::InvalidSeek => "invalid seek offset",
            Self::NoSpace => "no space left",
            Self::FileTooBig => "file too big",
            Self::BadFd => "bad file descriptor",
            Self::Io => "i/o error",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {}

/// Outcome of a write that stopped early: how many bytes were
/// persisted before the stop, and why writing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partial {
    pub written: usize,
    pub reason: Error,
}

impl Partial {
    #[inline]
    pub fn new(written: usize, reason: Error) -> Self {
        Self { written, reason }
    }
}

impl From<Error> for Partial {
    /// A failure before any byte went through.
    #[inline]
    fn from(reason: Error) -> Self {
        Self { written: 0, reason }
    }
}

impl fmt::Display for Partial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} after {} bytes", self.reason, self.written)
    }
}

impl std::error::Error for Partial {}

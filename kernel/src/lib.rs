//! The dispatch layer a kernel's virtual filesystem would provide,
//! in userspace. Layered top-down:
//!
//! 1. [`Process`] — per-process file descriptors, the convenience API
//!    user code calls.
//! 2. [`Syscalls`] — the syscall-table shape; a process receives it
//!    at construction and depends on nothing else.
//! 3. [`Vfs`] — mount table, path resolution, the open-file layer.
//! 4. `rootfs` — the trivial in-memory filesystem carrying mount
//!    points under `/`.
//!
//! Everything runs single-threaded and cooperatively: no call
//! suspends, every call runs to completion before returning.

mod file;
mod path;
mod process;
mod rootfs;
mod syscall;
mod vfs;

pub use self::{
    file::{OpenFile, OpenFlag, Whence},
    path::Path,
    process::{Process, RLIMIT_NOFILE},
    syscall::Syscalls,
    vfs::Vfs,
};

use std::sync::Arc;

/// Boot the kernel: construct the VFS and hand back the system-call
/// table userspace processes are built on.
pub fn start_kernel() -> Arc<dyn Syscalls> {
    Arc::new(Vfs::new())
}

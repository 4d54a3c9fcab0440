//! Shared filesystem-facing types: the error taxonomy, file metadata
//! and directory-listing entries exchanged between the filesystem,
//! the dispatcher and user code.

mod dirent;
mod error;
mod stat;

pub use self::{
    dirent::{DirEntry, NodeKind},
    error::{Error, Partial, Result},
    stat::Stat,
};

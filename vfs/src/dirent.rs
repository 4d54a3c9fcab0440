/// A directory-listing entry as handed to user code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    /// Inode number within the entry's own filesystem.
    pub ino: u32,
}

impl DirEntry {
    #[inline]
    pub fn new(name: impl Into<String>, ino: u32) -> Self {
        Self {
            name: name.into(),
            ino,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeKind {
    #[default]
    Regular,
    Directory,
}

impl NodeKind {
    #[inline]
    pub fn is_dir(self) -> bool {
        self == Self::Directory
    }
}

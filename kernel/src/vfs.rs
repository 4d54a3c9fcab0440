//! The virtual filesystem: mount table, path resolution and the
//! operations the syscall table exposes.

use std::collections::BTreeMap;
use std::sync::Arc;

use enumflags2::BitFlags;
use log::{debug, info};
use spin::Mutex;

use slow_fs::layout::InodeKind;
use slow_fs::{Inode, SlowFileSystem};
use vfs::{DirEntry, Error, Partial, Result, Stat};

use crate::file::{OpenFile, OpenFlag, Whence};
use crate::path::Path;
use crate::rootfs::{self, RootFs};
use crate::syscall::Syscalls;

/// One mounted filesystem instance.
#[derive(Clone)]
pub(crate) enum Volume {
    /// The boot carrier: in-memory directories for mount points.
    Root(Arc<Mutex<RootFs>>),
    Slow(Arc<Mutex<SlowFileSystem>>),
}

/// A resolved node, bound to the filesystem it lives on.
#[derive(Clone)]
pub(crate) enum NodeHandle {
    Root { fs: Arc<Mutex<RootFs>>, id: usize },
    Slow {
        vol: Arc<Mutex<SlowFileSystem>>,
        inode: Arc<Inode>,
    },
}

impl NodeHandle {
    fn is_dir(&self) -> bool {
        match self {
            Self::Root { .. } => true,
            Self::Slow { inode, .. } => inode.is_dir(),
        }
    }
}

/// The dispatcher. State: the mount table and the boot carrier; the
/// open-file table is the set of live [`OpenFile`] descriptions the
/// processes hold.
pub struct Vfs {
    mounts: Mutex<BTreeMap<String, Volume>>,
    carrier: Volume,
}

impl Vfs {
    pub fn new() -> Self {
        let carrier = Volume::Root(Arc::new(Mutex::new(RootFs::new())));
        let mounts = BTreeMap::from([(String::from("/"), carrier.clone())]);
        Self {
            mounts: Mutex::new(mounts),
            carrier,
        }
    }

    /// Resolve an absolute path to a node.
    ///
    /// Picks the most specific mount prefix, then walks the remaining
    /// components from that filesystem's root. Deliberately re-walks
    /// on every call — there is no directory-entry cache.
    fn resolve(&self, path: &str) -> Result<NodeHandle> {
        let (volume, rest) = self.find_mount(path)?;
        match volume {
            Volume::Root(fs) => {
                let fs_ref = fs.clone();
                let fs = fs.lock();
                let mut id = rootfs::ROOT;
                for component in rest.components() {
                    id = fs.lookup(id, component)?;
                }
                Ok(NodeHandle::Root { fs: fs_ref, id })
            }
            Volume::Slow(vol) => {
                let mut fs = vol.lock();
                let mut inode = fs.root_inode()?;
                for component in rest.components() {
                    let ino = inode.lookup(component, &fs)?;
                    inode = fs.get_inode(ino)?;
                }
                drop(fs);
                Ok(NodeHandle::Slow { vol, inode })
            }
        }
    }

    /// Most specific mount prefix of `path`, plus the remainder to
    /// walk inside it.
    fn find_mount(&self, path: &str) -> Result<(Volume, String)> {
        if !path.is_absolute() {
            return Err(Error::InvalidPath);
        }
        let path = path.normalized();

        let mounts = self.mounts.lock();
        let mut best: Option<(&str, &Volume, &str)> = None;
        for (mount_path, volume) in mounts.iter() {
            let Some(rest) = match_mount_path(mount_path, &path) else {
                continue;
            };
            if best.map_or(true, |(b, ..)| mount_path.len() > b.len()) {
                best = Some((mount_path.as_str(), volume, rest));
            }
        }

        // `/` is always mounted, so an absolute path always matches.
        let (_, volume, rest) = best.ok_or(Error::InvalidPath)?;
        Ok((volume.clone(), rest.to_owned()))
    }
}

impl Syscalls for Vfs {
    fn open(&self, path: &str, flags: BitFlags<OpenFlag>, mode: u32) -> Result<Arc<OpenFile>> {
        debug!("open {path:?} flags={flags:?} mode={mode:#o}");
        let writable = flags.intersects(OpenFlag::WRONLY | OpenFlag::RDWR);

        match self.resolve(path) {
            Ok(node) => {
                if flags.contains(OpenFlag::CREATE) && flags.contains(OpenFlag::EXCL) {
                    return Err(Error::AlreadyExists);
                }
                if node.is_dir() {
                    if writable {
                        return Err(Error::IsADirectory);
                    }
                    // Directories may be opened for reading only.
                    return Ok(Arc::new(OpenFile::new(node, flags, 0)));
                }

                let NodeHandle::Slow { vol, inode } = &node else {
                    return Err(Error::IsADirectory);
                };
                if flags.contains(OpenFlag::TRUNC) && writable {
                    let fs = vol.lock();
                    inode.truncate(&fs)?;
                }
                let offset = if flags.contains(OpenFlag::APPEND) {
                    inode.size() as usize
                } else {
                    0
                };
                Ok(Arc::new(OpenFile::new(node.clone(), flags, offset)))
            }

            Err(Error::NotFound) if flags.contains(OpenFlag::CREATE) => {
                let (parent, name) = path.parent_file().ok_or(Error::InvalidPath)?;
                match self.resolve(parent)? {
                    NodeHandle::Slow { vol, inode: dir } => {
                        let mut fs = vol.lock();
                        let inode = dir.create(name, InodeKind::Regular, &mut fs)?;
                        drop(fs);
                        Ok(Arc::new(OpenFile::new(
                            NodeHandle::Slow { vol, inode },
                            flags,
                            0,
                        )))
                    }
                    // The boot carrier holds mount points only; it has
                    // no data region to put a file in.
                    NodeHandle::Root { .. } => Err(Error::NoSpace),
                }
            }

            Err(err) => Err(err),
        }
    }

    fn close(&self, _file: &OpenFile) -> Result<()> {
        // Every write already went through the driver; releasing the
        // description is all that is left, and the descriptor table
        // did that.
        Ok(())
    }

    fn read(&self, file: &OpenFile, count: usize) -> Result<Vec<u8>> {
        file.read(count)
    }

    fn write(&self, file: &OpenFile, buf: &[u8]) -> core::result::Result<usize, Partial> {
        file.write(buf)
    }

    fn seek(&self, file: &OpenFile, offset: i64, whence: Whence) -> Result<usize> {
        file.seek(offset, whence)
    }

    fn mkdir(&self, path: &str, mode: u32) -> Result<()> {
        debug!("mkdir {path:?} mode={mode:#o}");
        match self.resolve(path) {
            Ok(_) => return Err(Error::AlreadyExists),
            Err(Error::NotFound) => {}
            Err(err) => return Err(err),
        }

        let (parent, name) = path.parent_file().ok_or(Error::InvalidPath)?;
        match self.resolve(parent)? {
            NodeHandle::Root { fs, id } => fs.lock().mkdir(id, name).map(|_| ()),
            NodeHandle::Slow { vol, inode } => {
                let mut fs = vol.lock();
                inode.create(name, InodeKind::Directory, &mut fs).map(|_| ())
            }
        }
    }

    fn getattr(&self, path: &str) -> Result<Stat> {
        match self.resolve(path)? {
            NodeHandle::Root { fs, id } => Ok(fs.lock().stat(id)),
            NodeHandle::Slow { inode, .. } => Ok(inode.stat()),
        }
    }

    fn readdir(&self, path: &str) -> Result<Vec<DirEntry>> {
        match self.resolve(path)? {
            NodeHandle::Root { fs, id } => Ok(fs.lock().entries(id)),
            NodeHandle::Slow { vol, inode } => {
                let fs = vol.lock();
                inode.entries(&fs)
            }
        }
    }

    fn mount(&self, path: &str, fs: SlowFileSystem) -> Result<()> {
        let node = self.resolve(path)?;
        if !node.is_dir() {
            return Err(Error::NotADirectory);
        }

        let key = path.normalized();
        let mut mounts = self.mounts.lock();
        match mounts.get(&key) {
            // Mounting over the boot carrier is how a volume becomes
            // the root filesystem.
            Some(Volume::Root(_)) if key == "/" => {}
            Some(_) => return Err(Error::AlreadyExists),
            None => {}
        }

        info!("mounted filesystem at {key:?}");
        mounts.insert(key, Volume::Slow(Arc::new(Mutex::new(fs))));
        Ok(())
    }

    fn unmount(&self, path: &str) -> Result<()> {
        if !path.is_absolute() {
            return Err(Error::InvalidPath);
        }
        let key = path.normalized();

        let mut mounts = self.mounts.lock();
        match mounts.remove(&key) {
            None => Err(Error::NotFound),
            // The boot carrier itself is not a user mount.
            Some(Volume::Root(fs)) => {
                mounts.insert(key, Volume::Root(fs));
                Err(Error::NotFound)
            }
            Some(Volume::Slow(_)) => {
                if key == "/" {
                    mounts.insert(key, self.carrier.clone());
                }
                info!("unmounted filesystem at {path:?}");
                Ok(())
            }
        }
    }
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

/// Does `path` live under `mount_path`, and if so, what remains to be
/// walked? Prefixes match on component boundaries only.
fn match_mount_path<'p>(mount_path: &str, path: &'p str) -> Option<&'p str> {
    if mount_path == "/" {
        return Some(path);
    }
    if path == mount_path {
        return Some("");
    }
    path.strip_prefix(mount_path)
        .filter(|rest| rest.starts_with('/'))
}

use vfs::{Error, Result};

/// Longest filename an entry can carry; together with the 5 header
/// bytes this pins the entry at [`DIR_ENTRY_SIZE`] bytes, so any
/// change here must change the entry size in lockstep.
pub const NAME_MAX_LEN: usize = 27;
/// Packed width of one directory entry.
pub const DIR_ENTRY_SIZE: usize = 32;

/// One directory entry as stored in a directory's data blocks.
///
/// Packed form, little-endian:
///
/// ```text
/// offset  size  field
/// 0       4     inode number, 0 = free slot
/// 4       1     name_len
/// 5       27    name, zero-padded
/// ```
///
/// A directory's data is a dense array of these; entries with inode 0
/// are tombstones that a later insertion may reuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    ino: u32,
    name_len: u8,
    name: [u8; NAME_MAX_LEN],
}

impl DirEntry {
    pub fn new(name: &str, ino: u32) -> Result<Self> {
        validate_name(name)?;

        let bytes = name.as_bytes();
        let mut packed = [0; NAME_MAX_LEN];
        packed[..bytes.len()].copy_from_slice(bytes);

        Ok(Self {
            ino,
            name_len: bytes.len() as u8,
            name: packed,
        })
    }

    /// Whether this slot is free (never used, or a tombstone).
    #[inline]
    pub fn is_free(&self) -> bool {
        self.ino == 0
    }

    #[inline]
    pub fn ino(&self) -> u32 {
        self.ino
    }

    pub fn name(&self) -> &str {
        let len = (self.name_len as usize).min(NAME_MAX_LEN);
        // Names are validated to 7-bit ASCII on the way in.
        std::str::from_utf8(&self.name[..len]).unwrap_or("")
    }

    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut bytes = [0; DIR_ENTRY_SIZE];
        bytes[..4].copy_from_slice(&self.ino.to_le_bytes());
        bytes[4] = self.name_len;
        bytes[5..].copy_from_slice(&self.name);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut name = [0; NAME_MAX_LEN];
        name.copy_from_slice(&bytes[5..DIR_ENTRY_SIZE]);
        Self {
            ino: u32::from_le_bytes(bytes[..4].try_into().unwrap()),
            name_len: bytes[4],
            name,
        }
    }
}

/// Check that `name` is usable as a single path component: 1 to 27
/// bytes of printable 7-bit ASCII, no `/`.
pub fn validate_name(name: &str) -> Result<()> {
    let ok = (1..=NAME_MAX_LEN).contains(&name.len())
        && name
            .bytes()
            .all(|b| (0x20..=0x7E).contains(&b) && b != b'/');
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidName)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let entry = DirEntry::new("hello-world", 7).unwrap();
        let decoded = DirEntry::from_bytes(&entry.to_bytes());
        assert_eq!(decoded, entry);
        assert_eq!(decoded.name(), "hello-world");
        assert_eq!(decoded.ino(), 7);
        assert!(!decoded.is_free());
    }

    #[test]
    fn zeroed_slot_is_free() {
        assert!(DirEntry::from_bytes(&[0; DIR_ENTRY_SIZE]).is_free());
    }

    #[test]
    fn name_length_bounds() {
        assert!(validate_name("a").is_ok());
        assert!(validate_name(&"x".repeat(NAME_MAX_LEN)).is_ok());
        assert_eq!(
            validate_name(&"x".repeat(NAME_MAX_LEN + 1)),
            Err(Error::InvalidName)
        );
        assert_eq!(validate_name(""), Err(Error::InvalidName));
    }

    #[test]
    fn name_charset() {
        assert_eq!(validate_name("a/b"), Err(Error::InvalidName));
        assert_eq!(validate_name("héllo"), Err(Error::InvalidName));
        assert_eq!(validate_name("tab\there"), Err(Error::InvalidName));
        assert!(validate_name(".").is_ok());
        assert!(validate_name("with space").is_ok());
    }
}

use alloc::string::String;
use alloc::vec::Vec;

use super::{read_u16_le, read_u32_le};
use crate::error::{Ext2Error, Result};

/// Fixed header in front of every directory record.
pub const DIR_ENTRY_HEADER_LEN: usize = 8;

/// Longest name a directory record can hold.
pub const EXT2_NAME_LEN: usize = 255;

/// Parsed ext2 directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub inode: u32,
    pub rec_len: u16,
    pub name_len: u8,
    /// Type hint byte; zero on filesystems without the filetype feature.
    pub file_type: u8,
    pub name: Vec<u8>,
}

impl DirEntry {
    /// Parse a directory entry from the start of `raw`.
    ///
    /// Returns `Ok(None)` for the `rec_len == 0` end sentinel. The returned
    /// `rec_len` tells the caller how far to advance.
    pub fn parse(raw: &[u8]) -> Result<Option<Self>> {
        if raw.len() < DIR_ENTRY_HEADER_LEN {
            return Err(Ext2Error::CorruptedFs("dir entry too small"));
        }

        let inode = read_u32_le(raw, 0);
        let rec_len = read_u16_le(raw, 4);
        let name_len = raw[6];
        let file_type = raw[7];

        if rec_len == 0 {
            return Ok(None);
        }
        if (rec_len as usize) < DIR_ENTRY_HEADER_LEN {
            return Err(Ext2Error::CorruptedFs("dir entry rec_len < 8"));
        }
        if rec_len as usize > raw.len() {
            return Err(Ext2Error::CorruptedFs("dir entry rec_len out of bounds"));
        }
        if rec_len % 4 != 0 {
            return Err(Ext2Error::CorruptedFs("dir entry rec_len not aligned"));
        }
        if DIR_ENTRY_HEADER_LEN + name_len as usize > rec_len as usize {
            return Err(Ext2Error::CorruptedFs("dir entry name exceeds rec_len"));
        }

        let name_end = DIR_ENTRY_HEADER_LEN + name_len as usize;
        Ok(Some(DirEntry {
            inode,
            rec_len,
            name_len,
            file_type,
            name: raw[DIR_ENTRY_HEADER_LEN..name_end].to_vec(),
        }))
    }

    pub fn is_unused(&self) -> bool {
        self.inode == 0
    }

    /// Compare the length-prefixed name against `name` byte for byte.
    pub fn name_matches(&self, name: &[u8]) -> bool {
        self.name.as_slice() == name
    }

    /// Name for display; invalid UTF-8 is replaced.
    pub fn name_str(&self) -> String {
        String::from_utf8_lossy(&self.name).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(inode: u32, rec_len: u16, name: &[u8]) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&inode.to_le_bytes());
        raw.extend_from_slice(&rec_len.to_le_bytes());
        raw.push(name.len() as u8);
        raw.push(1);
        raw.extend_from_slice(name);
        raw.resize(rec_len.max(8) as usize, 0);
        raw
    }

    #[test]
    fn test_parse_name_is_length_prefixed() {
        // trailing padding must not leak into the name
        let mut raw = record(12, 16, b"abc");
        raw[11] = b'x';
        let entry = DirEntry::parse(&raw).unwrap().unwrap();
        assert_eq!(entry.inode, 12);
        assert_eq!(entry.rec_len, 16);
        assert!(entry.name_matches(b"abc"));
        assert!(!entry.name_matches(b"abcx"));
        assert_eq!(entry.name_str(), "abc");
    }

    #[test]
    fn test_zero_rec_len_is_end_sentinel() {
        let raw = record(5, 0, b"");
        assert_eq!(DirEntry::parse(&raw).unwrap(), None);
    }

    #[test]
    fn test_rec_len_past_buffer_is_corrupt() {
        let mut raw = record(5, 16, b"a");
        raw.truncate(12);
        assert!(matches!(
            DirEntry::parse(&raw),
            Err(Ext2Error::CorruptedFs(_))
        ));
    }

    #[test]
    fn test_name_longer_than_record_is_corrupt() {
        let mut raw = record(5, 12, b"abcd");
        raw[6] = 9;
        assert!(matches!(
            DirEntry::parse(&raw),
            Err(Ext2Error::CorruptedFs(_))
        ));
    }
}

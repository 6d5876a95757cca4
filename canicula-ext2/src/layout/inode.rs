use super::{read_u16_le, read_u32_le};
use crate::error::{Ext2Error, Result};

/// The root directory is always inode 2.
pub const ROOT_INO: u32 = 2;

/// Number of direct block pointers in `i_block`.
pub const N_DIRECT: usize = 12;
/// Index of the singly-indirect pointer in `i_block`.
pub const SINGLY_INDIRECT: usize = 12;
/// Index of the doubly-indirect pointer in `i_block`.
pub const DOUBLY_INDIRECT: usize = 13;
/// Index of the triply-indirect pointer in `i_block`.
pub const TRIPLY_INDIRECT: usize = 14;
/// Total number of pointers in `i_block`.
pub const N_BLOCKS: usize = 15;

// File type nibble (i_mode >> 12)
pub const EXT2_FIFO: u16 = 0x1;
pub const EXT2_CHR: u16 = 0x2;
pub const EXT2_DIR: u16 = 0x4;
pub const EXT2_BLK: u16 = 0x6;
pub const EXT2_REG: u16 = 0x8;
pub const EXT2_LNK: u16 = 0xA;
pub const EXT2_SOCK: u16 = 0xC;

// Permission bits (low 9 bits of i_mode)
pub const EXT2_READ_USER: u16 = 0x100;
pub const EXT2_WRITE_USER: u16 = 0x080;
pub const EXT2_EXECUTE_USER: u16 = 0x040;
pub const EXT2_READ_GROUP: u16 = 0x020;
pub const EXT2_WRITE_GROUP: u16 = 0x010;
pub const EXT2_EXECUTE_GROUP: u16 = 0x008;
pub const EXT2_READ_OTHER: u16 = 0x004;
pub const EXT2_WRITE_OTHER: u16 = 0x002;
pub const EXT2_EXECUTE_OTHER: u16 = 0x001;

/// Parsed ext2 inode (the 128-byte base record).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub i_mode: u16,
    pub i_uid: u16,
    /// Low 32 bits of the size; the only size this driver honours.
    pub i_size: u32,
    pub i_atime: u32,
    pub i_ctime: u32,
    pub i_mtime: u32,
    pub i_dtime: u32,
    pub i_gid: u16,
    pub i_links_count: u16,
    /// In 512-byte sectors.
    pub i_blocks: u32,
    pub i_flags: u32,
    pub i_block: [u32; N_BLOCKS],
    pub i_generation: u32,
    pub i_file_acl: u32,
    /// `i_size_high` on regular files (revision >= 1). Parsed, never used.
    pub i_size_high: u32,
}

impl Inode {
    /// Parse an inode from raw bytes.
    ///
    /// `raw` is one inode record; only its first 128 bytes are interpreted.
    pub fn parse(raw: &[u8]) -> Result<Inode> {
        if raw.len() < 128 {
            return Err(Ext2Error::CorruptedFs("inode buffer < 128 bytes"));
        }

        let mut i_block = [0u32; N_BLOCKS];
        for (i, ptr) in i_block.iter_mut().enumerate() {
            *ptr = read_u32_le(raw, 0x28 + i * 4);
        }

        Ok(Inode {
            i_mode: read_u16_le(raw, 0x00),
            i_uid: read_u16_le(raw, 0x02),
            i_size: read_u32_le(raw, 0x04),
            i_atime: read_u32_le(raw, 0x08),
            i_ctime: read_u32_le(raw, 0x0C),
            i_mtime: read_u32_le(raw, 0x10),
            i_dtime: read_u32_le(raw, 0x14),
            i_gid: read_u16_le(raw, 0x18),
            i_links_count: read_u16_le(raw, 0x1A),
            i_blocks: read_u32_le(raw, 0x1C),
            i_flags: read_u32_le(raw, 0x20),
            i_block,
            i_generation: read_u32_le(raw, 0x64),
            i_file_acl: read_u32_le(raw, 0x68),
            i_size_high: read_u32_le(raw, 0x6C),
        })
    }

    /// High nibble of `i_mode`.
    pub fn type_nibble(&self) -> u16 {
        (self.i_mode >> 12) & 0x0F
    }

    pub fn is_dir(&self) -> bool {
        self.type_nibble() == EXT2_DIR
    }

    pub fn direct_blocks(&self) -> &[u32] {
        &self.i_block[..N_DIRECT]
    }

    pub fn singly_block(&self) -> u32 {
        self.i_block[SINGLY_INDIRECT]
    }

    pub fn doubly_block(&self) -> u32 {
        self.i_block[DOUBLY_INDIRECT]
    }

    pub fn triply_block(&self) -> u32 {
        self.i_block[TRIPLY_INDIRECT]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_block_pointers_and_mode() {
        let mut raw = [0u8; 128];
        raw[0x00..0x02].copy_from_slice(&0x41EDu16.to_le_bytes());
        raw[0x04..0x08].copy_from_slice(&5000u32.to_le_bytes());
        raw[0x1A..0x1C].copy_from_slice(&3u16.to_le_bytes());
        for i in 0..N_BLOCKS {
            let off = 0x28 + i * 4;
            raw[off..off + 4].copy_from_slice(&(100 + i as u32).to_le_bytes());
        }

        let inode = Inode::parse(&raw).unwrap();
        assert!(inode.is_dir());
        assert_eq!(inode.i_mode & 0x1FF, 0o755);
        assert_eq!(inode.i_size, 5000);
        assert_eq!(inode.i_links_count, 3);
        assert_eq!(inode.direct_blocks()[0], 100);
        assert_eq!(inode.direct_blocks()[11], 111);
        assert_eq!(inode.singly_block(), 112);
        assert_eq!(inode.doubly_block(), 113);
        assert_eq!(inode.triply_block(), 114);
    }

    #[test]
    fn test_parse_rejects_short_record() {
        assert!(matches!(
            Inode::parse(&[0u8; 64]),
            Err(Ext2Error::CorruptedFs(_))
        ));
    }
}

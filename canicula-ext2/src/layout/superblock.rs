use alloc::string::String;

use super::{read_u16_le, read_u32_le};
use crate::error::{Ext2Error, Result};

// ─── Constants ──────────────────────────────────────────────────────────────

/// ext2 super block magic number (at offset 0x38).
pub const EXT2_SUPER_MAGIC: u16 = 0xEF53;

/// Super block is always at byte offset 1024 from start of device.
pub const SUPER_BLOCK_OFFSET: u64 = 1024;

/// Super block raw size is always 1024 bytes.
pub const SUPER_BLOCK_SIZE: usize = 1024;

/// Inode record size of revision 0 filesystems.
pub const GOOD_OLD_INODE_SIZE: u16 = 128;

/// Largest `s_log_block_size` accepted (1024 << 6 = 64 KiB).
pub const MAX_LOG_BLOCK_SIZE: u32 = 6;

/// Parsed ext2 super block.
///
/// Only the fields this driver reads or reports are kept.
#[derive(Debug, Clone)]
pub struct SuperBlock {
    // basic counts
    pub s_inodes_count: u32,
    pub s_blocks_count: u32,
    pub s_r_blocks_count: u32,
    pub s_free_blocks_count: u32,
    pub s_free_inodes_count: u32,

    // geometry
    pub s_first_data_block: u32,
    pub s_log_block_size: u32,
    pub s_blocks_per_group: u32,
    pub s_inodes_per_group: u32,

    // identifiers
    pub s_magic: u16,
    pub s_state: u16,
    pub s_minor_rev_level: u16,
    pub s_rev_level: u32,

    // revision >= 1 only
    pub s_first_ino: u32,
    pub s_inode_size: u16,
    pub s_feature_compat: u32,
    pub s_feature_incompat: u32,
    pub s_feature_ro_compat: u32,
    pub s_uuid: [u8; 16],
    pub s_volume_name: [u8; 16],
}

impl SuperBlock {
    /// Parse a super block from raw 1024-byte on-disk data.
    ///
    /// Fails with `CorruptedFs` when the magic at 0x38 is not `0xEF53`.
    pub fn parse(raw: &[u8; SUPER_BLOCK_SIZE]) -> Result<SuperBlock> {
        let magic = read_u16_le(raw, 0x38);
        if magic != EXT2_SUPER_MAGIC {
            return Err(Ext2Error::CorruptedFs("bad super block magic"));
        }

        let mut s_uuid = [0u8; 16];
        s_uuid.copy_from_slice(&raw[0x68..0x78]);
        let mut s_volume_name = [0u8; 16];
        s_volume_name.copy_from_slice(&raw[0x78..0x88]);

        Ok(SuperBlock {
            s_inodes_count: read_u32_le(raw, 0x00),
            s_blocks_count: read_u32_le(raw, 0x04),
            s_r_blocks_count: read_u32_le(raw, 0x08),
            s_free_blocks_count: read_u32_le(raw, 0x0C),
            s_free_inodes_count: read_u32_le(raw, 0x10),
            s_first_data_block: read_u32_le(raw, 0x14),
            s_log_block_size: read_u32_le(raw, 0x18),
            s_blocks_per_group: read_u32_le(raw, 0x20),
            s_inodes_per_group: read_u32_le(raw, 0x28),
            s_magic: magic,
            s_state: read_u16_le(raw, 0x3A),
            s_minor_rev_level: read_u16_le(raw, 0x3E),
            s_rev_level: read_u32_le(raw, 0x4C),
            s_first_ino: read_u32_le(raw, 0x54),
            s_inode_size: read_u16_le(raw, 0x58),
            s_feature_compat: read_u32_le(raw, 0x5C),
            s_feature_incompat: read_u32_le(raw, 0x60),
            s_feature_ro_compat: read_u32_le(raw, 0x64),
            s_uuid,
            s_volume_name,
        })
    }

    /// Validate the geometry every offset computation depends on.
    pub fn validate(&self) -> Result<()> {
        if self.s_magic != EXT2_SUPER_MAGIC {
            return Err(Ext2Error::CorruptedFs("bad super block magic"));
        }

        if self.s_log_block_size > MAX_LOG_BLOCK_SIZE {
            return Err(Ext2Error::CorruptedFs("invalid log_block_size (> 6)"));
        }

        if self.s_inodes_per_group == 0 {
            return Err(Ext2Error::CorruptedFs("inodes_per_group is zero"));
        }

        if self.s_blocks_per_group == 0 {
            return Err(Ext2Error::CorruptedFs("blocks_per_group is zero"));
        }

        if self.s_rev_level >= 1 {
            let inode_size = self.s_inode_size as usize;
            if inode_size < GOOD_OLD_INODE_SIZE as usize {
                return Err(Ext2Error::CorruptedFs("inode_size < 128"));
            }
            if !inode_size.is_power_of_two() {
                return Err(Ext2Error::CorruptedFs("inode_size not power of two"));
            }
            if inode_size > self.block_size() {
                return Err(Ext2Error::CorruptedFs("inode_size larger than a block"));
            }
        }

        // One bitmap block per group tracks its blocks and its inodes.
        let bitmap_bits = 8 * self.block_size() as u64;
        if self.s_blocks_per_group as u64 > bitmap_bits {
            return Err(Ext2Error::CorruptedFs("blocks_per_group exceeds bitmap"));
        }
        if self.s_inodes_per_group as u64 > bitmap_bits {
            return Err(Ext2Error::CorruptedFs("inodes_per_group exceeds bitmap"));
        }

        let inode_capacity = self.group_count() as u64 * self.s_inodes_per_group as u64;
        if self.s_inodes_count as u64 > inode_capacity {
            return Err(Ext2Error::CorruptedFs("inodes_count exceeds group capacity"));
        }

        // Each group holds its two bitmaps and its inode table.
        let table_blocks = (self.s_inodes_per_group as u64 * self.inode_size() as u64)
            .div_ceil(self.block_size() as u64);
        if table_blocks + 2 > self.s_blocks_per_group as u64 {
            return Err(Ext2Error::CorruptedFs("inode table does not fit its group"));
        }

        Ok(())
    }

    // Convenience accessors

    /// Block size in bytes: `1024 << s_log_block_size`.
    pub fn block_size(&self) -> usize {
        1024usize << self.s_log_block_size
    }

    /// Inode record size: `s_inode_size` from revision 1 on, else 128.
    pub fn inode_size(&self) -> u16 {
        if self.s_rev_level >= 1 {
            self.s_inode_size
        } else {
            GOOD_OLD_INODE_SIZE
        }
    }

    /// Number of block groups: `ceil(s_blocks_count / s_blocks_per_group)`.
    pub fn group_count(&self) -> u32 {
        self.s_blocks_count.div_ceil(self.s_blocks_per_group)
    }

    /// Volume label with trailing NULs removed.
    pub fn volume_name(&self) -> String {
        let end = self
            .s_volume_name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.s_volume_name.len());
        String::from_utf8_lossy(&self.s_volume_name[..end]).into()
    }
}

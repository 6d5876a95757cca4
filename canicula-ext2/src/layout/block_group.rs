use super::{read_u16_le, read_u32_le};
use crate::error::{Ext2Error, Result};

/// On-disk size of one ext2 block group descriptor.
pub const DESC_SIZE: usize = 32;

/// Parsed ext2 block group descriptor.
///
/// Only `bg_inode_table` is needed to locate inodes; the counters are kept
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGroupDesc {
    pub bg_block_bitmap: u32,
    pub bg_inode_bitmap: u32,
    pub bg_inode_table: u32,
    pub bg_free_blocks_count: u16,
    pub bg_free_inodes_count: u16,
    pub bg_used_dirs_count: u16,
}

impl BlockGroupDesc {
    /// Parse one 32-byte descriptor from the start of `raw`.
    pub fn parse(raw: &[u8]) -> Result<BlockGroupDesc> {
        if raw.len() < DESC_SIZE {
            return Err(Ext2Error::CorruptedFs("block group desc too small"));
        }

        Ok(BlockGroupDesc {
            bg_block_bitmap: read_u32_le(raw, 0x00),
            bg_inode_bitmap: read_u32_le(raw, 0x04),
            bg_inode_table: read_u32_le(raw, 0x08),
            bg_free_blocks_count: read_u16_le(raw, 0x0C),
            bg_free_inodes_count: read_u16_le(raw, 0x0E),
            bg_used_dirs_count: read_u16_le(raw, 0x10),
        })
    }
}

use log::debug;

use crate::error::Result;
use crate::io::block_reader::BlockReader;
use crate::layout::superblock::{SUPER_BLOCK_OFFSET, SUPER_BLOCK_SIZE, SuperBlock};
use crate::traits::block_device::BlockDevice;

/// Super block manager.
///
/// Loads the super block from disk, validates it, and keeps the derived
/// geometry every later step of the same operation needs. Nothing here
/// outlives the operation that loaded it.
pub struct SuperBlockManager {
    /// The parsed super block.
    pub super_block: SuperBlock,
    /// Filesystem block size in bytes (`1024 << s_log_block_size`).
    pub block_size: usize,
    /// Inode record size (128 before revision 1).
    pub inode_size: usize,
    /// Number of block groups.
    pub group_count: u32,
    /// First block of the group descriptor table.
    pub desc_table_start: u32,
}

impl SuperBlockManager {
    /// Load the super block from the device via the given block reader.
    ///
    /// 1. Read 1024 raw bytes from byte offset 1024.
    /// 2. `SuperBlock::parse()` (magic check) and `validate()`.
    /// 3. Cache derived parameters.
    pub fn load<D: BlockDevice>(reader: &BlockReader<D>) -> Result<Self> {
        let mut raw = [0u8; SUPER_BLOCK_SIZE];
        reader.read_bytes(SUPER_BLOCK_OFFSET, &mut raw)?;

        let super_block = SuperBlock::parse(&raw)?;
        super_block.validate()?;

        let block_size = super_block.block_size();
        let manager = SuperBlockManager {
            block_size,
            inode_size: super_block.inode_size() as usize,
            group_count: super_block.group_count(),
            desc_table_start: Self::desc_table_start(block_size),
            super_block,
        };

        debug!(
            "ext2: {} rev {}.{}: block size {}, inode size {}, {} groups",
            reader.identifier(),
            manager.super_block.s_rev_level,
            manager.super_block.s_minor_rev_level,
            manager.block_size,
            manager.inode_size,
            manager.group_count
        );

        Ok(manager)
    }

    /// Descriptor table start block.
    ///
    /// Block 0 holds the boot record (and, for blocks >= 2 KiB, the super block
    /// too), so the table sits right after the super block's block.
    pub fn desc_table_start(block_size: usize) -> u32 {
        if block_size == 1024 { 2 } else { 1 }
    }
}

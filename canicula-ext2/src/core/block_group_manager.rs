use alloc::vec::Vec;

use crate::error::{Ext2Error, Result};
use crate::fs_core::superblock_manager::SuperBlockManager;
use crate::io::block_reader::BlockReader;
use crate::layout::block_group::{BlockGroupDesc, DESC_SIZE};
use crate::traits::block_device::BlockDevice;

/// Block group manager.
///
/// Holds the descriptor table read for the current operation and locates
/// each group's inode table.
pub struct BlockGroupManager {
    descriptors: Vec<BlockGroupDesc>,
}

impl BlockGroupManager {
    /// Load all block group descriptors from the device.
    ///
    /// Reads `group_count` descriptors, rounded up to whole blocks, starting
    /// at `desc_table_start` in a single request.
    pub fn load<D: BlockDevice>(
        reader: &BlockReader<D>,
        super_block_manager: &SuperBlockManager,
    ) -> Result<Self> {
        let block_size = super_block_manager.block_size;
        let group_count = super_block_manager.group_count as usize;

        let blocks_needed = (group_count * DESC_SIZE).div_ceil(block_size);
        let mut table = reader.block_buffer(blocks_needed)?;
        reader.read_blocks(super_block_manager.desc_table_start, blocks_needed, &mut table)?;

        let descriptors = table
            .chunks_exact(DESC_SIZE)
            .take(group_count)
            .map(BlockGroupDesc::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(BlockGroupManager { descriptors })
    }

    /// Get the descriptor for the given block group number.
    pub fn get_desc(&self, group_no: u32) -> Result<&BlockGroupDesc> {
        self.descriptors
            .get(group_no as usize)
            .ok_or(Ext2Error::CorruptedFs("block group out of range"))
    }

    /// Block number of the inode table for the given group.
    pub fn inode_table_block(&self, group_no: u32) -> Result<u32> {
        Ok(self.get_desc(group_no)?.bg_inode_table)
    }
}

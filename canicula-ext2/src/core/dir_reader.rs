use alloc::vec::Vec;
use core::ops::ControlFlow;

use crate::error::{Ext2Error, Result};
use crate::fs_core::block_map::BlockMap;
use crate::fs_core::superblock_manager::SuperBlockManager;
use crate::io::block_reader::BlockReader;
use crate::layout::dir_entry::{DIR_ENTRY_HEADER_LEN, DirEntry};
use crate::layout::inode::Inode;
use crate::traits::block_device::BlockDevice;

/// Directory reader for `read_dir` and `lookup`.
pub struct DirReader;

impl DirReader {
    /// Read all live directory entries (inode != 0) in on-disk order.
    pub fn read_dir_entries<D: BlockDevice>(
        reader: &BlockReader<D>,
        super_block_manager: &SuperBlockManager,
        dir_inode: &Inode,
    ) -> Result<Vec<DirEntry>> {
        let data = BlockMap::read_all(reader, super_block_manager, dir_inode)?;
        let mut out = Vec::new();
        Self::scan(&data, super_block_manager.block_size, |entry| {
            out.push(entry);
            ControlFlow::Continue(())
        })?;
        Ok(out)
    }

    /// Linear lookup of `name` in a directory.
    pub fn lookup<D: BlockDevice>(
        reader: &BlockReader<D>,
        super_block_manager: &SuperBlockManager,
        dir_inode: &Inode,
        name: &[u8],
    ) -> Result<u32> {
        let data = BlockMap::read_all(reader, super_block_manager, dir_inode)?;
        let mut found = None;
        Self::scan(&data, super_block_manager.block_size, |entry| {
            if entry.name_matches(name) {
                found = Some(entry.inode);
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        found.ok_or(Ext2Error::NotFound)
    }

    /// Visit live entries block by block.
    ///
    /// A record never straddles a block. A `rec_len == 0` record ends the
    /// whole scan, as does running out of blocks.
    pub fn scan<F>(data: &[u8], block_size: usize, mut visit: F) -> Result<()>
    where
        F: FnMut(DirEntry) -> ControlFlow<()>,
    {
        for block in data.chunks(block_size) {
            let mut off = 0usize;
            while off + DIR_ENTRY_HEADER_LEN <= block.len() {
                let Some(entry) = DirEntry::parse(&block[off..])? else {
                    return Ok(());
                };
                off += entry.rec_len as usize;
                if entry.is_unused() {
                    continue;
                }
                if visit(entry).is_break() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

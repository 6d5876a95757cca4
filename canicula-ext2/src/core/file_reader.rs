use crate::error::{Ext2Error, Result};
use crate::fs_core::block_map::BlockMap;
use crate::fs_core::superblock_manager::SuperBlockManager;
use crate::io::block_reader::BlockReader;
use crate::layout::inode::Inode;
use crate::traits::block_device::BlockDevice;

/// File data reader.
pub struct FileReader;

impl FileReader {
    /// Copy file bytes starting at `position` into `buf`.
    ///
    /// A `position` at or past the end of file is an `IoError`, not a
    /// zero-length read. Otherwise the count is clamped to
    /// `i_size - position` and returned. The caller advances its position.
    pub fn read<D: BlockDevice>(
        reader: &BlockReader<D>,
        super_block_manager: &SuperBlockManager,
        inode: &Inode,
        position: u64,
        buf: &mut [u8],
    ) -> Result<usize> {
        let size = inode.i_size as u64;
        if position >= size {
            return Err(Ext2Error::IoError);
        }

        let count = core::cmp::min(buf.len() as u64, size - position) as usize;

        // Bytes past the last mapped block read as zeros.
        let data = BlockMap::read_all(reader, super_block_manager, inode)?;
        let tail = data.get((position as usize)..).unwrap_or(&[]);
        let mapped = tail.len().min(count);
        buf[..mapped].copy_from_slice(&tail[..mapped]);
        buf[mapped..count].fill(0);
        Ok(count)
    }
}

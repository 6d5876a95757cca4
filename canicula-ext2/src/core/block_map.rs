use alloc::vec;
use alloc::vec::Vec;

use crate::error::{Ext2Error, Result};
use crate::fs_core::superblock_manager::SuperBlockManager;
use crate::io::block_reader::BlockReader;
use crate::layout::inode::Inode;
use crate::layout::read_u32_le;
use crate::traits::block_device::BlockDevice;

/// Ordered data blocks produced by one level of the block map, with the
/// number of bytes they cover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockRun {
    pub blocks: Vec<u32>,
    pub bytes: usize,
}

impl BlockRun {
    fn from_blocks(blocks: Vec<u32>, block_size: usize) -> Self {
        let bytes = blocks.len() * block_size;
        Self { blocks, bytes }
    }

    /// Append a later run after this one.
    pub fn append(&mut self, mut other: BlockRun) {
        self.blocks.append(&mut other.blocks);
        self.bytes += other.bytes;
    }
}

/// Classic ext2 block map walker (12 direct, singly, doubly pointers).
///
/// Every run stops at its first zero pointer; holes are not represented.
pub struct BlockMap;

impl BlockMap {
    /// Collect the inode's data blocks in file order.
    ///
    /// A non-zero triply-indirect pointer fails with `Unsupported` before any
    /// block is read.
    pub fn collect<D: BlockDevice>(
        reader: &BlockReader<D>,
        super_block_manager: &SuperBlockManager,
        inode: &Inode,
    ) -> Result<BlockRun> {
        if inode.triply_block() != 0 {
            return Err(Ext2Error::Unsupported("triply-indirect blocks"));
        }

        let block_size = super_block_manager.block_size;
        let mut run = Self::direct_run(inode, block_size);

        if inode.singly_block() != 0 {
            run.append(Self::expand_singly(reader, inode.singly_block())?);
        }

        if inode.doubly_block() != 0 {
            run.append(Self::expand_doubly(reader, inode.doubly_block())?);
        }

        Ok(run)
    }

    /// Read every data block of the inode, concatenated in file order.
    ///
    /// The result is `collect().bytes` long, i.e. whole blocks.
    pub fn read_all<D: BlockDevice>(
        reader: &BlockReader<D>,
        super_block_manager: &SuperBlockManager,
        inode: &Inode,
    ) -> Result<Vec<u8>> {
        let block_size = super_block_manager.block_size;
        let run = Self::collect(reader, super_block_manager, inode)?;

        let mut data = reader.block_buffer(run.blocks.len())?;
        for (block_no, dest) in run.blocks.iter().zip(data.chunks_exact_mut(block_size)) {
            reader.read_block(*block_no, dest)?;
        }
        Ok(data)
    }

    fn direct_run(inode: &Inode, block_size: usize) -> BlockRun {
        let blocks = inode
            .direct_blocks()
            .iter()
            .copied()
            .take_while(|&b| b != 0)
            .collect();
        BlockRun::from_blocks(blocks, block_size)
    }

    /// Data blocks listed by one singly-indirect block.
    pub fn expand_singly<D: BlockDevice>(
        reader: &BlockReader<D>,
        block_no: u32,
    ) -> Result<BlockRun> {
        let blocks = Self::read_pointers(reader, block_no)?;
        Ok(BlockRun::from_blocks(blocks, reader.block_size()))
    }

    /// Data blocks reached through one doubly-indirect block.
    pub fn expand_doubly<D: BlockDevice>(
        reader: &BlockReader<D>,
        block_no: u32,
    ) -> Result<BlockRun> {
        let mut run = BlockRun::default();
        for singly in Self::read_pointers(reader, block_no)? {
            run.append(Self::expand_singly(reader, singly)?);
        }
        Ok(run)
    }

    /// Pointers of an indirect block, up to the first zero entry.
    fn read_pointers<D: BlockDevice>(reader: &BlockReader<D>, block_no: u32) -> Result<Vec<u32>> {
        let mut buf = vec![0u8; reader.block_size()];
        reader.read_block(block_no, &mut buf)?;

        Ok((0..buf.len())
            .step_by(4)
            .map(|off| read_u32_le(&buf, off))
            .take_while(|&b| b != 0)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_core::block_group_manager::BlockGroupManager;
    use crate::fs_core::inode_reader::InodeReader;
    use crate::tests::{ImageBuilder, MemoryDevice, dir_mode, file_mode, pattern};

    struct Fixture {
        device: MemoryDevice,
    }

    impl Fixture {
        fn new(builder: ImageBuilder) -> Self {
            Self {
                device: MemoryDevice::new("/dev/hda1", builder.build()),
            }
        }

        fn with_inode<T>(
            &self,
            ino: u32,
            f: impl FnOnce(&BlockReader<&MemoryDevice>, &SuperBlockManager, &Inode) -> T,
        ) -> T {
            let mut reader = BlockReader::new(&self.device, "/dev/hda1");
            let sbm = SuperBlockManager::load(&reader).unwrap();
            reader.set_block_size(sbm.block_size);
            let bgm = BlockGroupManager::load(&reader, &sbm).unwrap();
            let inode = InodeReader::read_inode(&reader, &sbm, &bgm, ino).unwrap();
            f(&reader, &sbm, &inode)
        }
    }

    fn builder() -> ImageBuilder {
        let mut builder = ImageBuilder::new(1024).blocks(2048, 1024).inodes_per_group(16);
        builder.add_dir(2, dir_mode(0o755), &[]);
        builder
    }

    #[test]
    fn test_small_file_uses_direct_blocks_only() {
        let mut b = builder();
        let blocks = b.add_file(12, file_mode(0o644), &pattern(5000));
        let fixture = Fixture::new(b);

        fixture.with_inode(12, |reader, sbm, inode| {
            assert_eq!(inode.singly_block(), 0);
            assert_eq!(inode.doubly_block(), 0);
            let run = BlockMap::collect(reader, sbm, inode).unwrap();
            assert_eq!(run.blocks.len(), 5);
            assert_eq!(run.blocks, blocks);
            assert_eq!(run.bytes, 5 * 1024);
        });
    }

    #[test]
    fn test_thirteenth_block_comes_from_singly_indirect() {
        let mut b = builder();
        let blocks = b.add_file(12, file_mode(0o644), &pattern(13 * 1024));
        let fixture = Fixture::new(b);

        fixture.with_inode(12, |reader, sbm, inode| {
            assert_ne!(inode.singly_block(), 0);
            let singly = BlockMap::expand_singly(reader, inode.singly_block()).unwrap();
            assert_eq!(singly.blocks, vec![blocks[12]]);

            let run = BlockMap::collect(reader, sbm, inode).unwrap();
            assert_eq!(run.blocks, blocks);
            assert_eq!(run.blocks[..12], inode.direct_blocks()[..]);

            let data = BlockMap::read_all(reader, sbm, inode).unwrap();
            assert_eq!(data, pattern(13 * 1024));
        });
    }

    #[test]
    fn test_doubly_indirect_follows_singly() {
        // 12 direct + 256 singly + 3 through the doubly-indirect block
        let len = (12 + 256 + 3) * 1024 - 100;
        let mut b = builder();
        let blocks = b.add_file(12, file_mode(0o644), &pattern(len));
        let fixture = Fixture::new(b);

        fixture.with_inode(12, |reader, sbm, inode| {
            assert_ne!(inode.doubly_block(), 0);
            let doubly = BlockMap::expand_doubly(reader, inode.doubly_block()).unwrap();
            assert_eq!(doubly.blocks, blocks[268..]);
            assert_eq!(doubly.bytes, 3 * 1024);

            let data = BlockMap::read_all(reader, sbm, inode).unwrap();
            assert_eq!(data.len(), 271 * 1024);
            assert_eq!(data[..len], pattern(len)[..]);
        });
    }

    #[test]
    fn test_zero_direct_pointer_ends_direct_run() {
        let mut b = builder();
        let blocks = b.add_file(12, file_mode(0o644), &pattern(3 * 1024));
        let mut i_block = [0u32; 15];
        i_block[0] = blocks[0];
        i_block[2] = blocks[2];
        b.set_block_pointers(12, i_block);
        let fixture = Fixture::new(b);

        fixture.with_inode(12, |reader, sbm, inode| {
            let run = BlockMap::collect(reader, sbm, inode).unwrap();
            assert_eq!(run.blocks, vec![blocks[0]]);
        });
    }

    #[test]
    fn test_triply_indirect_is_unsupported() {
        let mut b = builder();
        let blocks = b.add_file(12, file_mode(0o644), &pattern(1024));
        let mut i_block = [0u32; 15];
        i_block[0] = blocks[0];
        i_block[14] = 900;
        b.set_block_pointers(12, i_block);
        let fixture = Fixture::new(b);

        fixture.with_inode(12, |reader, sbm, inode| {
            assert_eq!(
                BlockMap::collect(reader, sbm, inode),
                Err(Ext2Error::Unsupported("triply-indirect blocks"))
            );
            assert!(matches!(
                BlockMap::read_all(reader, sbm, inode),
                Err(Ext2Error::Unsupported(_))
            ));
        });
    }
}

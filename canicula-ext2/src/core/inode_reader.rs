
use crate::error::{Ext2Error, Result};
use crate::fs_core::block_group_manager::BlockGroupManager;
use crate::fs_core::superblock_manager::SuperBlockManager;
use crate::io::block_reader::BlockReader;
use crate::layout::inode::{Inode, ROOT_INO};
use crate::layout::superblock::SuperBlock;
use crate::traits::block_device::BlockDevice;

/// Inode reader: locates and reads inodes from disk.
///
/// Stateless: all context is passed as parameters.
pub struct InodeReader;

impl InodeReader {
    /// Block group and index within that group's inode table for `ino`.
    ///
    /// Inode numbers are 1-based: `group = (ino - 1) / s_inodes_per_group`,
    /// `index = (ino - 1) % s_inodes_per_group`.
    pub fn locate(super_block: &SuperBlock, ino: u32) -> (u32, u32) {
        let inodes_per_group = super_block.s_inodes_per_group;
        ((ino - 1) / inodes_per_group, (ino - 1) % inodes_per_group)
    }

    /// Read and parse the inode with the given inode number.
    ///
    /// The whole inode table of the owning group is read (rounded up to
    /// whole blocks) and the `index`-th record extracted.
    pub fn read_inode<D: BlockDevice>(
        reader: &BlockReader<D>,
        super_block_manager: &SuperBlockManager,
        block_group_manager: &BlockGroupManager,
        ino: u32,
    ) -> Result<Inode> {
        let super_block = &super_block_manager.super_block;

        // Validate inode number (inode 0 does not exist; numbering starts at 1)
        if ino == 0 || ino > super_block.s_inodes_count {
            return Err(Ext2Error::CorruptedFs("inode number out of range"));
        }

        let block_size = super_block_manager.block_size;
        let inode_size = super_block_manager.inode_size;
        let (group, index) = Self::locate(super_block, ino);
        let table_block = block_group_manager.inode_table_block(group)?;

        let table_bytes = super_block.s_inodes_per_group as usize * inode_size;
        let table_blocks = table_bytes.div_ceil(block_size);
        let mut table = reader.block_buffer(table_blocks)?;
        reader.read_blocks(table_block, table_blocks, &mut table)?;

        let offset = index as usize * inode_size;
        Inode::parse(&table[offset..offset + inode_size])
    }

    /// Read the root directory inode (always inode 2).
    pub fn read_root_inode<D: BlockDevice>(
        reader: &BlockReader<D>,
        super_block_manager: &SuperBlockManager,
        block_group_manager: &BlockGroupManager,
    ) -> Result<Inode> {
        Self::read_inode(reader, super_block_manager, block_group_manager, ROOT_INO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::superblock::SUPER_BLOCK_SIZE;
    use crate::tests::{ImageBuilder, MemoryDevice, dir_mode, file_mode};

    fn super_block(inodes_per_group: u32) -> SuperBlock {
        let mut raw = [0u8; SUPER_BLOCK_SIZE];
        raw[0x20..0x24].copy_from_slice(&8192u32.to_le_bytes());
        raw[0x28..0x2C].copy_from_slice(&inodes_per_group.to_le_bytes());
        raw[0x38..0x3A].copy_from_slice(&0xEF53u16.to_le_bytes());
        SuperBlock::parse(&raw).unwrap()
    }

    #[test]
    fn test_locate_is_one_based() {
        let sb = super_block(8192);
        assert_eq!(InodeReader::locate(&sb, 1), (0, 0));
        assert_eq!(InodeReader::locate(&sb, 2), (0, 1));
        assert_eq!(InodeReader::locate(&sb, 8192), (0, 8191));
        assert_eq!(InodeReader::locate(&sb, 8193), (1, 0));
        assert_eq!(InodeReader::locate(&sb, 20000), (2, 3615));
    }

    #[test]
    fn test_locate_matches_group_tables() {
        let sb = super_block(16);
        for ino in 1..=64u32 {
            let (group, index) = InodeReader::locate(&sb, ino);
            assert_eq!(group * 16 + index + 1, ino);
            assert!(index < 16);
        }
    }

    #[test]
    fn test_read_inode_in_second_group() {
        let mut builder = ImageBuilder::new(1024).blocks(1024, 256).inodes_per_group(16);
        builder.add_dir(2, dir_mode(0o755), &[]);
        builder.add_file(20, file_mode(0o644), b"second group");
        let device = MemoryDevice::new("/dev/hda1", builder.build());
        let mut reader = BlockReader::new(&device, "/dev/hda1");
        let sbm = SuperBlockManager::load(&reader).unwrap();
        reader.set_block_size(sbm.block_size);
        let bgm = BlockGroupManager::load(&reader, &sbm).unwrap();

        let inode = InodeReader::read_inode(&reader, &sbm, &bgm, 20).unwrap();
        assert_eq!(inode.i_size, 12);
        assert_eq!(inode.i_mode, file_mode(0o644));

        let root = InodeReader::read_root_inode(&reader, &sbm, &bgm).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_read_inode_with_large_records() {
        let mut builder = ImageBuilder::new(1024)
            .blocks(1024, 256)
            .inodes_per_group(16)
            .inode_size(256);
        builder.add_dir(2, dir_mode(0o755), &[]);
        builder.add_file(13, file_mode(0o600), b"x");
        let device = MemoryDevice::new("/dev/hda1", builder.build());
        let mut reader = BlockReader::new(&device, "/dev/hda1");
        let sbm = SuperBlockManager::load(&reader).unwrap();
        reader.set_block_size(sbm.block_size);
        let bgm = BlockGroupManager::load(&reader, &sbm).unwrap();

        assert_eq!(sbm.inode_size, 256);
        let inode = InodeReader::read_inode(&reader, &sbm, &bgm, 13).unwrap();
        assert_eq!(inode.i_mode, file_mode(0o600));
        assert_eq!(inode.i_size, 1);
    }

    #[test]
    fn test_inode_zero_and_past_end_are_rejected() {
        let mut builder = ImageBuilder::new(1024).blocks(1024, 256).inodes_per_group(16);
        builder.add_dir(2, dir_mode(0o755), &[]);
        let device = MemoryDevice::new("/dev/hda1", builder.build());
        let mut reader = BlockReader::new(&device, "/dev/hda1");
        let sbm = SuperBlockManager::load(&reader).unwrap();
        reader.set_block_size(sbm.block_size);
        let bgm = BlockGroupManager::load(&reader, &sbm).unwrap();

        for ino in [0, 65] {
            assert!(matches!(
                InodeReader::read_inode(&reader, &sbm, &bgm, ino),
                Err(Ext2Error::CorruptedFs(_))
            ));
        }
    }
}

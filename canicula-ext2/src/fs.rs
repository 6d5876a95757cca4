use alloc::string::String;
use alloc::vec::Vec;

use canicula_common::fs::{FileHandle, Mountpoint, Stat, StatFs};

use crate::error::{Ext2Error, Result};
use crate::fs_core::block_group_manager::BlockGroupManager;
use crate::fs_core::dir_reader::DirReader;
use crate::fs_core::file_reader::FileReader;
use crate::fs_core::inode_reader::InodeReader;
use crate::fs_core::path_resolver::PathResolver;
use crate::fs_core::stat_mapper::StatMapper;
use crate::fs_core::superblock_manager::SuperBlockManager;
use crate::io::block_reader::BlockReader;
use crate::layout::dir_entry::DirEntry;
use crate::layout::inode::Inode;
use crate::traits::block_device::BlockDevice;
use crate::traits::vfs::FileSystemOps;

/// Volume summary returned by [`Ext2FileSystem::probe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub block_size: usize,
    pub inode_size: usize,
    pub group_count: u32,
    pub blocks_count: u32,
    pub inodes_count: u32,
    pub rev_level: u32,
    pub minor_rev_level: u16,
    pub volume_name: String,
}

/// Read-only ext2 driver.
///
/// Holds nothing but the device layer: each operation re-reads the super
/// block, descriptor table and inodes it needs from the mountpoint's device.
pub struct Ext2FileSystem<D: BlockDevice> {
    device: D,
}

impl<D: BlockDevice> Ext2FileSystem<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Load and validate the super block of `mountpoint`'s device.
    ///
    /// The mount path calls this before adding the volume to the mount table.
    pub fn probe(&self, mountpoint: &Mountpoint) -> Result<VolumeInfo> {
        let (_, sb_manager) = self.open_volume(mountpoint)?;
        let super_block = &sb_manager.super_block;
        Ok(VolumeInfo {
            block_size: sb_manager.block_size,
            inode_size: sb_manager.inode_size,
            group_count: sb_manager.group_count,
            blocks_count: super_block.s_blocks_count,
            inodes_count: super_block.s_inodes_count,
            rev_level: super_block.s_rev_level,
            minor_rev_level: super_block.s_minor_rev_level,
            volume_name: super_block.volume_name(),
        })
    }

    /// Resolve `path` to its inode number.
    pub fn resolve_path(&self, mountpoint: &Mountpoint, path: &str) -> Result<u32> {
        let (reader, sb_manager) = self.open_volume(mountpoint)?;
        let bg_manager = BlockGroupManager::load(&reader, &sb_manager)?;
        PathResolver::resolve(&reader, &sb_manager, &bg_manager, &mountpoint.path, path)
    }

    fn open_volume<'m>(
        &self,
        mountpoint: &'m Mountpoint,
    ) -> Result<(BlockReader<'m, &D>, SuperBlockManager)> {
        let mut reader = BlockReader::new(&self.device, &mountpoint.device);
        let sb_manager = SuperBlockManager::load(&reader)?;
        reader.set_block_size(sb_manager.block_size);
        Ok((reader, sb_manager))
    }

    /// Resolve `path` and read its inode within one operation.
    fn lookup_inode<'m>(
        &self,
        mountpoint: &'m Mountpoint,
        path: &str,
    ) -> Result<(BlockReader<'m, &D>, SuperBlockManager, u32, Inode)> {
        let (reader, sb_manager) = self.open_volume(mountpoint)?;
        let bg_manager = BlockGroupManager::load(&reader, &sb_manager)?;
        let ino = PathResolver::resolve(&reader, &sb_manager, &bg_manager, &mountpoint.path, path)?;
        let inode = InodeReader::read_inode(&reader, &sb_manager, &bg_manager, ino)?;
        Ok((reader, sb_manager, ino, inode))
    }
}

impl<D: BlockDevice> FileSystemOps for Ext2FileSystem<D> {
    fn stat(&self, mountpoint: &Mountpoint, path: &str) -> Result<Stat> {
        let (_, sb_manager, ino, inode) = self.lookup_inode(mountpoint, path)?;
        Ok(StatMapper::map(ino, &inode, sb_manager.block_size, path))
    }

    fn fstat(&self, mountpoint: &Mountpoint, file: &FileHandle) -> Result<Stat> {
        if !file.present {
            return Err(Ext2Error::BadFileHandle);
        }
        self.stat(mountpoint, &file.path)
    }

    fn read(
        &self,
        mountpoint: &Mountpoint,
        file: &mut FileHandle,
        buf: &mut [u8],
    ) -> Result<usize> {
        if !file.present || !file.flags.is_readable() {
            return Err(Ext2Error::BadFileHandle);
        }

        let (reader, sb_manager, _, inode) = self.lookup_inode(mountpoint, &file.path)?;
        let n = FileReader::read(&reader, &sb_manager, &inode, file.position, buf)?;
        file.position += n as u64;
        Ok(n)
    }

    fn read_dir(&self, mountpoint: &Mountpoint, path: &str) -> Result<Vec<DirEntry>> {
        let (reader, sb_manager, _, inode) = self.lookup_inode(mountpoint, path)?;
        if !inode.is_dir() {
            return Err(Ext2Error::NotDirectory);
        }
        DirReader::read_dir_entries(&reader, &sb_manager, &inode)
    }

    fn stat_fs(&self, mountpoint: &Mountpoint) -> Result<StatFs> {
        let (_, sb_manager) = self.open_volume(mountpoint)?;
        let super_block = &sb_manager.super_block;
        Ok(StatFs {
            block_size: sb_manager.block_size as u64,
            total_blocks: super_block.s_blocks_count as u64,
            free_blocks: super_block.s_free_blocks_count as u64,
            total_inodes: super_block.s_inodes_count as u64,
            free_inodes: super_block.s_free_inodes_count as u64,
        })
    }
}

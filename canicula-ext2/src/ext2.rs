#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;
pub mod fs;
pub mod io;
pub mod layout;
pub mod traits;

// `core/` would shadow the `core` crate, so the module is named `fs_core`.
#[path = "core/mod.rs"]
pub mod fs_core;

#[cfg(test)]
mod tests;

// Re-exports
pub use error::Ext2Error;
pub use fs::{Ext2FileSystem, VolumeInfo};
pub use fs_core::block_group_manager::BlockGroupManager;
pub use fs_core::block_map::{BlockMap, BlockRun};
pub use fs_core::dir_reader::DirReader;
pub use fs_core::file_reader::FileReader;
pub use fs_core::inode_reader::InodeReader;
pub use fs_core::path_resolver::PathResolver;
pub use fs_core::stat_mapper::StatMapper;
pub use fs_core::superblock_manager::SuperBlockManager;
pub use io::block_reader::BlockReader;
pub use layout::block_group::BlockGroupDesc;
pub use layout::dir_entry::DirEntry;
pub use layout::inode::Inode;
pub use layout::superblock::SuperBlock;
pub use traits::block_device::BlockDevice;
pub use traits::vfs::FileSystemOps;

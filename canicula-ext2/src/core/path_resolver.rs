use alloc::vec::Vec;

use log::debug;

use crate::error::{Ext2Error, Result};
use crate::fs_core::block_group_manager::BlockGroupManager;
use crate::fs_core::dir_reader::DirReader;
use crate::fs_core::inode_reader::InodeReader;
use crate::fs_core::superblock_manager::SuperBlockManager;
use crate::io::block_reader::BlockReader;
use crate::layout::dir_entry::EXT2_NAME_LEN;
use crate::layout::inode::{Inode, ROOT_INO};
use crate::traits::block_device::BlockDevice;

/// Progress of a path walk.
enum WalkState {
    /// Looking up `segments[index]` in `dir`.
    Scanning { dir: Inode, index: usize },
    /// Matched an intermediate component; `ino` must be a directory.
    Descended { ino: u32, next: usize },
    Resolved(u32),
    Failed(Ext2Error),
}

/// Path resolver: convert absolute paths into inode numbers.
pub struct PathResolver;

impl PathResolver {
    /// Resolve an absolute `path` on the volume mounted at `mount_path`.
    ///
    /// Intermediate components must be directories; the last component may
    /// be of any type. An empty remainder is the root inode, found without
    /// touching any directory.
    pub fn resolve<D: BlockDevice>(
        reader: &BlockReader<D>,
        super_block_manager: &SuperBlockManager,
        block_group_manager: &BlockGroupManager,
        mount_path: &str,
        path: &str,
    ) -> Result<u32> {
        let relative = Self::strip_mount_path(mount_path, path)?;
        let segments: Vec<&str> = relative.split('/').filter(|c| !c.is_empty()).collect();
        if segments.is_empty() {
            return Ok(ROOT_INO);
        }

        let root =
            InodeReader::read_root_inode(reader, super_block_manager, block_group_manager)?;
        let mut state = WalkState::Scanning { dir: root, index: 0 };

        loop {
            state = match state {
                WalkState::Scanning { dir, index } => {
                    let segment = segments[index];
                    if segment.len() > EXT2_NAME_LEN {
                        WalkState::Failed(Ext2Error::NameTooLong)
                    } else {
                        debug!("ext2: looking up {:?} in {}", segment, reader.identifier());
                        match DirReader::lookup(
                            reader,
                            super_block_manager,
                            &dir,
                            segment.as_bytes(),
                        ) {
                            Ok(ino) if index + 1 == segments.len() => WalkState::Resolved(ino),
                            Ok(ino) => WalkState::Descended {
                                ino,
                                next: index + 1,
                            },
                            Err(err) => WalkState::Failed(err),
                        }
                    }
                }
                WalkState::Descended { ino, next } => {
                    match InodeReader::read_inode(
                        reader,
                        super_block_manager,
                        block_group_manager,
                        ino,
                    ) {
                        Ok(inode) if inode.is_dir() => WalkState::Scanning {
                            dir: inode,
                            index: next,
                        },
                        Ok(_) => WalkState::Failed(Ext2Error::NotDirectory),
                        Err(err) => WalkState::Failed(err),
                    }
                }
                WalkState::Resolved(ino) => return Ok(ino),
                WalkState::Failed(err) => {
                    debug!("ext2: cannot resolve {}: {:?}", path, err);
                    return Err(err);
                }
            };
        }
    }

    /// The part of `path` below `mount_path`.
    ///
    /// The prefix must end on a component boundary: `/mnt` covers `/mnt/a`
    /// but not `/mntx/a`.
    pub fn strip_mount_path<'p>(mount_path: &str, path: &'p str) -> Result<&'p str> {
        let prefix = mount_path.trim_end_matches('/');
        let rest = path.strip_prefix(prefix).ok_or(Ext2Error::NotFound)?;
        if rest.is_empty() || rest.starts_with('/') {
            Ok(rest)
        } else {
            Err(Ext2Error::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_mount_path() {
        assert_eq!(PathResolver::strip_mount_path("/", "/"), Ok("/"));
        assert_eq!(PathResolver::strip_mount_path("/", "/a/b"), Ok("/a/b"));
        assert_eq!(PathResolver::strip_mount_path("/mnt", "/mnt"), Ok(""));
        assert_eq!(PathResolver::strip_mount_path("/mnt/", "/mnt/a"), Ok("/a"));
        assert_eq!(
            PathResolver::strip_mount_path("/mnt", "/mntx/a"),
            Err(Ext2Error::NotFound)
        );
        assert_eq!(
            PathResolver::strip_mount_path("/mnt", "/usr/a"),
            Err(Ext2Error::NotFound)
        );
    }
}

use canicula_common::fs::{FileType, Permissions, Stat};
use log::warn;

use crate::layout::inode::{
    EXT2_BLK, EXT2_CHR, EXT2_DIR, EXT2_EXECUTE_GROUP, EXT2_EXECUTE_OTHER, EXT2_EXECUTE_USER,
    EXT2_FIFO, EXT2_LNK, EXT2_READ_GROUP, EXT2_READ_OTHER, EXT2_READ_USER, EXT2_REG,
    EXT2_WRITE_GROUP, EXT2_WRITE_OTHER, EXT2_WRITE_USER, Inode,
};

const PERMISSION_MAP: [(u16, Permissions); 9] = [
    (EXT2_READ_USER, Permissions::S_IRUSR),
    (EXT2_WRITE_USER, Permissions::S_IWUSR),
    (EXT2_EXECUTE_USER, Permissions::S_IXUSR),
    (EXT2_READ_GROUP, Permissions::S_IRGRP),
    (EXT2_WRITE_GROUP, Permissions::S_IWGRP),
    (EXT2_EXECUTE_GROUP, Permissions::S_IXGRP),
    (EXT2_READ_OTHER, Permissions::S_IROTH),
    (EXT2_WRITE_OTHER, Permissions::S_IWOTH),
    (EXT2_EXECUTE_OTHER, Permissions::S_IXOTH),
];

/// Translates inode fields into the VFS `Stat` record.
pub struct StatMapper;

impl StatMapper {
    /// Build the status record of inode `ino`.
    ///
    /// `path` only appears in diagnostics.
    pub fn map(ino: u32, inode: &Inode, block_size: usize, path: &str) -> Stat {
        let size = inode.i_size as u64;
        let block_size = block_size as u64;

        Stat {
            st_ino: ino as u64,
            file_type: Self::file_type(inode, path),
            permissions: Self::permissions(inode.i_mode),
            st_nlink: inode.i_links_count as u32,
            st_uid: inode.i_uid as u32,
            st_gid: inode.i_gid as u32,
            st_size: size,
            st_blksize: block_size as u32,
            st_blocks: size.div_ceil(block_size),
            st_atime: inode.i_atime,
            st_mtime: inode.i_mtime,
            st_ctime: inode.i_ctime,
        }
    }

    /// File type from the mode's high nibble; unknown values read as regular.
    pub fn file_type(inode: &Inode, path: &str) -> FileType {
        match inode.type_nibble() {
            EXT2_FIFO => FileType::Fifo,
            EXT2_CHR => FileType::CharDevice,
            EXT2_DIR => FileType::Directory,
            EXT2_BLK => FileType::BlockDevice,
            EXT2_REG => FileType::RegularFile,
            EXT2_LNK => FileType::Symlink,
            _ => {
                warn!(
                    "ext2: {} undefined file mode {:#06x}, assuming regular",
                    path, inode.i_mode
                );
                FileType::RegularFile
            }
        }
    }

    pub fn permissions(mode: u16) -> Permissions {
        PERMISSION_MAP
            .iter()
            .filter(|(bit, _)| mode & bit != 0)
            .fold(Permissions::empty(), |acc, (_, perm)| acc | *perm)
    }
}

//! VFS vocabulary shared by the kernel's filesystem drivers.
//!
//! The mount table and the file descriptor table live in the VFS layer;
//! drivers only see the records defined here.

use alloc::string::String;

use bitflags::bitflags;

/// Errors surfaced to VFS callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperateError {
    InvalidFileDescriptor,
    IO,
    NotFound,
    NotDirectory,
    NameTooLong,
    Overflow,
}

impl OperateError {
    /// Kernel error code returned across the syscall boundary.
    pub fn errno(&self) -> i32 {
        match self {
            OperateError::IO => -2,
            OperateError::NameTooLong => -4,
            OperateError::NotFound => -5,
            OperateError::NotDirectory => -6,
            OperateError::Overflow => -7,
            OperateError::InvalidFileDescriptor => -10,
        }
    }
}

bitflags! {
    /// `open()` flags kept on a file handle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const O_RDONLY = 0x0001;
        const O_WRONLY = 0x0002;
        const O_RDWR = Self::O_RDONLY.bits() | Self::O_WRONLY.bits();
        const O_APPEND = 0x0004;
        const O_NOATIME = 0x0008;
        const O_CREAT = 0x0010;
        const O_EXCL = 0x0020;
    }
}

impl OpenFlags {
    pub fn is_readable(&self) -> bool {
        self.contains(Self::O_RDONLY)
    }
}

bitflags! {
    /// Mount flags recorded in the mount table.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MountFlags: u32 {
        const MS_RDONLY = 0x0004;
        const MS_NOSUID = 0x0008;
        const MS_NOEXEC = 0x0010;
        const MS_NODEV = 0x0020;
        const MS_SYNCHRONOUS = 0x0040;
        const MS_NOATIME = 0x0100;
        const MS_NODIRATIME = 0x0200;
    }
}

/// One entry of the mount table.
#[derive(Debug, Clone)]
pub struct Mountpoint {
    pub fstype: String,
    /// Absolute path the volume is mounted on, e.g. `/` or `/mnt/disk`.
    pub path: String,
    /// Block device identifier, e.g. `/dev/hda1`.
    pub device: String,
    pub flags: MountFlags,
}

impl Mountpoint {
    pub fn new(fstype: &str, path: &str, device: &str) -> Self {
        Self {
            fstype: fstype.into(),
            path: path.into(),
            device: device.into(),
            flags: MountFlags::MS_RDONLY,
        }
    }
}

/// One entry of the open file table.
///
/// `position` is owned by the VFS; a driver advances it only inside `read`.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub present: bool,
    /// Absolute path the file was opened with.
    pub path: String,
    pub position: u64,
    pub flags: OpenFlags,
}

impl FileHandle {
    pub fn open(path: &str, flags: OpenFlags) -> Self {
        Self {
            present: true,
            path: path.into(),
            position: 0,
            flags,
        }
    }
}

/// File type part of `st_mode`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Fifo = 0o010000,
    CharDevice = 0o020000,
    Directory = 0o040000,
    BlockDevice = 0o060000,
    RegularFile = 0o100000,
    Symlink = 0o120000,
}

bitflags! {
    /// Permission part of `st_mode`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u32 {
        /// read by owner
        const S_IRUSR = 0o0400;
        /// write by owner
        const S_IWUSR = 0o0200;
        /// execute/search by owner
        const S_IXUSR = 0o0100;
        /// read by group
        const S_IRGRP = 0o0040;
        /// write by group
        const S_IWGRP = 0o0020;
        /// execute/search by group
        const S_IXGRP = 0o0010;
        /// read by others
        const S_IROTH = 0o0004;
        /// write by others
        const S_IWOTH = 0o0002;
        /// execute/search by others
        const S_IXOTH = 0o0001;
    }
}

/// File status record returned by `stat`/`fstat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    /// Inode number
    pub st_ino: u64,
    pub file_type: FileType,
    pub permissions: Permissions,
    /// Number of hard links
    pub st_nlink: u32,
    pub st_uid: u32,
    pub st_gid: u32,
    /// Total size, in bytes
    pub st_size: u64,
    /// Block size for filesystem I/O
    pub st_blksize: u32,
    /// Number of `st_blksize` blocks covering `st_size`
    pub st_blocks: u64,
    pub st_atime: u32,
    pub st_mtime: u32,
    pub st_ctime: u32,
}

impl Stat {
    /// Combined `st_mode` (type bits | permission bits).
    pub fn st_mode(&self) -> u32 {
        self.file_type as u32 | self.permissions.bits()
    }
}

/// Filesystem-level statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatFs {
    pub block_size: u64,
    pub total_blocks: u64,
    pub free_blocks: u64,
    pub total_inodes: u64,
    pub free_inodes: u64,
}

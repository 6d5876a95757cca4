use alloc::vec::Vec;

use canicula_common::fs::{FileHandle, Mountpoint, Stat, StatFs};

use crate::error::Result;
use crate::layout::dir_entry::DirEntry;

/// Operations the VFS routing layer dispatches to a mounted driver.
///
/// The driver is read-only; every call re-reads the metadata it needs.
pub trait FileSystemOps {
    /// Status of the file or directory at absolute `path`.
    fn stat(&self, mountpoint: &Mountpoint, path: &str) -> Result<Stat>;

    /// Status of an open file.
    fn fstat(&self, mountpoint: &Mountpoint, file: &FileHandle) -> Result<Stat>;

    /// Read from `file` at its current position and advance it.
    fn read(&self, mountpoint: &Mountpoint, file: &mut FileHandle, buf: &mut [u8])
    -> Result<usize>;

    /// List the entries of the directory at absolute `path`.
    fn read_dir(&self, mountpoint: &Mountpoint, path: &str) -> Result<Vec<DirEntry>>;

    /// Return filesystem statistics (block/inode counts, sizes).
    fn stat_fs(&self, mountpoint: &Mountpoint) -> Result<StatFs>;
}

use canicula_common::fs::OperateError;

/// Unified error type for canicula-ext2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ext2Error {
    /// Device open/seek/read failure, or a read at/after end of file
    IoError,
    /// Path component absent from its directory
    NotFound,
    /// Intermediate path component is not a directory
    NotDirectory,
    /// On-disk construct this driver does not handle
    Unsupported(&'static str),
    /// Path component longer than `EXT2_NAME_LEN`
    NameTooLong,
    /// File handle not open, or not opened for reading
    BadFileHandle,
    /// Corrupted filesystem metadata
    CorruptedFs(&'static str),
}

/// Convenience Result type alias.
pub type Result<T> = ::core::result::Result<T, Ext2Error>;

impl From<Ext2Error> for OperateError {
    fn from(err: Ext2Error) -> Self {
        match err {
            Ext2Error::IoError | Ext2Error::CorruptedFs(_) => OperateError::IO,
            Ext2Error::NotFound => OperateError::NotFound,
            Ext2Error::NotDirectory => OperateError::NotDirectory,
            Ext2Error::Unsupported(_) => OperateError::Overflow,
            Ext2Error::NameTooLong => OperateError::NameTooLong,
            Ext2Error::BadFileHandle => OperateError::InvalidFileDescriptor,
        }
    }
}

use crate::error::Result;

/// Byte-addressed device access supplied by the kernel's device layer.
///
/// Every request opens the device by identifier, seeks, reads and closes it
/// again; the driver holds no handle across calls. Implementations may block
/// for an unbounded time and must serialize access themselves if shared.
pub trait BlockDevice {
    /// Open handle type. Carries the current byte position.
    type Handle;

    /// Open the device named `identifier` (e.g. `/dev/hda1`) for reading.
    fn open(&self, identifier: &str) -> Result<Self::Handle>;

    /// Move the handle to an absolute byte offset, returning the new offset.
    fn seek(&self, handle: &mut Self::Handle, byte_offset: u64) -> Result<u64>;

    /// Read up to `buf.len()` bytes at the handle's position.
    ///
    /// Returns the number of bytes read; a short count is not an error here.
    fn read(&self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<usize>;

    /// Release the handle.
    fn close(&self, handle: Self::Handle);
}

impl<T: BlockDevice + ?Sized> BlockDevice for &T {
    type Handle = T::Handle;

    fn open(&self, identifier: &str) -> Result<Self::Handle> {
        (**self).open(identifier)
    }

    fn seek(&self, handle: &mut Self::Handle, byte_offset: u64) -> Result<u64> {
        (**self).seek(handle, byte_offset)
    }

    fn read(&self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<usize> {
        (**self).read(handle, buf)
    }

    fn close(&self, handle: Self::Handle) {
        (**self).close(handle)
    }
}

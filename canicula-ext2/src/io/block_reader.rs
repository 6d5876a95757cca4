use alloc::vec::Vec;

use log::error;

use crate::error::{Ext2Error, Result};
use crate::traits::block_device::BlockDevice;

/// Block reader bound to one device identifier.
///
/// Translates byte ranges and block runs into `open`/`seek`/`read`/`close`
/// sequences on the [`BlockDevice`]. Every request is all-or-nothing: a
/// failed open or seek, or a short read, fails it with `IoError`.
pub struct BlockReader<'a, D: BlockDevice> {
    device: D,
    identifier: &'a str,
    block_size: usize,
}

impl<'a, D: BlockDevice> BlockReader<'a, D> {
    /// Create a reader for `identifier`. The block size is unknown until the
    /// super block has been read; see [`BlockReader::set_block_size`].
    pub fn new(device: D, identifier: &'a str) -> Self {
        Self {
            device,
            identifier,
            block_size: 1024,
        }
    }

    /// Adopt the volume's block size once the super block is known.
    pub fn set_block_size(&mut self, block_size: usize) {
        self.block_size = block_size;
    }

    /// Read exactly `buf.len()` bytes starting at `byte_offset`.
    pub fn read_bytes(&self, byte_offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut handle = self.device.open(self.identifier).inspect_err(|_| {
            error!("ext2: unable to open device {}", self.identifier);
        })?;

        let result = self.seek_and_read(&mut handle, byte_offset, buf);
        self.device.close(handle);

        result.inspect_err(|_| {
            error!(
                "ext2: failed to read {} bytes at offset {:#x} on device {}",
                buf.len(),
                byte_offset,
                self.identifier
            );
        })
    }

    /// Read a single block into `buf`.
    ///
    /// `buf.len()` must equal `self.block_size()`.
    pub fn read_block(&self, block_no: u32, buf: &mut [u8]) -> Result<()> {
        self.read_blocks(block_no, 1, buf)
    }

    /// Read `count` consecutive blocks starting at `start_block` into `buf`.
    ///
    /// `buf.len()` must equal `count * self.block_size()`.
    pub fn read_blocks(&self, start_block: u32, count: usize, buf: &mut [u8]) -> Result<()> {
        if buf.len() != count * self.block_size {
            return Err(Ext2Error::IoError);
        }
        let byte_offset = start_block as u64 * self.block_size as u64;
        self.read_bytes(byte_offset, buf).inspect_err(|_| {
            error!(
                "ext2: failed to read block {} on device {}",
                start_block, self.identifier
            );
        })
    }

    /// Zeroed buffer large enough for `count` blocks.
    ///
    /// Block counts come from disk; a buffer the heap cannot hold fails with
    /// `CorruptedFs` rather than aborting.
    pub fn block_buffer(&self, count: usize) -> Result<Vec<u8>> {
        let len = count
            .checked_mul(self.block_size)
            .ok_or(Ext2Error::CorruptedFs("block run too large"))?;

        let mut buf = Vec::new();
        buf.try_reserve_exact(len).map_err(|_| {
            error!(
                "ext2: cannot allocate {} blocks for device {}",
                count, self.identifier
            );
            Ext2Error::CorruptedFs("block run too large")
        })?;
        buf.resize(len, 0);
        Ok(buf)
    }

    /// Block size used to turn block numbers into byte offsets.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Device identifier this reader is bound to.
    pub fn identifier(&self) -> &str {
        self.identifier
    }

    fn seek_and_read(
        &self,
        handle: &mut D::Handle,
        byte_offset: u64,
        buf: &mut [u8],
    ) -> Result<()> {
        if self.device.seek(handle, byte_offset)? != byte_offset {
            return Err(Ext2Error::IoError);
        }
        if self.device.read(handle, buf)? != buf.len() {
            return Err(Ext2Error::IoError);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::MemoryDevice;

    #[test]
    fn test_read_bytes_at_offset() {
        let mut image = vec![0u8; 4096];
        image[1024..1028].copy_from_slice(&[1, 2, 3, 4]);
        let device = MemoryDevice::new("/dev/hda1", image);
        let reader = BlockReader::new(&device, "/dev/hda1");

        let mut buf = [0u8; 4];
        reader.read_bytes(1024, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(device.open_handles(), 0);
    }

    #[test]
    fn test_short_read_is_io_error() {
        let device = MemoryDevice::new("/dev/hda1", vec![0u8; 2048]);
        let reader = BlockReader::new(&device, "/dev/hda1");

        let mut buf = vec![0u8; 1024];
        assert_eq!(reader.read_block(2, &mut buf), Err(Ext2Error::IoError));
        // the handle is released even when the read fails
        assert_eq!(device.open_handles(), 0);
    }

    #[test]
    fn test_unknown_device_is_io_error() {
        let device = MemoryDevice::new("/dev/hda1", vec![0u8; 2048]);
        let reader = BlockReader::new(&device, "/dev/hdb1");

        let mut buf = vec![0u8; 1024];
        assert_eq!(reader.read_block(0, &mut buf), Err(Ext2Error::IoError));
    }

    #[test]
    fn test_block_buffer_sizes_and_limits() {
        let device = MemoryDevice::new("/dev/hda1", vec![0u8; 2048]);
        let mut reader = BlockReader::new(&device, "/dev/hda1");
        reader.set_block_size(2048);

        let buf = reader.block_buffer(3).unwrap();
        assert_eq!(buf.len(), 3 * 2048);
        assert!(buf.iter().all(|&b| b == 0));

        assert_eq!(
            reader.block_buffer(usize::MAX / 1024),
            Err(Ext2Error::CorruptedFs("block run too large"))
        );
        // fits a usize but not an allocation
        assert_eq!(
            reader.block_buffer(usize::MAX / 2048),
            Err(Ext2Error::CorruptedFs("block run too large"))
        );
    }

    #[test]
    fn test_read_blocks_uses_volume_block_size() {
        let mut image = vec![0u8; 8192];
        image[4096] = 0xAA;
        let device = MemoryDevice::new("/dev/hda1", image);
        let mut reader = BlockReader::new(&device, "/dev/hda1");
        reader.set_block_size(2048);

        let mut buf = vec![0u8; 4096];
        reader.read_blocks(2, 2, &mut buf).unwrap();
        assert_eq!(buf[0], 0xAA);
    }
}

pub mod block_device;
pub mod vfs;

pub mod block_group_manager;
pub mod block_map;
pub mod dir_reader;
pub mod file_reader;
pub mod inode_reader;
pub mod path_resolver;
pub mod stat_mapper;
pub mod superblock_manager;

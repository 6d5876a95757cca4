pub mod block_reader;

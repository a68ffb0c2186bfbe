pub mod block_map;
pub mod dashboard;
pub mod file_table;
pub mod footer;
pub mod help;
pub mod theme;

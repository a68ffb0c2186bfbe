pub mod fiemap;
pub mod filesystem;
pub mod walk;

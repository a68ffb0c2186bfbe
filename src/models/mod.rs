pub mod extent;
pub mod file_record;

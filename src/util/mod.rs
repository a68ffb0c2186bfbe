pub mod human;
pub mod log;
pub mod report;

pub mod miss_log;
pub mod summary;

pub mod config;
pub mod program;
pub mod records;

pub mod addr;
pub mod config;
pub mod error;

//! Configuration module
//!
//! Service address, search tuning, selection bound and logging filter,
//! read from a TOML file.

pub mod config;

pub use config::Config;

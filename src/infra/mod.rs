//! Infrastructure - configuration and run statistics
//!
//! This module contains infrastructure concerns:
//! - `config` - Application configuration (TOML loading, defaults, validation)
//! - `stats` - Run summary counts and delay histogram

pub mod config;
pub mod stats;

// Re-export commonly used types
pub use config::Config;
pub use stats::{LaneStats, RunStats};

//! nether-wld-cli library
//!
//! Command implementations behind the `nether-wld` binary, usable from tests
//! and other tools.

pub mod commands;
pub mod config;

pub use config::CliConfig;

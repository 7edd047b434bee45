//! CLI argument parsing and run configuration

pub mod cli_app;
pub mod config;

pub use cli_app::{init_logging, run, run_cli, Cli};
pub use config::{LogLevel, ScanConfig};

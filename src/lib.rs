//! selector-heal library
//!
//! Exposes config, snapshot IO and report rendering for the binary and for
//! integration testing

pub mod config;
pub mod errors;
pub mod report;
pub mod snapshot_io;

pub use config::{AppConfig, ConfigOverrides};
pub use errors::AppError;
pub use report::OutputFormat;

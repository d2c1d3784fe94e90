//! Data Platform Common Library
//!
//! Shared configuration, structured logging and error types for data
//! platform services.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

pub use config::{ConfigError, PlatformSettings, SettingsHolder};
pub use error::{ErrorKind, PlatformError, PlatformResult};

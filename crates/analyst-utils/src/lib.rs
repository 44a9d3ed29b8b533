//! Shared utilities for the fundamental analyst workspace
//!
//! This crate provides the logging setup used by every binary in the
//! workspace, together with the small configuration value that drives it.

pub mod config;
pub mod logging;

pub use config::{LogFormat, LoggingConfig};
pub use logging::init_tracing_with;

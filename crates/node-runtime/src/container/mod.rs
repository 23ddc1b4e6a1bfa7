//! # Node Container
//!
//! Configuration for everything the runtime constructs at startup.

pub mod config;

pub use config::{ConfigError, NodeConfig, RuntimeConfig};

//! Configuration Module
//!
//! Configuration loading for the feed gateway.

mod settings;

pub use settings::{ConfigError, GatewayConfig, ServerSettings, SimSettings};

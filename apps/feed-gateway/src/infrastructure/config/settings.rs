//! Gateway Configuration Settings
//!
//! Configuration types for the feed gateway, loaded from environment
//! variables.

use std::time::Duration;

use crate::application::ports::Credentials;
use crate::domain::instrument::Symbol;
use crate::infrastructure::channel::ChannelConfig;

/// Server port settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Health check HTTP port (also serves `/metrics`).
    pub health_port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { health_port: 8083 }
    }
}

/// Simulated feed settings.
#[derive(Debug, Clone)]
pub struct SimSettings {
    /// Delay between event-loop iterations.
    pub tick_interval: Duration,
    /// Base price for synthesized ticks.
    pub base_price: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            base_price: 100.0,
        }
    }
}

/// Complete gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Feed login credentials.
    pub credentials: Credentials,
    /// Configured instrument interest list.
    pub instruments: Vec<Symbol>,
    /// Server port settings.
    pub server: ServerSettings,
    /// Transmission channel capacities.
    pub channel: ChannelConfig,
    /// Simulated feed settings.
    pub sim: SimSettings,
}

impl GatewayConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required environment variable is missing or
    /// empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let broker_id = require_env("FEED_BROKER_ID")?;
        let user_id = require_env("FEED_USER_ID")?;
        let password = require_env("FEED_PASSWORD")?;

        let instruments = std::env::var("FEED_INSTRUMENTS")
            .map(|raw| parse_instruments(&raw))
            .unwrap_or_default();

        let server = ServerSettings {
            health_port: parse_env_u16(
                "FEED_GATEWAY_HEALTH_PORT",
                ServerSettings::default().health_port,
            ),
        };

        let channel = ChannelConfig {
            static_capacity: parse_env_usize(
                "FEED_GATEWAY_STATIC_CAPACITY",
                ChannelConfig::default().static_capacity,
            ),
            depth_capacity: parse_env_usize(
                "FEED_GATEWAY_DEPTH_CAPACITY",
                ChannelConfig::default().depth_capacity,
            ),
        };

        let sim = SimSettings {
            tick_interval: parse_env_duration_millis(
                "FEED_GATEWAY_TICK_INTERVAL_MS",
                SimSettings::default().tick_interval,
            ),
            base_price: parse_env_f64(
                "FEED_GATEWAY_SIM_BASE_PRICE",
                SimSettings::default().base_price,
            ),
        };

        Ok(Self {
            credentials: Credentials::new(broker_id, user_id, password),
            instruments,
            server,
            channel,
            sim,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    let value =
        std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
    if value.is_empty() {
        return Err(ConfigError::EmptyValue(key.to_string()));
    }
    Ok(value)
}

fn parse_instruments(raw: &str) -> Vec<Symbol> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instrument_list_parsing() {
        assert_eq!(
            parse_instruments("IF2509,cu2512"),
            vec!["IF2509".to_string(), "cu2512".to_string()]
        );
        assert_eq!(
            parse_instruments(" IF2509 , cu2512 ,"),
            vec!["IF2509".to_string(), "cu2512".to_string()]
        );
        assert!(parse_instruments("").is_empty());
        assert!(parse_instruments(" , ,").is_empty());
    }

    #[test]
    fn server_settings_defaults() {
        let settings = ServerSettings::default();
        assert_eq!(settings.health_port, 8083);
    }

    #[test]
    fn sim_settings_defaults() {
        let settings = SimSettings::default();
        assert_eq!(settings.tick_interval, Duration::from_millis(500));
        assert!((settings.base_price - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn channel_defaults() {
        let channel = ChannelConfig::default();
        assert_eq!(channel.static_capacity, 1_000);
        assert_eq!(channel.depth_capacity, 10_000);
    }
}

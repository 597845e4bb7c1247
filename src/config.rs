//! Service configuration, loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local runs.

use std::str::FromStr;
use std::time::Duration;

use crate::utils::RetryConfig;

/// Where orders are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Scylla,
    /// Process memory; for local experiments only.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scylla" | "scylladb" => Ok(Self::Scylla),
            "memory" | "in-memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub scylla_nodes: Vec<String>,
    pub scylla_keyspace: String,
    pub kafka_brokers: String,
    pub metrics_port: u16,
    /// Broker-level retry used inside the publisher.
    pub publish_retry: RetryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Scylla,
            scylla_nodes: vec!["127.0.0.1:9042".to_string()],
            scylla_keyspace: "orders_ks".to_string(),
            kafka_brokers: "127.0.0.1:9092".to_string(),
            metrics_port: 9090,
            publish_retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            tracing::debug!("Loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Missing keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let store_backend = match lookup("STORE_BACKEND") {
            Some(raw) => raw.parse().map_err(|_| invalid("STORE_BACKEND", &raw))?,
            None => defaults.store_backend,
        };

        let scylla_nodes = match lookup("SCYLLA_NODES") {
            Some(raw) => {
                let nodes: Vec<String> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect();
                if nodes.is_empty() {
                    return Err(ConfigError::EmptyValue("SCYLLA_NODES".to_string()));
                }
                nodes
            }
            None => defaults.scylla_nodes,
        };

        let scylla_keyspace =
            non_empty(&lookup, "SCYLLA_KEYSPACE")?.unwrap_or(defaults.scylla_keyspace);
        let kafka_brokers = non_empty(&lookup, "KAFKA_BROKERS")?.unwrap_or(defaults.kafka_brokers);
        let metrics_port = parsed(&lookup, "METRICS_PORT")?.unwrap_or(defaults.metrics_port);

        let max_attempts: u32 =
            parsed(&lookup, "PUBLISH_MAX_ATTEMPTS")?.unwrap_or(defaults.publish_retry.max_attempts);
        if max_attempts == 0 {
            return Err(invalid("PUBLISH_MAX_ATTEMPTS", "0"));
        }
        let initial_delay = parsed::<u64, _>(&lookup, "PUBLISH_RETRY_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.publish_retry.initial_delay);

        Ok(Self {
            store_backend,
            scylla_nodes,
            scylla_keyspace,
            kafka_brokers,
            metrics_port,
            publish_retry: RetryConfig {
                max_attempts,
                initial_delay,
                ..defaults.publish_retry
            },
        })
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if v.trim().is_empty() => Err(ConfigError::EmptyValue(key.to_string())),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

fn parsed<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| invalid(key, &raw)),
        None => Ok(None),
    }
}

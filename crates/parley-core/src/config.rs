use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{ParleyError, Result};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const MAX_PAYLOAD_BYTES: usize = 128 * 1024; // 128 KB cap per webhook body
pub const VIEWER_QUEUE_CAPACITY: usize = 256; // pending live records per viewer
pub const SEND_TIMEOUT_MS: u64 = 10_000; // a viewer send slower than this is dropped
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30; // ping cadence on idle viewers

/// Top-level config (parley.toml + PARLEY_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on a single webhook body.
    #[serde(default = "default_max_payload")]
    pub max_payload_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            max_payload_bytes: default_max_payload(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Keep only the most recent N records for replay. Unset = keep everything.
    #[serde(default)]
    pub history_limit: Option<usize>,
    /// Live records buffered per viewer before it is treated as stalled.
    #[serde(default = "default_queue_capacity")]
    pub viewer_queue_capacity: usize,
    #[serde(default = "default_send_timeout")]
    pub send_timeout_ms: u64,
    #[serde(default = "default_heartbeat")]
    pub heartbeat_interval_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            viewer_queue_capacity: default_queue_capacity(),
            send_timeout_ms: default_send_timeout(),
            heartbeat_interval_secs: default_heartbeat(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_max_payload() -> usize {
    MAX_PAYLOAD_BYTES
}
fn default_queue_capacity() -> usize {
    VIEWER_QUEUE_CAPACITY
}
fn default_send_timeout() -> u64 {
    SEND_TIMEOUT_MS
}
fn default_heartbeat() -> u64 {
    HEARTBEAT_INTERVAL_SECS
}

impl ParleyConfig {
    /// Load config from built-in defaults, a TOML file, then PARLEY_* env vars.
    ///
    /// Path resolution: explicit argument, else `~/.parley/parley.toml`.
    /// A missing file is not an error; the defaults apply.
    /// Nested keys use a double underscore: `PARLEY_RELAY__HISTORY_LIMIT=500`.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: ParleyConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("PARLEY_").split("__"))
            .extract()
            .map_err(|e| ParleyError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the relay cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.relay.viewer_queue_capacity == 0 {
            return Err(ParleyError::Config(
                "relay.viewer_queue_capacity must be at least 1".into(),
            ));
        }
        if self.relay.history_limit == Some(0) {
            return Err(ParleyError::Config(
                "relay.history_limit must be at least 1 (omit it for unbounded history)".into(),
            ));
        }
        if self.relay.heartbeat_interval_secs == 0 {
            return Err(ParleyError::Config(
                "relay.heartbeat_interval_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.parley/parley.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = ParleyConfig::default();
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
        assert_eq!(cfg.gateway.bind, DEFAULT_BIND);
        assert_eq!(cfg.relay.history_limit, None);
        assert_eq!(cfg.relay.viewer_queue_capacity, VIEWER_QUEUE_CAPACITY);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        figment::Jail::expect_with(|_jail| {
            let cfg = ParleyConfig::load(Some("does-not-exist.toml")).expect("load");
            assert_eq!(cfg.gateway.port, DEFAULT_PORT);
            assert_eq!(cfg.relay.send_timeout_ms, SEND_TIMEOUT_MS);
            Ok(())
        });
    }

    #[test]
    fn toml_then_env_override() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "parley.toml",
                r#"
                [gateway]
                port = 9001

                [relay]
                history_limit = 10
                "#,
            )?;
            jail.set_env("PARLEY_RELAY__HISTORY_LIMIT", "50");
            jail.set_env("PARLEY_GATEWAY__BIND", "0.0.0.0");

            let cfg = ParleyConfig::load(Some("parley.toml")).expect("load");
            assert_eq!(cfg.gateway.port, 9001);
            assert_eq!(cfg.gateway.bind, "0.0.0.0");
            assert_eq!(cfg.relay.history_limit, Some(50));
            Ok(())
        });
    }

    #[test]
    fn zero_queue_capacity_rejected() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("parley.toml", "[relay]\nviewer_queue_capacity = 0\n")?;
            let err = ParleyConfig::load(Some("parley.toml")).unwrap_err();
            assert_eq!(err.code(), "CONFIG_ERROR");
            Ok(())
        });
    }

    #[test]
    fn zero_history_limit_rejected() {
        let mut cfg = ParleyConfig::default();
        cfg.relay.history_limit = Some(0);
        assert!(cfg.validate().is_err());
    }
}

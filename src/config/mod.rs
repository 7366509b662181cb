use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::mqtt::messages::DEFAULT_NAME;

pub const HOST_ENV: &str = "MQTT_BROKER_HOST";
pub const PORT_ENV: &str = "MQTT_BROKER_PORT";
pub const CONFIG_DIR_ENV: &str = "HELLO_MQTT_CONFIG_DIR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HelloConfig {
    #[serde(default)]
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub greeting: GreetingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub client_id: Option<String>,
    pub keep_alive_secs: u64,
    pub connect_timeout_ms: u64,
    pub reconnect_delay_ms: u64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub qos: u8,
    pub retain: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreetingConfig {
    pub names: Vec<String>,
    pub interval_ms: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: None,
            keep_alive_secs: 60,
            connect_timeout_ms: 5000,
            reconnect_delay_ms: 1000,
            username: None,
            password: None,
            qos: 0,
            retain: false,
        }
    }
}

impl Default for GreetingConfig {
    fn default() -> Self {
        Self {
            names: vec![
                DEFAULT_NAME.to_string(),
                "MQTT".to_string(),
                "Template".to_string(),
            ],
            interval_ms: 1000,
        }
    }
}

impl MqttConfig {
    pub fn with_broker(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Returns the configured client id, or a fresh random one.
    pub fn client_id(&self) -> String {
        self.client_id
            .clone()
            .unwrap_or_else(|| format!("hello-mqtt-{}", uuid::Uuid::new_v4()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            anyhow::bail!("MQTT host cannot be empty");
        }

        if self.port == 0 {
            anyhow::bail!("MQTT port cannot be zero");
        }

        if self.qos > 2 {
            anyhow::bail!("Invalid QoS level: {}. Must be 0, 1, or 2", self.qos);
        }

        if self.keep_alive_secs < 5 {
            anyhow::bail!("Keep alive must be at least 5 seconds");
        }

        if self.connect_timeout_ms == 0 {
            anyhow::bail!("Connect timeout must be greater than zero");
        }

        if let Some(id) = &self.client_id {
            if id.is_empty() || id.starts_with(' ') {
                anyhow::bail!("Client ID cannot be empty or start with a space");
            }
        }

        Ok(())
    }
}

impl HelloConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: HelloConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when it exists, otherwise falls back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.mqtt.validate()?;

        if self.greeting.names.iter().any(|name| name.is_empty()) {
            anyhow::bail!("Greeting names cannot be empty");
        }

        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(std::env::var(HOST_ENV).ok(), std::env::var(PORT_ENV).ok())
    }

    fn apply_overrides(&mut self, host: Option<String>, port: Option<String>) -> Result<()> {
        if let Some(host) = host {
            self.mqtt.host = host;
        }

        if let Some(port) = port {
            self.mqtt.port = port
                .parse()
                .with_context(|| format!("Invalid {} value: {:?}", PORT_ENV, port))?;
        }

        Ok(())
    }

    pub fn get_config_path() -> PathBuf {
        if let Ok(config_dir) = std::env::var(CONFIG_DIR_ENV) {
            PathBuf::from(config_dir).join("hello-mqtt.toml")
        } else if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("hello-mqtt").join("hello-mqtt.toml")
        } else {
            PathBuf::from("hello-mqtt.toml")
        }
    }
}

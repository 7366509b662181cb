use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HelloError>;

#[derive(Debug, Error)]
pub enum HelloError {
    #[error("not connected to MQTT broker")]
    NotConnected,

    #[error("connection refused by broker, return code {0}")]
    Refused(u8),

    #[error("no answer from broker within {0:?}")]
    Timeout(Duration),

    #[error("failed to serialize greeting: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("MQTT request rejected: {0}")]
    Request(#[from] rumqttc::ClientError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

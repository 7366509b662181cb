use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "World";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreetingMessage {
    pub greeting: String,
    /// Seconds since the unix epoch.
    pub timestamp: f64,
}

impl GreetingMessage {
    pub fn new(name: &str) -> Self {
        Self::at(name, unix_timestamp())
    }

    pub fn at(name: &str, timestamp: f64) -> Self {
        Self {
            greeting: format!("Hello, {}!", name),
            timestamp,
        }
    }

    pub fn to_payload(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

pub fn unix_timestamp() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

pub mod config;
pub mod error;
pub mod mqtt;

pub use config::{HelloConfig, MqttConfig};
pub use error::HelloError;
pub use mqtt::{GreetingMessage, HelloMqttClient, GREETING_TOPIC};

pub mod client;
pub mod messages;
pub mod state;
pub mod topics;
pub mod transport;

pub use client::{run_event_loop, HelloMqttClient};
pub use messages::GreetingMessage;
pub use state::{ConnectionState, ConnectionStatus};
pub use topics::GREETING_TOPIC;
pub use transport::Transport;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use super::topics::describe_return_code;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
    /// The broker answered CONNECT with a non-zero return code.
    Refused(u8),
    /// The network failed before the broker answered.
    Failed(String),
}

/// Connection flag shared between the network task and the caller.
///
/// Only the callbacks ([`ConnectionState::on_connect`],
/// [`ConnectionState::on_disconnect`], [`ConnectionState::on_failure`]) change
/// it. Waiters are woken through a watch channel.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    status: Arc<watch::Sender<ConnectionStatus>>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionState {
    pub fn new() -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);
        Self {
            status: Arc::new(status),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        *self.status.borrow() == ConnectionStatus::Connected
    }

    pub fn on_connect(&self, return_code: u8) {
        if return_code == 0 {
            self.status.send_replace(ConnectionStatus::Connected);
            info!("Connected to MQTT broker");
        } else if self.is_connected() {
            warn!(
                "Ignoring return code {} on an established connection",
                return_code
            );
        } else {
            self.status.send_replace(ConnectionStatus::Refused(return_code));
            warn!(
                "Failed to connect, return code {} ({})",
                return_code,
                describe_return_code(return_code)
            );
        }
    }

    pub fn on_disconnect(&self) {
        let previous = self.status.send_replace(ConnectionStatus::Disconnected);
        if previous == ConnectionStatus::Connected {
            info!("Disconnected from MQTT broker");
        }
    }

    /// Records a network error seen while no session is established.
    pub fn on_failure(&self, reason: String) {
        self.status.send_if_modified(|status| {
            if *status == ConnectionStatus::Connected {
                return false;
            }
            *status = ConnectionStatus::Failed(reason);
            true
        });
    }

    pub(crate) fn reset(&self) {
        self.status.send_replace(ConnectionStatus::Disconnected);
    }

    /// Waits until the broker has answered one way or the other.
    ///
    /// Returns `None` if nothing arrived within `limit`.
    pub async fn wait_for_answer(&self, limit: Duration) -> Option<ConnectionStatus> {
        let mut receiver = self.status.subscribe();
        let answered = tokio::time::timeout(
            limit,
            receiver.wait_for(|status| *status != ConnectionStatus::Disconnected),
        )
        .await;

        match answered {
            Ok(Ok(status)) => Some(status.clone()),
            _ => None,
        }
    }
}

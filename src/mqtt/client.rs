use crate::config::MqttConfig;
use crate::error::{HelloError, Result};
use crate::mqtt::{messages::*, state::*, topics::*, transport::*};
use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Outgoing, Packet};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// How long `disconnect` lets the network loop flush DISCONNECT.
const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

/// Request queue capacity between the client handle and the network loop.
const REQUEST_CAPACITY: usize = 100;

#[derive(Debug)]
struct NetworkTask {
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl NetworkTask {
    async fn stop(mut self, grace: Duration) {
        if tokio::time::timeout(grace, &mut self.handle).await.is_err() {
            debug!("MQTT event loop still running after {:?}, cancelling", grace);
            self.shutdown.cancel();
            if let Err(e) = (&mut self.handle).await {
                warn!("MQTT event loop task failed: {}", e);
            }
        }
    }
}

impl Drop for NetworkTask {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Connects to a broker and publishes greetings on `hello/greeting`.
#[derive(Debug)]
pub struct HelloMqttClient<T = AsyncClient> {
    config: MqttConfig,
    transport: Option<T>,
    state: ConnectionState,
    network: Option<NetworkTask>,
}

impl Default for HelloMqttClient {
    fn default() -> Self {
        Self::new(MqttConfig::default())
    }
}

impl HelloMqttClient {
    pub fn new(config: MqttConfig) -> Self {
        Self {
            config,
            transport: None,
            state: ConnectionState::new(),
            network: None,
        }
    }

    pub fn with_broker(host: impl Into<String>, port: u16) -> Self {
        Self::new(MqttConfig::with_broker(host, port))
    }

    /// Connects and waits for the broker's answer. Returns `true` once connected.
    pub async fn connect(&mut self) -> bool {
        match self.try_connect().await {
            Ok(()) => true,
            Err(e) => {
                error!("Connection failed: {}", e);
                false
            }
        }
    }

    pub async fn try_connect(&mut self) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| HelloError::Config(e.to_string()))?;

        if self.transport.is_some() || self.network.is_some() {
            self.disconnect().await;
        }
        self.state.reset();

        let mut mqtt_options =
            MqttOptions::new(self.config.client_id(), &self.config.host, self.config.port);
        mqtt_options.set_keep_alive(self.config.keep_alive());

        if let Some(username) = &self.config.username {
            if let Some(password) = &self.config.password {
                mqtt_options.set_credentials(username, password);
            }
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, REQUEST_CAPACITY);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run_event_loop(
            event_loop,
            self.state.clone(),
            shutdown.clone(),
            self.config.reconnect_delay(),
        ));

        self.transport = Some(client);
        self.network = Some(NetworkTask { shutdown, handle });

        info!(
            "Connecting to MQTT broker at {}:{}",
            self.config.host, self.config.port
        );

        let limit = self.config.connect_timeout();
        let failure = match self.state.wait_for_answer(limit).await {
            Some(ConnectionStatus::Connected) => return Ok(()),
            Some(ConnectionStatus::Refused(code)) => HelloError::Refused(code),
            Some(ConnectionStatus::Failed(reason)) => HelloError::Transport(reason),
            _ => HelloError::Timeout(limit),
        };

        // Nobody is waiting on a failed session; stop the retries.
        self.transport = None;
        self.network = None;
        Err(failure)
    }
}

impl<T: Transport> HelloMqttClient<T> {
    /// Builds a client around an already established transport.
    ///
    /// The client starts disconnected; the owner of the transport reports the
    /// connection through [`HelloMqttClient::on_connect`].
    pub fn with_transport(config: MqttConfig, transport: T) -> Self {
        Self {
            config,
            transport: Some(transport),
            state: ConnectionState::new(),
            network: None,
        }
    }

    pub fn broker_host(&self) -> &str {
        &self.config.host
    }

    pub fn broker_port(&self) -> u16 {
        self.config.port
    }

    pub fn config(&self) -> &MqttConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.state.status()
    }

    pub fn connection_state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn on_connect(&self, return_code: u8) {
        self.state.on_connect(return_code);
    }

    pub fn on_disconnect(&self) {
        self.state.on_disconnect();
    }

    /// Publishes `Hello, <name>!`. Returns `false` when not connected or when
    /// the library rejects the message.
    ///
    /// Waits for room when the request queue is full, at most the connect
    /// timeout.
    pub async fn publish_hello(&self, name: &str) -> bool {
        match self.try_publish_hello(name).await {
            Ok(_) => true,
            Err(HelloError::NotConnected) => {
                debug!("Not connected, dropping greeting for {}", name);
                false
            }
            Err(e) => {
                error!("Publish failed: {}", e);
                false
            }
        }
    }

    pub async fn try_publish_hello(&self, name: &str) -> Result<GreetingMessage> {
        let transport = match &self.transport {
            Some(transport) if self.state.is_connected() => transport,
            _ => return Err(HelloError::NotConnected),
        };

        let message = GreetingMessage::new(name);
        let payload = message.to_payload()?;

        debug!("Publishing greeting to topic: {}", GREETING_TOPIC);
        let limit = self.config.connect_timeout();
        tokio::time::timeout(
            limit,
            transport.publish(
                GREETING_TOPIC,
                qos_level(self.config.qos),
                self.config.retain,
                payload,
            ),
        )
        .await
        .map_err(|_| HelloError::Timeout(limit))??;

        Ok(message)
    }

    pub async fn disconnect(&mut self) {
        if let Some(transport) = self.transport.take() {
            match tokio::time::timeout(DISCONNECT_GRACE, transport.disconnect()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Failed to send disconnect: {}", e),
                Err(_) => warn!("Request queue full, disconnect not sent"),
            }
        }

        if let Some(network) = self.network.take() {
            network.stop(DISCONNECT_GRACE).await;
        }

        self.state.on_disconnect();
    }
}

/// Drives the library's event loop and reports connection changes to `state`.
///
/// Runs until DISCONNECT has been sent or `shutdown` fires. Failed attempts
/// are retried after `reconnect_delay`; an error before the broker has
/// answered is reported through [`ConnectionState::on_failure`].
pub async fn run_event_loop(
    mut event_loop: EventLoop,
    state: ConnectionState,
    shutdown: CancellationToken,
    reconnect_delay: Duration,
) {
    debug!("Starting MQTT event loop");

    loop {
        let polled = tokio::select! {
            _ = shutdown.cancelled() => break,
            polled = event_loop.poll() => polled,
        };

        match polled {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                state.on_connect(return_code(ack.code));
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                state.on_disconnect();
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                state.on_disconnect();
                break;
            }
            Ok(event) => {
                debug!("MQTT event: {:?}", event);
            }
            Err(e) => {
                match e {
                    ConnectionError::ConnectionRefused(code) => {
                        state.on_connect(return_code(code));
                    }
                    e => {
                        warn!("MQTT connection error: {}", e);
                        if state.is_connected() {
                            state.on_disconnect();
                        } else {
                            state.on_failure(e.to_string());
                        }
                    }
                }

                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = tokio::time::sleep(reconnect_delay) => {}
                }
            }
        }
    }

    debug!("MQTT event loop stopped");
}

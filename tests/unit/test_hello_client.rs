use crate::common::{create_test_config, RecordingTransport};
use hello_mqtt::mqtt::{ConnectionStatus, GREETING_TOPIC};
use hello_mqtt::{GreetingMessage, HelloError, HelloMqttClient, MqttConfig};
use rumqttc::QoS;

fn connected_client(transport: RecordingTransport) -> HelloMqttClient<RecordingTransport> {
    let client = HelloMqttClient::with_transport(MqttConfig::default(), transport);
    client.on_connect(0);
    client
}

#[test]
fn test_init() {
    let client = HelloMqttClient::default();
    assert_eq!(client.broker_host(), "localhost");
    assert_eq!(client.broker_port(), 1883);
    assert!(client.transport().is_none());
    assert!(!client.is_connected());
}

#[test]
fn test_init_custom_params() {
    let client = HelloMqttClient::with_broker("test.broker.com", 8883);
    assert_eq!(client.broker_host(), "test.broker.com");
    assert_eq!(client.broker_port(), 8883);
}

#[tokio::test]
async fn test_publish_hello_not_connected() {
    let transport = RecordingTransport::default();
    let client = HelloMqttClient::with_transport(MqttConfig::default(), transport.clone());

    assert!(!client.publish_hello("World").await);
    assert!(transport.published().is_empty());
}

#[tokio::test]
async fn test_publish_hello_success() {
    let transport = RecordingTransport::default();
    let client = connected_client(transport.clone());

    assert!(client.publish_hello("Test").await);

    let published = transport.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].topic, "hello/greeting");
    assert_eq!(published[0].topic, GREETING_TOPIC);
    assert_eq!(published[0].qos, QoS::AtMostOnce);
    assert!(!published[0].retain);

    let message: serde_json::Value = serde_json::from_slice(&published[0].payload).unwrap();
    assert_eq!(message["greeting"], "Hello, Test!");
    assert!(message["timestamp"].is_f64());
}

#[tokio::test]
async fn test_try_publish_returns_sent_message() {
    let transport = RecordingTransport::default();
    let client = connected_client(transport.clone());

    let sent = client.try_publish_hello("Template").await.unwrap();
    let received: GreetingMessage =
        serde_json::from_slice(&transport.published()[0].payload).unwrap();
    assert_eq!(sent, received);
}

#[tokio::test]
async fn test_publish_uses_configured_qos_and_retain() {
    let transport = RecordingTransport::default();
    let config = MqttConfig {
        qos: 1,
        retain: true,
        ..MqttConfig::default()
    };
    let client = HelloMqttClient::with_transport(config, transport.clone());
    client.on_connect(0);

    assert!(client.publish_hello("MQTT").await);
    let published = transport.published();
    assert_eq!(published[0].qos, QoS::AtLeastOnce);
    assert!(published[0].retain);
}

#[tokio::test]
async fn test_publish_hello_failure() {
    let client = connected_client(RecordingTransport::rejecting());

    assert!(!client.publish_hello("World").await);
    assert!(matches!(
        client.try_publish_hello("World").await,
        Err(HelloError::Transport(_))
    ));
}

#[test]
fn test_on_connect_success() {
    let client = HelloMqttClient::default();
    client.on_connect(0);
    assert!(client.is_connected());
    assert_eq!(client.status(), ConnectionStatus::Connected);
}

#[test]
fn test_refusal_after_connect_keeps_flag() {
    let client = HelloMqttClient::default();
    client.on_connect(0);
    client.on_connect(3);
    assert!(client.is_connected());
}

#[test]
fn test_on_connect_failure() {
    let client = HelloMqttClient::default();
    for code in 1..=5 {
        client.on_connect(code);
        assert!(!client.is_connected());
        assert_eq!(client.status(), ConnectionStatus::Refused(code));
    }
}

#[test]
fn test_on_disconnect() {
    let client = HelloMqttClient::default();
    client.on_connect(0);
    client.on_disconnect();
    assert!(!client.is_connected());

    client.on_disconnect();
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_publish_after_disconnect_callback() {
    let transport = RecordingTransport::default();
    let client = connected_client(transport.clone());

    assert!(client.publish_hello("first").await);
    client.on_disconnect();
    assert!(!client.publish_hello("second").await);
    assert_eq!(transport.published().len(), 1);
}

#[tokio::test]
async fn test_disconnect() {
    let transport = RecordingTransport::default();
    let mut client = connected_client(transport.clone());

    client.disconnect().await;

    assert_eq!(transport.disconnect_count(), 1);
    assert!(!client.is_connected());
    assert!(client.transport().is_none());

    client.disconnect().await;
    assert_eq!(transport.disconnect_count(), 1);
}

#[test]
fn test_loopback_test_config() {
    let config = create_test_config(18830);
    assert!(config.validate().is_ok());
    assert_eq!(config.port, 18830);
}

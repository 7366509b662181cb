// Tests for configuration mistakes and error reporting

use hello_mqtt::mqtt::transport::qos_level;
use hello_mqtt::{HelloConfig, HelloError, HelloMqttClient, MqttConfig};
use rumqttc::QoS;
use std::time::Duration;

#[test]
fn test_qos_boundary_values() {
    assert_eq!(qos_level(0), QoS::AtMostOnce);
    assert_eq!(qos_level(1), QoS::AtLeastOnce);
    assert_eq!(qos_level(2), QoS::ExactlyOnce);

    let mut config = HelloConfig::default();
    for qos in 0..=2 {
        config.mqtt.qos = qos;
        assert!(config.validate().is_ok(), "QoS {} should be valid", qos);
    }
    for qos in [3, 4, 255] {
        config.mqtt.qos = qos;
        assert!(config.validate().is_err(), "QoS {} should be invalid", qos);
    }
}

#[test]
fn test_empty_greeting_name_rejected() {
    let mut config = HelloConfig::default();
    config.greeting.names.push(String::new());
    assert!(config.validate().is_err());
}

#[test]
fn test_timeout_error_message() {
    let error = HelloError::Timeout(Duration::from_secs(5));
    assert_eq!(error.to_string(), "no answer from broker within 5s");
}

#[test]
fn test_serialize_error_converts() {
    let bad: serde_json::Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: HelloError = bad.into();
    assert!(matches!(error, HelloError::Serialize(_)));
}

#[tokio::test]
async fn test_connect_with_empty_host_fails() {
    let mut client = HelloMqttClient::new(MqttConfig {
        host: String::new(),
        ..MqttConfig::default()
    });

    assert!(!client.connect().await);
    assert!(!client.is_connected());
    assert!(client.transport().is_none());
}

#[tokio::test]
async fn test_connect_with_empty_client_id_fails() {
    let mut client = HelloMqttClient::new(MqttConfig {
        client_id: Some(String::new()),
        ..MqttConfig::default()
    });

    let result = client.try_connect().await;
    assert!(matches!(result, Err(HelloError::Config(_))));
}

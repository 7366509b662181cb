use rumqttc::{AsyncClient, QoS};
use std::future::Future;

use crate::error::Result;

/// The library calls the client wrapper relies on once connected.
pub trait Transport {
    /// Queues a publish, waiting for room in the request queue. `Ok` means
    /// the library accepted it.
    fn publish(
        &self,
        topic: &str,
        qos: QoS,
        retain: bool,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn disconnect(&self) -> impl Future<Output = Result<()>> + Send;
}

impl Transport for AsyncClient {
    async fn publish(&self, topic: &str, qos: QoS, retain: bool, payload: Vec<u8>) -> Result<()> {
        AsyncClient::publish(self, topic, qos, retain, payload).await?;
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        AsyncClient::disconnect(self).await?;
        Ok(())
    }
}

pub fn qos_level(qos: u8) -> QoS {
    match qos {
        1 => QoS::AtLeastOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtMostOnce,
    }
}

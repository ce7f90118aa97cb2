/// Publisher Module
///
/// Durable, keyed publication of `OutboundRecord`s to the downstream message
/// log. `KafkaPublisher` wraps an `rdkafka` `FutureProducer` configured for
/// `acks=all` and a raised max message size, keyed by decimal block height so
/// repeated publication of the same slot lands on the same partition.
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::ClientConfig;

use crate::error::ChainError;
use crate::models::OutboundRecord;

const MAX_MESSAGE_BYTES: &str = "52428800"; // 50 MiB, matching the original producer's cap
const SEND_TIMEOUT: Duration = Duration::from_secs(60);

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, record: &OutboundRecord) -> Result<(), ChainError>;
}

pub struct KafkaPublisher {
    producer: FutureProducer,
    topic: String,
}

impl KafkaPublisher {
    pub fn new(brokers: &[String], topic: impl Into<String>) -> Result<Self, ChainError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers.join(","))
            .set("client.id", "solana-block-producer")
            .set("acks", "all")
            .set("message.max.bytes", MAX_MESSAGE_BYTES)
            .set("message.timeout.ms", SEND_TIMEOUT.as_millis().to_string())
            .set("retries", "5")
            .create()
            .map_err(|e| ChainError::ConfigurationFatal(format!("failed to create Kafka producer: {e}")))?;

        Ok(Self { producer, topic: topic.into() })
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&self, record: &OutboundRecord) -> Result<(), ChainError> {
        let key = record.block_height.to_string();
        let payload = serde_json::to_vec(record).map_err(|e| ChainError::Decode(e.to_string()))?;

        let delivery = self
            .producer
            .send(
                FutureRecord::to(&self.topic).key(&key).payload(&payload),
                Duration::from_secs(0),
            )
            .await;

        match delivery {
            Ok((partition, offset)) => {
                tracing::info!(block_height = record.block_height, partition, offset, "published block");
                Ok(())
            }
            Err((err, _)) => Err(ChainError::PublishFailure(err.to_string())),
        }
    }
}

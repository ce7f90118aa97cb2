/// Chain Client Module
///
/// Thin contract over the external JSON-RPC node: `latest_slot`,
/// `classify_slot`, `fetch_block`. Every call passes through a shared rate
/// limiter (one permit every `rate_limit` duration) before hitting the wire.
/// Slots classified EMPTY are cached so `fetch_block` never re-requests them.
#[cfg(test)]
pub mod fake;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashSet;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::ChainError;
use crate::models::{Block, Slot, SlotClassification};

const ERROR_CODE_BLOCK_NOT_AVAILABLE: i64 = -32004;
const MESSAGE_BLOCK_NOT_AVAILABLE: &str = "Block not available";

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn latest_slot(&self) -> Result<Slot, ChainError>;
    async fn classify_slot(&self, slot: Slot) -> Result<SlotClassification, ChainError>;
    async fn fetch_block(&self, slot: Slot) -> Result<Block, ChainError>;
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

/// Gate enforcing a single permit every `interval`, shared across all
/// operations on a `HttpChainClient`.
struct RateLimiter {
    interval: AsyncMutex<tokio::time::Interval>,
}

impl RateLimiter {
    fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        Self { interval: AsyncMutex::new(interval) }
    }

    async fn acquire(&self) {
        self.interval.lock().await.tick().await;
    }
}

pub struct HttpChainClient {
    http: reqwest::Client,
    rpc_url: String,
    rate_limiter: RateLimiter,
    known_empty: DashSet<Slot>,
}

impl HttpChainClient {
    pub fn new(rpc_url: impl Into<String>, rate_limit: Duration, request_timeout: Duration) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ChainError::ConfigurationFatal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, rpc_url: rpc_url.into(), rate_limiter: RateLimiter::new(rate_limit), known_empty: DashSet::new() })
    }

    async fn call<T: for<'de> Deserialize<'de>>(&self, method: &str, params: Value) -> Result<JsonRpcResponse<T>, ChainError> {
        self.rate_limiter.acquire().await;

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        response.json::<JsonRpcResponse<T>>().await.map_err(|e| ChainError::Decode(e.to_string()))
    }
}

fn is_block_not_available(err: &JsonRpcError) -> bool {
    err.code == ERROR_CODE_BLOCK_NOT_AVAILABLE || err.message.contains(MESSAGE_BLOCK_NOT_AVAILABLE)
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn latest_slot(&self) -> Result<Slot, ChainError> {
        let response: JsonRpcResponse<Slot> =
            self.call("getSlot", json!([{"commitment": "finalized"}])).await?;

        match (response.result, response.error) {
            (Some(slot), _) => Ok(slot),
            (None, Some(err)) => Err(ChainError::Decode(format!("getSlot error {}: {}", err.code, err.message))),
            (None, None) => Err(ChainError::Decode("getSlot returned neither result nor error".into())),
        }
    }

    async fn classify_slot(&self, slot: Slot) -> Result<SlotClassification, ChainError> {
        let params = json!([slot, {"transactionDetails": "none", "rewards": false}]);
        let response: JsonRpcResponse<Value> = self.call("getBlock", params).await?;

        if let Some(err) = &response.error {
            if is_block_not_available(err) {
                self.known_empty.insert(slot);
                return Ok(SlotClassification::Empty);
            }
            return Err(ChainError::Decode(format!("getBlock error {}: {}", err.code, err.message)));
        }

        Ok(SlotClassification::Confirmed)
    }

    async fn fetch_block(&self, slot: Slot) -> Result<Block, ChainError> {
        if self.known_empty.contains(&slot) {
            return Err(ChainError::EmptySlot);
        }

        let params = json!([
            slot,
            {"transactionDetails": "full", "rewards": false, "maxSupportedTransactionVersion": 0}
        ]);
        let response: JsonRpcResponse<Block> = self.call("getBlock", params).await?;

        match (response.result, response.error) {
            (Some(block), _) => Ok(block),
            (None, Some(err)) if is_block_not_available(&err) => {
                self.known_empty.insert(slot);
                Err(ChainError::EmptySlot)
            }
            (None, Some(err)) => Err(ChainError::Decode(format!("getBlock error {}: {}", err.code, err.message))),
            (None, None) => Err(ChainError::Decode("getBlock returned neither result nor error".into())),
        }
    }
}

pub type SharedChainClient = Arc<dyn ChainClient>;

/// Data Models Module
///
/// Raw wire types decoded from the chain node's JSON-RPC responses, and the
/// compact outbound records this crate publishes downstream.
use serde::{Deserialize, Serialize};

/// A slot is a monotonic 64-bit ordinal assigned by the upstream chain.
pub type Slot = u64;

/// Classification of a slot, as returned by the chain client's `classify_slot`.
///
/// `NotAvailable` is never produced by the current chain client (it only ever
/// returns `Empty` or `Confirmed`, surfacing transport/decode trouble as an
/// `Err` instead) but is kept here because the Slot Processor's handling of
/// it — defer, don't drop — is part of this crate's contract with any future
/// classifier that distinguishes the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotClassification {
    Empty,
    NotAvailable,
    Confirmed,
}

/// Status recorded for a slot in the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    NotAvailable,
    Confirmed,
}

/// Tracking entry for a non-terminal or terminal slot.
#[derive(Debug, Clone)]
pub struct SlotRecord {
    pub slot: Slot,
    pub status: SlotState,
    pub check_time: std::time::SystemTime,
    pub retry_count: u32,
}

// ---------------------------------------------------------------------------
// Raw chain-node wire types (as decoded straight from `getBlock` JSON)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RawAccountKey {
    pub pubkey: String,
}

/// Account keys can appear either as bare strings or `{"pubkey": "..."}`
/// objects depending on RPC encoding; accept either.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAccountEntry {
    Key(String),
    Labeled(RawAccountKey),
}

impl RawAccountEntry {
    pub fn pubkey(&self) -> &str {
        match self {
            RawAccountEntry::Key(s) => s,
            RawAccountEntry::Labeled(k) => &k.pubkey,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInstruction {
    pub accounts: Vec<u64>,
    pub data: String,
    #[serde(rename = "programIdIndex")]
    pub program_id_index: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    #[serde(rename = "accountKeys")]
    pub account_keys: Vec<RawAccountEntry>,
    pub instructions: Vec<RawInstruction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTransactionBody {
    pub message: RawMessage,
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTokenBalance {
    #[serde(rename = "accountIndex")]
    pub account_index: u64,
    pub mint: String,
    pub owner: Option<String>,
    #[serde(rename = "programId")]
    pub program_id: Option<String>,
    #[serde(rename = "uiTokenAmount")]
    pub ui_token_amount: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMeta {
    pub err: Option<serde_json::Value>,
    pub fee: u64,
    #[serde(rename = "preBalances")]
    pub pre_balances: Vec<u64>,
    #[serde(rename = "postBalances")]
    pub post_balances: Vec<u64>,
    #[serde(rename = "postTokenBalances", default)]
    pub post_token_balances: Vec<RawTokenBalance>,
    #[serde(rename = "logMessages", default)]
    pub log_messages: Vec<String>,
    #[serde(rename = "computeUnitsConsumed", default)]
    pub compute_units_consumed: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub meta: RawMeta,
    pub transaction: RawTransactionBody,
}

/// Raw payload as received from the chain source's `getBlock` call.
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    #[serde(rename = "blockHeight")]
    pub block_height: u64,
    #[serde(rename = "blockTime")]
    pub block_time: Option<i64>,
    pub blockhash: String,
    #[serde(rename = "parentSlot")]
    pub parent_slot: u64,
    #[serde(rename = "previousBlockhash")]
    pub previous_blockhash: String,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

// ---------------------------------------------------------------------------
// Outbound projection types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub program_id: String,
    pub data: String,
    pub accounts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceChange {
    pub account: String,
    pub pre_balance: u64,
    pub post_balance: u64,
    pub change: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionProjection {
    pub signature: String,
    pub status: String,
    pub fee: u64,
    pub account_keys: Vec<String>,
    pub instructions: Vec<Instruction>,
    pub balance_changes: Vec<BalanceChange>,
    pub token_balances: Vec<serde_json::Value>,
    pub compute_units: u64,
    pub log_messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundRecord {
    pub block_height: u64,
    pub block_time: Option<i64>,
    pub blockhash: String,
    pub parent_slot: u64,
    pub previous_blockhash: String,
    pub transactions: Vec<TransactionProjection>,
    pub timestamp: u64,
}

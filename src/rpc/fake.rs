/// Fakes for the Chain Client contract, used by unit and scenario tests
/// throughout the crate.
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::ChainClient;
use crate::error::ChainError;
use crate::models::{Block, Slot, SlotClassification};

#[derive(Clone)]
pub enum ClassifyOutcome {
    Ok(SlotClassification),
    Err,
}

#[derive(Clone)]
pub enum FetchOutcome {
    Ok(Block),
    Err,
}

/// A scripted Chain Client: `latest_slot` replies from a fixed queue (the
/// last entry repeats once exhausted), `classify_slot`/`fetch_block` reply
/// from a per-slot queue of scripted outcomes, consumed in order.
pub struct FakeChainClient {
    latest_slots: Mutex<VecDeque<Slot>>,
    classify_scripts: Mutex<HashMap<Slot, VecDeque<ClassifyOutcome>>>,
    fetch_scripts: Mutex<HashMap<Slot, VecDeque<FetchOutcome>>>,
    pub fetch_calls: Mutex<HashMap<Slot, u32>>,
}

impl FakeChainClient {
    pub fn new(latest_slots: Vec<Slot>) -> Self {
        Self {
            latest_slots: Mutex::new(latest_slots.into()),
            classify_scripts: Mutex::new(HashMap::new()),
            fetch_scripts: Mutex::new(HashMap::new()),
            fetch_calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn script_classify(&self, slot: Slot, outcomes: Vec<ClassifyOutcome>) {
        self.classify_scripts.lock().unwrap().insert(slot, outcomes.into());
    }

    pub fn script_fetch(&self, slot: Slot, outcomes: Vec<FetchOutcome>) {
        self.fetch_scripts.lock().unwrap().insert(slot, outcomes.into());
    }

    pub fn fetch_call_count(&self, slot: Slot) -> u32 {
        *self.fetch_calls.lock().unwrap().get(&slot).unwrap_or(&0)
    }
}

#[async_trait]
impl ChainClient for FakeChainClient {
    async fn latest_slot(&self) -> Result<Slot, ChainError> {
        let mut queue = self.latest_slots.lock().unwrap();
        if queue.len() > 1 {
            Ok(queue.pop_front().unwrap())
        } else {
            Ok(*queue.front().ok_or_else(|| ChainError::Transport("no scripted latest_slot".into()))?)
        }
    }

    async fn classify_slot(&self, slot: Slot) -> Result<SlotClassification, ChainError> {
        let mut scripts = self.classify_scripts.lock().unwrap();
        let queue = scripts.entry(slot).or_default();
        match queue.pop_front() {
            Some(ClassifyOutcome::Ok(c)) => Ok(c),
            Some(ClassifyOutcome::Err) => Err(ChainError::Transport(format!("scripted failure classifying {slot}"))),
            None => Ok(SlotClassification::Confirmed),
        }
    }

    async fn fetch_block(&self, slot: Slot) -> Result<Block, ChainError> {
        *self.fetch_calls.lock().unwrap().entry(slot).or_insert(0) += 1;

        let mut scripts = self.fetch_scripts.lock().unwrap();
        let queue = scripts.entry(slot).or_default();
        match queue.pop_front() {
            Some(FetchOutcome::Ok(block)) => Ok(block),
            Some(FetchOutcome::Err) => Err(ChainError::Transport(format!("scripted failure fetching {slot}"))),
            None => Err(ChainError::Transport(format!("no scripted fetch_block outcome left for {slot}"))),
        }
    }
}

/// Build a minimal confirmed block with no transactions, for scenarios that
/// only care about slot bookkeeping.
pub fn empty_block(block_height: u64, parent_slot: u64) -> Block {
    serde_json::from_value(serde_json::json!({
        "blockHeight": block_height,
        "blockTime": null,
        "blockhash": format!("hash{block_height}"),
        "parentSlot": parent_slot,
        "previousBlockhash": format!("hash{parent_slot}"),
        "transactions": [],
    }))
    .expect("well-formed fixture")
}

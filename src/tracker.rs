/// Slot Tracker Module
///
/// Owns the three disjoint slot sets — processed, pending, empty — and
/// mediates every transition between them under a single exclusive lock.
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::SystemTime;

use crate::models::{Slot, SlotRecord, SlotState};

struct TrackerInner {
    processed: HashMap<Slot, SlotRecord>,
    pending: HashMap<Slot, SlotRecord>,
    empty: HashMap<Slot, SlotRecord>,
}

pub struct SlotTracker {
    inner: RwLock<TrackerInner>,
    max_retries: u32,
}

impl SlotTracker {
    pub fn new(max_retries: u32) -> Self {
        Self {
            inner: RwLock::new(TrackerInner {
                processed: HashMap::new(),
                pending: HashMap::new(),
                empty: HashMap::new(),
            }),
            max_retries,
        }
    }

    pub fn is_processed(&self, slot: Slot) -> bool {
        self.inner.read().unwrap().processed.contains_key(&slot)
    }

    /// Insert or replace an EMPTY record for `slot`, removing it from
    /// *pending* first if present (pending→empty must be atomic).
    pub fn mark_empty(&self, slot: Slot) {
        let mut inner = self.inner.write().unwrap();
        inner.pending.remove(&slot);
        inner.empty.insert(slot, SlotRecord { slot, status: SlotState::Empty, check_time: SystemTime::now(), retry_count: 0 });
    }

    /// Observe a non-terminal classification for `slot`. A no-op if the slot
    /// is already terminal (*empty* or *processed* — terminal states are
    /// sticky). Otherwise increments `retry_count`, or inserts a fresh
    /// pending record on first observation. Retry exhaustion promotes the
    /// slot to *empty*.
    pub fn observe_pending(&self, slot: Slot, status: SlotState) {
        let mut inner = self.inner.write().unwrap();

        if inner.empty.contains_key(&slot) || inner.processed.contains_key(&slot) {
            return;
        }

        if let Some(existing) = inner.pending.get_mut(&slot) {
            existing.retry_count += 1;
            existing.check_time = SystemTime::now();

            if existing.retry_count >= self.max_retries {
                inner.pending.remove(&slot);
                inner.empty.insert(
                    slot,
                    SlotRecord { slot, status: SlotState::Empty, check_time: SystemTime::now(), retry_count: 0 },
                );
            }
        } else {
            inner.pending.insert(slot, SlotRecord { slot, status, check_time: SystemTime::now(), retry_count: 1 });
        }
    }

    /// Remove `slot` from *pending* (if present) and insert it into
    /// *processed*, terminal.
    pub fn mark_processed(&self, slot: Slot) {
        let mut inner = self.inner.write().unwrap();
        inner.pending.remove(&slot);
        inner.processed.insert(
            slot,
            SlotRecord { slot, status: SlotState::Confirmed, check_time: SystemTime::now(), retry_count: 0 },
        );
    }

    /// Snapshot of pending slot keys, taken under a shared lock released
    /// before the caller does any work with them.
    pub fn list_pending(&self) -> Vec<Slot> {
        self.inner.read().unwrap().pending.keys().copied().collect()
    }

    pub fn len_empty(&self) -> usize {
        self.inner.read().unwrap().empty.len()
    }

    pub fn len_pending(&self) -> usize {
        self.inner.read().unwrap().pending.len()
    }

    pub fn len_processed(&self) -> usize {
        self.inner.read().unwrap().processed.len()
    }

    #[cfg(test)]
    fn contains_pending(&self, slot: Slot) -> bool {
        self.inner.read().unwrap().pending.contains_key(&slot)
    }

    #[cfg(test)]
    fn contains_empty(&self, slot: Slot) -> bool {
        self.inner.read().unwrap().empty.contains_key(&slot)
    }
}

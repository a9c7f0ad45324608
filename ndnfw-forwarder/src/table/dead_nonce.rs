//! Dead-Nonce list: a bounded-retention record of consumed nonces, consulted
//! after PIT entries have already been finalized so a same-path duplicate
//! Interest can still be recognized as a loop, matching NFD's DeadNonceList.

use ndnfw_common::ndn::Name;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct DeadNonceList {
    entries: HashMap<(Name, u32), Instant>,
    retention: Duration,
}

impl DeadNonceList {
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            retention,
        }
    }

    /// O(1) expected membership test; lazily evicts anything past its
    /// retention window before answering.
    pub fn has(&mut self, name: &Name, nonce: u32) -> bool {
        self.evict_expired();
        self.entries.contains_key(&(name.clone(), nonce))
    }

    pub fn add(&mut self, name: Name, nonce: u32) {
        self.entries.insert((name, nonce), Instant::now());
    }

    fn evict_expired(&mut self) {
        let retention = self.retention;
        self.entries
            .retain(|_, inserted_at| inserted_at.elapsed() <= retention);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

//! Content Store: a local Data cache keyed by name.
//!
//! `find` is permitted to complete synchronously; since the reactor is
//! single-threaded and cooperative there is no benefit to modelling this as
//! a real `Future` here, so `find` takes two continuations and always calls
//! exactly one before returning. A bounded FIFO is the collaborator stub
//! the core needs to exercise the pipelines; a richer eviction policy isn't
//! modeled.

use ndnfw_common::ndn::{Data, Interest, Name};
use std::collections::{HashMap, VecDeque};

pub struct ContentStore {
    entries: HashMap<Name, Data>,
    insertion_order: VecDeque<Name>,
    capacity: usize,
}

impl ContentStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            capacity,
        }
    }

    /// Synchronous insert; transport tags are expected to already be
    /// stripped by the caller (`Data::stripped_for_cs`).
    pub fn insert(&mut self, data: Data) {
        let name = data.name.clone();
        if !self.entries.contains_key(&name) {
            self.insertion_order.push_back(name.clone());
        }
        self.entries.insert(name, data);

        while self.entries.len() > self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }

    /// Looks up `interest` and invokes exactly one continuation. Honors
    /// `can_be_prefix` (a prefix match against any cached name) and
    /// `must_be_fresh` (skip stale entries).
    pub fn find(&self, interest: &Interest, on_hit: impl FnOnce(Data), on_miss: impl FnOnce()) {
        match self.lookup(interest) {
            Some(data) => on_hit(data),
            None => on_miss(),
        }
    }

    fn lookup(&self, interest: &Interest) -> Option<Data> {
        if interest.can_be_prefix {
            self.entries
                .values()
                .filter(|d| interest.name.is_prefix_of(&d.name))
                .filter(|d| !interest.must_be_fresh || d.is_fresh())
                .cloned()
                .next()
        } else {
            self.entries.get(&interest.name).and_then(|d| {
                if !interest.must_be_fresh || d.is_fresh() {
                    Some(d.clone())
                } else {
                    None
                }
            })
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn exact_hit_and_miss() {
        let mut cs = ContentStore::new(8);
        cs.insert(Data::new(Name::from_string("/a/1"), Bytes::from_static(b"x")));

        let interest = Interest::new(Name::from_string("/a/1"));
        let mut hit = false;
        cs.find(&interest, |_| hit = true, || {});
        assert!(hit);

        let miss_interest = Interest::new(Name::from_string("/a/2"));
        let mut missed = false;
        cs.find(&miss_interest, |_| {}, || missed = true);
        assert!(missed);
    }

    #[test]
    fn fifo_eviction_at_capacity() {
        let mut cs = ContentStore::new(1);
        cs.insert(Data::new(Name::from_string("/a/1"), Bytes::from_static(b"x")));
        cs.insert(Data::new(Name::from_string("/a/2"), Bytes::from_static(b"y")));
        assert_eq!(cs.len(), 1);
        let mut missed = false;
        cs.find(
            &Interest::new(Name::from_string("/a/1")),
            |_| {},
            || missed = true,
        );
        assert!(missed);
    }
}

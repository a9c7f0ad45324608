//! Pending Interest Table: per-name aggregation and nonce tracking for the
//! classical and bridge planes.
//!
//! A PIT entry exists if and only if it has at least one `InRecord`,
//! matching NFD's own PIT invariant. `Pit::insert` therefore returns an
//! entry that is *not yet*
//! linked into the table; only `Pit::link` -- called once the first
//! `InRecord` is added on a Content-Store miss -- makes it visible to
//! `find_all_data_matches` and future `insert` calls. A Content-Store hit
//! never links its entry, so it is simply dropped when the pipeline's local
//! `Rc` goes out of scope, with no explicit cleanup required.

use ndnfw_common::ndn::{Data, FaceId, Name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateNonceWhere {
    None,
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone)]
pub struct InRecord {
    pub face: FaceId,
    pub nonce: u32,
    pub expiry: Instant,
}

#[derive(Debug, Clone)]
pub struct OutRecord {
    pub face: FaceId,
    pub nonce: u32,
    pub expiry: Instant,
}

pub struct PitEntry {
    pub name: Name,
    pub in_records: Vec<InRecord>,
    pub out_records: Vec<OutRecord>,
    pub unsatisfy_timer: Option<JoinHandle<()>>,
    pub straggler_timer: Option<JoinHandle<()>>,
}

impl PitEntry {
    fn new(name: Name) -> Self {
        Self {
            name,
            in_records: Vec::new(),
            out_records: Vec::new(),
            unsatisfy_timer: None,
            straggler_timer: None,
        }
    }

    pub fn has_in_records(&self) -> bool {
        !self.in_records.is_empty()
    }

    pub fn insert_in_record(&mut self, face: FaceId, nonce: u32, expiry: Instant) {
        if let Some(r) = self.in_records.iter_mut().find(|r| r.face == face) {
            r.nonce = nonce;
            r.expiry = expiry;
        } else {
            self.in_records.push(InRecord {
                face,
                nonce,
                expiry,
            });
        }
    }

    pub fn insert_out_record(&mut self, face: FaceId, nonce: u32, expiry: Instant) {
        if let Some(r) = self.out_records.iter_mut().find(|r| r.face == face) {
            r.nonce = nonce;
            r.expiry = expiry;
        } else {
            self.out_records.push(OutRecord {
                face,
                nonce,
                expiry,
            });
        }
    }

    /// Whether `face` has an `OutRecord` whose expiry has not yet passed --
    /// the "OutRecord is fresh" predicate BestRoute2 uses for suppression.
    pub fn has_fresh_out_record(&self, face: FaceId, now: Instant) -> bool {
        self.out_records
            .iter()
            .any(|r| r.face == face && r.expiry > now)
    }

    /// Latest expiry across all current InRecords -- where the Unsatisfy
    /// timer should be (re)armed.
    pub fn latest_in_record_expiry(&self) -> Option<Instant> {
        self.in_records.iter().map(|r| r.expiry).max()
    }

    /// Searches in- and out-records for `nonce` arriving from a face other
    /// than `from_face`, NFD's interest-loop detection step.
    pub fn find_nonce(&self, nonce: u32, from_face: FaceId) -> DuplicateNonceWhere {
        if self
            .in_records
            .iter()
            .any(|r| r.nonce == nonce && r.face != from_face)
        {
            return DuplicateNonceWhere::Incoming;
        }
        if self
            .out_records
            .iter()
            .any(|r| r.nonce == nonce && r.face != from_face)
        {
            return DuplicateNonceWhere::Outgoing;
        }
        DuplicateNonceWhere::None
    }

    pub fn cancel_timers(&mut self) {
        if let Some(h) = self.unsatisfy_timer.take() {
            h.abort();
        }
        if let Some(h) = self.straggler_timer.take() {
            h.abort();
        }
    }
}

#[derive(Default)]
pub struct Pit {
    table: RefCell<HashMap<Name, Rc<RefCell<PitEntry>>>>,
}

impl Pit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the linked entry for `name` if one exists, or a fresh
    /// *unlinked* entry otherwise, plus whether it is new. Callers must call
    /// `link` once they add the first InRecord; entries that never gain an
    /// InRecord (the Content-Store-hit path) are simply dropped.
    pub fn insert(&self, name: &Name) -> (Rc<RefCell<PitEntry>>, bool) {
        if let Some(existing) = self.table.borrow().get(name) {
            return (existing.clone(), false);
        }
        (Rc::new(RefCell::new(PitEntry::new(name.clone()))), true)
    }

    /// Idempotent: makes `entry` visible to future lookups under its name.
    pub fn link(&self, entry: &Rc<RefCell<PitEntry>>) {
        let name = entry.borrow().name.clone();
        self.table.borrow_mut().insert(name, entry.clone());
    }

    pub fn find_all_data_matches(&self, data: &Data) -> Vec<Rc<RefCell<PitEntry>>> {
        self.table
            .borrow()
            .values()
            .filter(|e| e.borrow().name == data.name)
            .cloned()
            .collect()
    }

    pub fn erase(&self, name: &Name) {
        self.table.borrow_mut().remove(name);
    }

    pub fn len(&self) -> usize {
        self.table.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn unlinked_entry_never_surfaces_as_a_data_match() {
        let pit = Pit::new();
        let name = Name::from_string("/a/1");
        let (_entry, is_new) = pit.insert(&name);
        assert!(is_new);
        assert!(pit.is_empty());

        let data = Data::new(name, bytes::Bytes::from_static(b"x"));
        assert!(pit.find_all_data_matches(&data).is_empty());
    }

    #[test]
    fn linking_makes_entry_visible_and_is_idempotent() {
        let pit = Pit::new();
        let name = Name::from_string("/a/1");
        let (entry, _) = pit.insert(&name);
        entry
            .borrow_mut()
            .insert_in_record(FaceId(1), 0xDEAD, Instant::now() + Duration::from_secs(4));
        pit.link(&entry);
        pit.link(&entry);
        assert_eq!(pit.len(), 1);

        let data = Data::new(name, bytes::Bytes::from_static(b"x"));
        assert_eq!(pit.find_all_data_matches(&data).len(), 1);
    }

    #[test]
    fn duplicate_nonce_from_other_face_is_detected() {
        let mut entry = PitEntry::new(Name::from_string("/a/1"));
        entry.insert_in_record(FaceId(1), 0xDEAD, Instant::now() + Duration::from_secs(4));

        assert_eq!(
            entry.find_nonce(0xDEAD, FaceId(1)),
            DuplicateNonceWhere::None
        );
        assert_eq!(
            entry.find_nonce(0xDEAD, FaceId(2)),
            DuplicateNonceWhere::Incoming
        );
    }
}

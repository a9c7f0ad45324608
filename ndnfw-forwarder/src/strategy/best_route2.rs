//! Classical default strategy, mirroring NFD's `best-route2` strategy.

use super::Strategy;
use crate::forwarder::Forwarder;
use crate::table::fib::FibEntry;
use crate::table::pit::PitEntry;
use log::{debug, trace};
use ndnfw_common::ndn::{FaceId, Interest, Name};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Among FIB next-hops whose face differs from the ingress face and whose
/// PIT `OutRecord` is not still fresh, picks the lowest-cost candidate. A
/// fresh `OutRecord` means this prefix was already forwarded recently on
/// that face, so skipping it suppresses redundant retransmission the way
/// NFD's `best-route2` does -- no separate retransmission-suppression
/// table is needed since the fib_entry loop already provides it.
#[derive(Debug, Default)]
pub struct BestRoute2;

impl BestRoute2 {
    pub fn strategy_name() -> Name {
        Name::from_string("/localhost/nfd/strategy/best-route2/%FD%01")
    }
}

impl Strategy for BestRoute2 {
    fn after_receive_interest(
        &self,
        forwarder: &Forwarder,
        in_face: FaceId,
        interest: &Interest,
        fib_entry: &FibEntry,
        pit_entry: &Rc<RefCell<PitEntry>>,
    ) {
        let now = Instant::now();
        let candidate = fib_entry
            .next_hops
            .iter()
            .filter(|hop| hop.face != in_face)
            .filter(|hop| forwarder.faces().contains(hop.face))
            .filter(|hop| !pit_entry.borrow().has_fresh_out_record(hop.face, now))
            .min_by_key(|hop| hop.cost);

        match candidate {
            Some(hop) => {
                let expiry = now + Duration::from_millis(interest.lifetime_ms as u64);
                pit_entry
                    .borrow_mut()
                    .insert_out_record(hop.face, interest.nonce, expiry);
                trace!("best-route2: forwarding {} to face {}", interest.name, hop.face);
                forwarder.send_interest(hop.face, interest.clone(), false);
            }
            None => {
                debug!(
                    "best-route2: no viable next-hop for {}, rejecting",
                    interest.name
                );
                forwarder.reject_pending_interest(pit_entry);
            }
        }
    }
}

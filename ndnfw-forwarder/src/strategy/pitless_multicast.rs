//! PIT-less multicast strategy: forward to every live next-hop.

use super::{PitlessForwarding, PitlessStrategy};
use crate::table::fib::FibEntry;
use log::debug;
use ndnfw_common::ndn::{FaceId, Interest, Name};

#[derive(Debug, Default)]
pub struct PitlessMulticast;

impl PitlessMulticast {
    pub fn strategy_name() -> Name {
        Name::from_string("/localhost/nfd/strategy/pitless-multicast/%FD%01")
    }
}

impl PitlessStrategy for PitlessMulticast {
    fn after_receive_interest_pitless(
        &self,
        forwarder: &dyn PitlessForwarding,
        _in_face: FaceId,
        interest: &Interest,
        fib_entry: &FibEntry,
    ) {
        let mut sent = 0usize;
        for hop in &fib_entry.next_hops {
            if forwarder.faces().contains(hop.face) {
                forwarder.send_interest(hop.face, interest.clone(), false);
                sent += 1;
            }
        }
        if sent == 0 {
            debug!("pitless-multicast: no viable next-hops for {}", interest.name);
        }
    }
}

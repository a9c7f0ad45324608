//! PIT-less best-route strategy. Also the fixed fallback the bridge
//! pipeline dispatches into by default, per `pitless-forwarder.cpp`.

use super::{PitlessForwarding, PitlessStrategy};
use crate::table::fib::FibEntry;
use log::debug;
use ndnfw_common::ndn::{FaceId, Interest, Name};

#[derive(Debug, Default)]
pub struct PitlessBestRoute;

impl PitlessBestRoute {
    pub fn strategy_name() -> Name {
        Name::from_string("/localhost/nfd/strategy/pitless-best-route/%FD%01")
    }
}

impl PitlessStrategy for PitlessBestRoute {
    fn after_receive_interest_pitless(
        &self,
        forwarder: &dyn PitlessForwarding,
        _in_face: FaceId,
        interest: &Interest,
        fib_entry: &FibEntry,
    ) {
        // `canForward` defaults to "always true"; liveness is the only
        // filter applied here.
        let candidate = fib_entry
            .next_hops
            .iter()
            .find(|hop| forwarder.faces().contains(hop.face));

        match candidate {
            Some(hop) => forwarder.send_interest(hop.face, interest.clone(), false),
            None => debug!("pitless-best-route: no viable next-hop for {}", interest.name),
        }
    }
}

//! Bridge best-route strategy. Installed in the bridge forwarder's own
//! `BridgeStrategy` strategy-choice table so the family is complete and
//! testable, though the default bridge pipeline dispatches through the
//! PIT-less registry instead, per `pitless-forwarder.cpp` (see
//! `strategy::pitless_best_route`).

use super::BridgeStrategy;
use crate::bridge_forwarder::BridgeForwarder;
use crate::table::fib::FibEntry;
use log::debug;
use ndnfw_common::ndn::{FaceId, Interest, Name};

#[derive(Debug, Default)]
pub struct BridgeBestRoute;

impl BridgeBestRoute {
    pub fn strategy_name() -> Name {
        Name::from_string("/localhost/nfd/strategy/bridge-best-route/%FD%01")
    }
}

impl BridgeStrategy for BridgeBestRoute {
    fn after_receive_interest_bridge(
        &self,
        forwarder: &BridgeForwarder,
        in_face: FaceId,
        interest: &Interest,
        fib_entry: &FibEntry,
    ) {
        let candidate = fib_entry
            .next_hops
            .iter()
            .filter(|hop| hop.face != in_face)
            .find(|hop| forwarder.faces().contains(hop.face));

        match candidate {
            Some(hop) => forwarder.send_interest(hop.face, interest.clone(), false),
            None => debug!("bridge-best-route: no viable next-hop for {}", interest.name),
        }
    }
}

//! Strategy base traits, mirroring NFD's `Strategy` hierarchy. Three
//! families share the same shape -- a primary decision trigger plus a
//! `before_satisfy_interest` hook -- but are kept as distinct traits rather
//! than one trait parameterized over a shared supertrait: each trigger
//! takes the forwarder variant it belongs to, and the families never need
//! to be treated polymorphically as each other.
//!
//! Strategies never hold a reference to their forwarder; the forwarder is
//! passed as a parameter on every trigger call instead, so a
//! `Strategy-Choice` table can own strategies for the lifetime of the
//! forwarder without an ownership cycle back to it.

pub mod best_route2;
pub mod bridge_best_route;
pub mod pitless_best_route;
pub mod pitless_multicast;

use crate::bridge_forwarder::BridgeForwarder;
use crate::face::FaceTable;
use crate::forwarder::Forwarder;
use crate::table::fib::Fib;
use crate::table::fib::FibEntry;
use crate::table::pit::PitEntry;
use ndnfw_common::ndn::{Data, FaceId, Interest};
use std::cell::RefCell;
use std::rc::Rc;

/// Classical, PIT-bound trigger.
pub trait Strategy: std::fmt::Debug {
    fn after_receive_interest(
        &self,
        forwarder: &Forwarder,
        in_face: FaceId,
        interest: &Interest,
        fib_entry: &FibEntry,
        pit_entry: &Rc<RefCell<PitEntry>>,
    );

    fn before_satisfy_interest(
        &self,
        _forwarder: &Forwarder,
        _pit_entry: Option<&Rc<RefCell<PitEntry>>>,
        _face: FaceId,
        _data: &Data,
    ) {
    }
}

/// The minimal collaborator surface a `PitlessStrategy` trigger needs. Both
/// `PitlessForwarder` and `BridgeForwarder` implement it -- the bridge's
/// classical ingress dispatches into the PIT-less strategy family through
/// this trait rather than owning a real `PitlessForwarder`, so the trigger
/// never assumes a concrete forwarder type.
pub trait PitlessForwarding {
    fn faces(&self) -> &FaceTable;
    fn fib(&self) -> &RefCell<Fib>;
    fn send_interest(&self, out_face: FaceId, interest: Interest, want_new_nonce: bool);
    fn send_data(&self, out_face: FaceId, data: Data);
}

/// PIT-less trigger: no PIT entry is available or needed.
pub trait PitlessStrategy: std::fmt::Debug {
    fn after_receive_interest_pitless(
        &self,
        forwarder: &dyn PitlessForwarding,
        in_face: FaceId,
        interest: &Interest,
        fib_entry: &FibEntry,
    );

    fn before_satisfy_interest(&self, _forwarder: &dyn PitlessForwarding, _face: FaceId, _data: &Data) {
    }
}

/// Bridge trigger. Declared for completeness and testability;
/// `BridgeForwarder`'s real content-store-miss dispatch goes through the
/// embedded PIT-less registry instead, per `pitless-forwarder.cpp`, and
/// never calls this trigger by default.
pub trait BridgeStrategy: std::fmt::Debug {
    fn after_receive_interest_bridge(
        &self,
        forwarder: &BridgeForwarder,
        in_face: FaceId,
        interest: &Interest,
        fib_entry: &FibEntry,
    );

    fn before_satisfy_interest(&self, _forwarder: &BridgeForwarder, _face: FaceId, _data: &Data) {
    }
}

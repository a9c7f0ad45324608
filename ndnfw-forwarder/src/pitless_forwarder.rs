//! The PIT-less forwarder: no PIT, no Dead-Nonce list, no
//! Unsatisfy/Straggler timers. Namespaces where aggregation provides no
//! benefit collapse to a pure lookup-and-forward pipeline, per
//! pitless-forwarder.cpp.

use crate::config::ForwarderConfig;
use crate::face::FaceTable;
use crate::registry::StrategyRegistry;
use crate::strategy::{PitlessForwarding, PitlessStrategy};
use crate::table::cs::ContentStore;
use crate::table::fib::Fib;
use crate::table::strategy_choice::StrategyChoiceTable;
use crate::DelayCallback;
use log::{debug, warn};
use ndnfw_common::metrics::UdcnMetrics;
use ndnfw_common::ndn::{Data, FaceId, Interest, Name, FACEID_CONTENT_STORE, LOCALHOST_NAME};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

pub struct PitlessForwarder {
    faces: FaceTable,
    fib: RefCell<Fib>,
    cs: RefCell<ContentStore>,
    strategy_choice: StrategyChoiceTable<dyn PitlessStrategy>,
    metrics: Rc<UdcnMetrics>,
    interest_delay_callback: RefCell<Option<DelayCallback>>,
    content_delay_callback: RefCell<Option<DelayCallback>>,
}

impl PitlessForwarder {
    pub fn new(
        config: ForwarderConfig,
        metrics: Rc<UdcnMetrics>,
        registry: &StrategyRegistry,
    ) -> Rc<Self> {
        let strategy_choice = StrategyChoiceTable::new();
        registry.install_pitless_strategies(&strategy_choice);
        Rc::new(Self {
            faces: FaceTable::new(),
            fib: RefCell::new(Fib::new()),
            cs: RefCell::new(ContentStore::new(config.cs_capacity)),
            strategy_choice,
            metrics,
            interest_delay_callback: RefCell::new(None),
            content_delay_callback: RefCell::new(None),
        })
    }

    pub fn faces(&self) -> &FaceTable {
        &self.faces
    }

    pub fn fib(&self) -> &RefCell<Fib> {
        &self.fib
    }

    pub fn metrics(&self) -> &UdcnMetrics {
        &self.metrics
    }

    pub fn set_interest_delay_callback(&self, cb: DelayCallback) {
        *self.interest_delay_callback.borrow_mut() = Some(cb);
    }

    pub fn set_content_delay_callback(&self, cb: DelayCallback) {
        *self.content_delay_callback.borrow_mut() = Some(cb);
    }

    fn fire_interest_delay(&self, face: FaceId, start: Instant) {
        if let Some(cb) = self.interest_delay_callback.borrow().as_ref() {
            cb(face, Instant::now(), start.elapsed());
        }
    }

    fn fire_content_delay(&self, face: FaceId, start: Instant) {
        if let Some(cb) = self.content_delay_callback.borrow().as_ref() {
            cb(face, Instant::now(), start.elapsed());
        }
    }

    pub fn send_interest(&self, out_face: FaceId, mut interest: Interest, want_new_nonce: bool) {
        if !out_face.is_valid() {
            warn!("pitless-forwarder: refusing to send Interest to INVALID_FACEID");
            return;
        }
        if want_new_nonce {
            interest.nonce = rand::random();
        }
        match self.faces.get(out_face) {
            Some(face) => {
                self.metrics.n_out_interests.increment();
                face.send_interest(interest);
            }
            None => warn!("pitless-forwarder: stale face {} for outgoing Interest", out_face),
        }
    }

    pub fn send_data(&self, out_face: FaceId, data: Data) {
        if !out_face.is_valid() {
            warn!("pitless-forwarder: refusing to send Data to INVALID_FACEID");
            return;
        }
        match self.faces.get(out_face) {
            Some(face) => {
                self.metrics.n_out_datas.increment();
                face.send_data(data);
            }
            None => warn!("pitless-forwarder: stale face {} for outgoing Data", out_face),
        }
    }

    /// Incoming Interest pipeline.
    pub fn on_incoming_interest_pitless(self: &Rc<Self>, in_face: FaceId, interest: Interest) {
        let start = Instant::now();
        self.metrics.n_in_interests.increment();

        let face = match self.faces.get(in_face) {
            Some(f) => f,
            None => {
                warn!("pitless-forwarder: Interest from unregistered face {}", in_face);
                return;
            }
        };

        if !face.is_local() && Name::from_string(LOCALHOST_NAME).is_prefix_of(&interest.name) {
            debug!(
                "pitless-forwarder: scope violation, non-local face {} requested {}",
                in_face, interest.name
            );
            self.metrics.n_scope_violations.increment();
            self.fire_interest_delay(in_face, start);
            return;
        }

        let self_hit = self.clone();
        let interest_hit = interest.clone();
        let self_miss = self.clone();
        let interest_miss = interest.clone();

        self.cs.borrow().find(
            &interest,
            move |data| self_hit.on_content_store_hit(in_face, &interest_hit, data),
            move || self_miss.on_content_store_miss(in_face, &interest_miss),
        );

        self.fire_interest_delay(in_face, start);
    }

    fn on_content_store_hit(self: &Rc<Self>, in_face: FaceId, interest: &Interest, mut data: Data) {
        if let Some(strategy) = self.strategy_choice.find_effective_strategy(&interest.name) {
            strategy.before_satisfy_interest(&**self, FACEID_CONTENT_STORE, &data);
        }
        data.incoming_face_id = FACEID_CONTENT_STORE;
        self.send_data(in_face, data);
    }

    fn on_content_store_miss(self: &Rc<Self>, in_face: FaceId, interest: &Interest) {
        let fib_entry = self.fib.borrow().longest_prefix_match(&interest.name);
        match self.strategy_choice.find_effective_strategy(&interest.name) {
            Some(strategy) => {
                strategy.after_receive_interest_pitless(&**self, in_face, interest, &fib_entry)
            }
            None => warn!("pitless-forwarder: no effective strategy for {}", interest.name),
        }
    }

    /// Incoming Data pipeline: scope-checked against the supporting name,
    /// forwarded to the first live next-hop that isn't the ingress face.
    pub fn on_incoming_data_pitless(self: &Rc<Self>, in_face: FaceId, mut data: Data) {
        let start = Instant::now();
        self.metrics.n_in_datas.increment();

        let face = match self.faces.get(in_face) {
            Some(f) => f,
            None => {
                warn!("pitless-forwarder: Data from unregistered face {}", in_face);
                return;
            }
        };

        if !face.is_local()
            && Name::from_string(LOCALHOST_NAME).is_prefix_of(&data.supporting_name)
        {
            debug!(
                "pitless-forwarder: scope violation on supporting name {} from face {}",
                data.supporting_name, in_face
            );
            self.fire_content_delay(in_face, start);
            return;
        }

        data.incoming_face_id = in_face;
        self.cs.borrow_mut().insert(data.stripped_for_cs());

        let fib_entry = self.fib.borrow().longest_prefix_match(&data.name);
        let candidate = fib_entry
            .next_hops
            .iter()
            .find(|hop| hop.face != in_face && self.faces.contains(hop.face));

        match candidate {
            Some(hop) => self.send_data(hop.face, data),
            None => debug!("pitless-forwarder: no viable egress for Data {}", data.name),
        }

        self.fire_content_delay(in_face, start);
    }
}

impl PitlessForwarding for PitlessForwarder {
    fn faces(&self) -> &FaceTable {
        self.faces()
    }

    fn fib(&self) -> &RefCell<Fib> {
        self.fib()
    }

    fn send_interest(&self, out_face: FaceId, interest: Interest, want_new_nonce: bool) {
        self.send_interest(out_face, interest, want_new_nonce)
    }

    fn send_data(&self, out_face: FaceId, data: Data) {
        self.send_data(out_face, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Face;
    use crate::table::fib::NextHop;
    use std::cell::RefCell as StdRefCell;

    #[derive(Debug)]
    struct RecordingFace {
        id: FaceId,
        sent_interests: StdRefCell<Vec<Interest>>,
    }

    impl RecordingFace {
        fn new(id: u64) -> Rc<Self> {
            Rc::new(Self {
                id: FaceId(id),
                sent_interests: StdRefCell::new(Vec::new()),
            })
        }
    }

    impl Face for RecordingFace {
        fn id(&self) -> FaceId {
            self.id
        }
        fn send_interest(&self, interest: Interest) {
            self.sent_interests.borrow_mut().push(interest);
        }
        fn send_data(&self, _data: Data) {}
    }

    fn make_forwarder() -> Rc<PitlessForwarder> {
        let registry = StrategyRegistry::with_default_strategies();
        PitlessForwarder::new(
            ForwarderConfig::default(),
            Rc::new(UdcnMetrics::new()),
            &registry,
        )
    }

    #[test]
    fn s5_pitless_best_route_picks_first_next_hop_and_creates_no_pit() {
        let fwd = make_forwarder();
        let face1 = RecordingFace::new(1);
        let face2 = RecordingFace::new(2);
        let face3 = RecordingFace::new(3);
        fwd.faces().insert(face1);
        fwd.faces().insert(face2.clone());
        fwd.faces().insert(face3.clone());
        fwd.fib().borrow_mut().insert(
            Name::from_string("/b"),
            vec![
                NextHop {
                    face: FaceId(2),
                    cost: 1,
                },
                NextHop {
                    face: FaceId(3),
                    cost: 1,
                },
            ],
        );

        fwd.on_incoming_interest_pitless(FaceId(1), Interest::new(Name::from_string("/b/x")));

        assert_eq!(face2.sent_interests.borrow().len(), 1);
        assert_eq!(face3.sent_interests.borrow().len(), 0);
    }

    #[test]
    fn s6_pitless_multicast_sends_to_every_next_hop() {
        use crate::strategy::pitless_multicast::PitlessMulticast;
        let mut registry = StrategyRegistry::new();
        registry.register_pitless_strategy(PitlessMulticast::strategy_name(), true, || {
            Rc::new(PitlessMulticast)
        });
        let fwd = PitlessForwarder::new(
            ForwarderConfig::default(),
            Rc::new(UdcnMetrics::new()),
            &registry,
        );
        let face1 = RecordingFace::new(1);
        let face2 = RecordingFace::new(2);
        let face3 = RecordingFace::new(3);
        fwd.faces().insert(face1);
        fwd.faces().insert(face2.clone());
        fwd.faces().insert(face3.clone());
        fwd.fib().borrow_mut().insert(
            Name::from_string("/b"),
            vec![
                NextHop {
                    face: FaceId(2),
                    cost: 1,
                },
                NextHop {
                    face: FaceId(3),
                    cost: 1,
                },
            ],
        );

        fwd.on_incoming_interest_pitless(FaceId(1), Interest::new(Name::from_string("/b/x")));

        assert_eq!(face2.sent_interests.borrow().len(), 1);
        assert_eq!(face3.sent_interests.borrow().len(), 1);
    }
}

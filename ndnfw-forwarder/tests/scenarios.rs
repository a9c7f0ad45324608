//! End-to-end scenario coverage for all three forwarder planes, exercising
//! the public API rather than internals. The colocated `#[cfg(test)]`
//! modules in forwarder.rs/pitless_forwarder.rs/bridge_forwarder.rs cover
//! the same scenarios against private state (PIT/CS contents); this file
//! checks the same behavior from the outside, the way a face collaborator
//! would observe it.

use bytes::Bytes;
use ndnfw_common::metrics::UdcnMetrics;
use ndnfw_common::ndn::{Data, FaceId, Interest, Name};
use ndnfw_forwarder::bridge_forwarder::BridgeForwarder;
use ndnfw_forwarder::config::ForwarderConfig;
use ndnfw_forwarder::face::Face;
use ndnfw_forwarder::forwarder::Forwarder;
use ndnfw_forwarder::pitless_forwarder::PitlessForwarder;
use ndnfw_forwarder::registry::StrategyRegistry;
use ndnfw_forwarder::table::fib::NextHop;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
struct RecordingFace {
    id: FaceId,
    sent_interests: RefCell<Vec<Interest>>,
    sent_data: RefCell<Vec<Data>>,
}

impl RecordingFace {
    fn new(id: u64) -> Rc<Self> {
        Rc::new(Self {
            id: FaceId(id),
            sent_interests: RefCell::new(Vec::new()),
            sent_data: RefCell::new(Vec::new()),
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
    fn send_data(&self, data: Data) {
        self.sent_data.borrow_mut().push(data);
    }
}

fn classical_forwarder() -> Rc<Forwarder> {
    let registry = StrategyRegistry::with_default_strategies();
    Forwarder::new(ForwarderConfig::default(), Rc::new(UdcnMetrics::new()), &registry)
}

#[tokio::test(flavor = "current_thread")]
async fn s1_interest_is_forwarded_to_the_fib_next_hop() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let fwd = classical_forwarder();
            let downstream = RecordingFace::new(1);
            let upstream = RecordingFace::new(2);
            fwd.faces().insert(downstream);
            fwd.faces().insert(upstream.clone());
            fwd.fib().borrow_mut().insert(
                Name::from_string("/a"),
                vec![NextHop { face: FaceId(2), cost: 1 }],
            );

            fwd.on_incoming_interest(FaceId(1), Interest::new(Name::from_string("/a/1")));

            assert_eq!(upstream.sent_interests.borrow().len(), 1);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn s2_a_second_interest_for_the_same_name_aggregates_in_the_pit() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let fwd = classical_forwarder();
            let consumer_a = RecordingFace::new(1);
            let consumer_b = RecordingFace::new(3);
            let upstream = RecordingFace::new(2);
            fwd.faces().insert(consumer_a);
            fwd.faces().insert(consumer_b);
            fwd.faces().insert(upstream.clone());
            fwd.fib().borrow_mut().insert(
                Name::from_string("/a"),
                vec![NextHop { face: FaceId(2), cost: 1 }],
            );

            fwd.on_incoming_interest(FaceId(1), Interest::new(Name::from_string("/a/1")).with_nonce(1));
            fwd.on_incoming_interest(FaceId(3), Interest::new(Name::from_string("/a/1")).with_nonce(2));

            assert_eq!(upstream.sent_interests.borrow().len(), 1);
            assert_eq!(fwd.pit().len(), 1);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn s3_duplicate_nonce_from_a_different_face_is_an_interest_loop() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let fwd = classical_forwarder();
            let face1 = RecordingFace::new(1);
            let face2 = RecordingFace::new(2);
            let face3 = RecordingFace::new(3);
            fwd.faces().insert(face1);
            fwd.faces().insert(face2.clone());
            fwd.faces().insert(face3);
            fwd.fib().borrow_mut().insert(
                Name::from_string("/a"),
                vec![NextHop { face: FaceId(2), cost: 1 }],
            );

            let interest = Interest::new(Name::from_string("/a/1")).with_nonce(0xDEAD);
            fwd.on_incoming_interest(FaceId(1), interest.clone());
            fwd.on_incoming_interest(FaceId(3), interest);

            assert_eq!(fwd.metrics().n_interest_loop.value(), 1);
            assert_eq!(face2.sent_interests.borrow().len(), 1);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn s4_data_satisfies_every_pending_downstream_face_but_not_the_upstream() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let fwd = classical_forwarder();
            let consumer = RecordingFace::new(1);
            let upstream = RecordingFace::new(2);
            fwd.faces().insert(consumer.clone());
            fwd.faces().insert(upstream.clone());
            fwd.fib().borrow_mut().insert(
                Name::from_string("/a"),
                vec![NextHop { face: FaceId(2), cost: 1 }],
            );

            fwd.on_incoming_interest(FaceId(1), Interest::new(Name::from_string("/a/1")));
            fwd.on_incoming_data(
                FaceId(2),
                Data::new(Name::from_string("/a/1"), Bytes::from_static(b"hello")),
            );

            assert_eq!(consumer.sent_data.borrow().len(), 1);
            assert_eq!(upstream.sent_data.borrow().len(), 0);
            assert_eq!(fwd.metrics().n_interests_satisfied.value(), 1);
        })
        .await;
}

#[test]
fn s5_pitless_best_route_forwards_to_exactly_one_next_hop_and_keeps_no_pit() {
    let registry = StrategyRegistry::with_default_strategies();
    let fwd = PitlessForwarder::new(ForwarderConfig::default(), Rc::new(UdcnMetrics::new()), &registry);
    let consumer = RecordingFace::new(1);
    let upstream_a = RecordingFace::new(2);
    let upstream_b = RecordingFace::new(3);
    fwd.faces().insert(consumer);
    fwd.faces().insert(upstream_a.clone());
    fwd.faces().insert(upstream_b.clone());
    fwd.fib().borrow_mut().insert(
        Name::from_string("/b"),
        vec![
            NextHop { face: FaceId(2), cost: 1 },
            NextHop { face: FaceId(3), cost: 1 },
        ],
    );

    fwd.on_incoming_interest_pitless(FaceId(1), Interest::new(Name::from_string("/b/x")));

    assert_eq!(upstream_a.sent_interests.borrow().len(), 1);
    assert_eq!(upstream_b.sent_interests.borrow().len(), 0);
}

#[test]
fn s6_pitless_multicast_forwards_to_every_next_hop() {
    use ndnfw_forwarder::strategy::pitless_multicast::PitlessMulticast;

    let mut registry = StrategyRegistry::new();
    registry.register_pitless_strategy(PitlessMulticast::strategy_name(), true, || Rc::new(PitlessMulticast));
    let fwd = PitlessForwarder::new(ForwarderConfig::default(), Rc::new(UdcnMetrics::new()), &registry);
    let consumer = RecordingFace::new(1);
    let upstream_a = RecordingFace::new(2);
    let upstream_b = RecordingFace::new(3);
    fwd.faces().insert(consumer);
    fwd.faces().insert(upstream_a.clone());
    fwd.faces().insert(upstream_b.clone());
    fwd.fib().borrow_mut().insert(
        Name::from_string("/b"),
        vec![
            NextHop { face: FaceId(2), cost: 1 },
            NextHop { face: FaceId(3), cost: 1 },
        ],
    );

    fwd.on_incoming_interest_pitless(FaceId(1), Interest::new(Name::from_string("/b/x")));

    assert_eq!(upstream_a.sent_interests.borrow().len(), 1);
    assert_eq!(upstream_b.sent_interests.borrow().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn s7_bridge_rewrites_the_supporting_name_and_keeps_an_ingress_pit_entry() {
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let registry = StrategyRegistry::with_default_strategies();
            let fwd = BridgeForwarder::new(
                Name::from_string("/bridge/42"),
                ForwarderConfig::default(),
                Rc::new(UdcnMetrics::new()),
                &registry,
            );
            let consumer = RecordingFace::new(1);
            let upstream = RecordingFace::new(2);
            fwd.faces().insert(consumer);
            fwd.faces().insert(upstream.clone());
            fwd.fib().borrow_mut().insert(
                Name::from_string("/c"),
                vec![NextHop { face: FaceId(2), cost: 1 }],
            );

            fwd.on_incoming_interest(FaceId(1), Interest::new(Name::from_string("/c/y")).with_nonce(7));

            assert_eq!(upstream.sent_interests.borrow().len(), 1);
            let egressed = &upstream.sent_interests.borrow()[0];
            assert_eq!(egressed.name, Name::from_string("/c/y"));
            assert_eq!(egressed.supporting_name, Name::from_string("/bridge/42"));
            assert_eq!(fwd.pit().len(), 1);
        })
        .await;
}

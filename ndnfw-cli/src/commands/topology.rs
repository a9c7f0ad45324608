//! A two-face topology shared by the `interest` and `publish` commands: face
//! 1 is the consumer the CLI injects packets on behalf of, face 2 is the
//! route's next-hop. There's no real wire, so whichever command needs a
//! producer drains face 2's events itself and calls back into the forwarder
//! directly.

use ndnfw_common::metrics::UdcnMetrics;
use ndnfw_common::ndn::{FaceId, Name};
use ndnfw_face::{ChannelFace, FaceEvent};
use ndnfw_forwarder::config::ForwarderConfig;
use ndnfw_forwarder::forwarder::Forwarder;
use ndnfw_forwarder::registry::StrategyRegistry;
use ndnfw_forwarder::table::fib::NextHop;
use std::rc::Rc;
use tokio::sync::mpsc;

pub const CONSUMER_FACE: FaceId = FaceId(1);
pub const PRODUCER_FACE: FaceId = FaceId(2);

pub struct Topology {
    pub forwarder: Rc<Forwarder>,
    pub consumer_events: mpsc::UnboundedReceiver<FaceEvent>,
    pub producer_events: mpsc::UnboundedReceiver<FaceEvent>,
}

/// A forwarder with `prefix` routed to `PRODUCER_FACE`, cost 10.
pub fn build(prefix: Name) -> Topology {
    let registry = StrategyRegistry::with_default_strategies();
    let forwarder = Forwarder::new(
        ForwarderConfig::default(),
        Rc::new(UdcnMetrics::new()),
        &registry,
    );

    let (consumer, consumer_events) = ChannelFace::local(CONSUMER_FACE);
    let (producer, producer_events) = ChannelFace::new(PRODUCER_FACE);
    forwarder.faces().insert(consumer);
    forwarder.faces().insert(producer);

    forwarder.fib().borrow_mut().insert(
        prefix,
        vec![NextHop {
            face: PRODUCER_FACE,
            cost: 10,
        }],
    );

    Topology {
        forwarder,
        consumer_events,
        producer_events,
    }
}

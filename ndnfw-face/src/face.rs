//! A `Face` backed by a tokio mpsc channel instead of a socket. Sending a
//! packet on a `ChannelFace` pushes a `FaceEvent` into the channel; whatever
//! owns the paired receiver is responsible for pulling events off it and
//! feeding them into the peer forwarder's incoming-Interest/incoming-Data
//! pipeline. There is no framing, no fragmentation and no TLS: the wire is
//! an in-process queue, which is all the forwarder's `Face` trait needs from
//! a collaborator.

use log::warn;
use ndnfw_common::ndn::{Data, FaceId, Interest};
use ndnfw_forwarder::face::Face;
use std::rc::Rc;
use tokio::sync::mpsc;

/// What a `ChannelFace` hands to the far end of the channel. Closing the
/// sender (dropping the last `ChannelFace`) ends the stream; there's no
/// separate `Closed`/`Error` variant because the channel already expresses
/// that through `recv` returning `None`.
#[derive(Debug, Clone)]
pub enum FaceEvent {
    InterestReceived(Interest),
    DataReceived(Data),
}

#[derive(Debug)]
pub struct ChannelFace {
    id: FaceId,
    local: bool,
    pitless: bool,
    bridge: bool,
    outbound: mpsc::UnboundedSender<FaceEvent>,
}

impl ChannelFace {
    /// A non-local, non-pitless, non-bridge face -- the common case for
    /// tests and for `ndnfw-cli`'s packet-injection commands.
    pub fn new(id: FaceId) -> (Rc<Self>, mpsc::UnboundedReceiver<FaceEvent>) {
        Self::with_flags(id, false, false, false)
    }

    pub fn local(id: FaceId) -> (Rc<Self>, mpsc::UnboundedReceiver<FaceEvent>) {
        Self::with_flags(id, true, false, false)
    }

    pub fn with_flags(
        id: FaceId,
        local: bool,
        pitless: bool,
        bridge: bool,
    ) -> (Rc<Self>, mpsc::UnboundedReceiver<FaceEvent>) {
        let (outbound, inbound) = mpsc::unbounded_channel();
        (
            Rc::new(Self {
                id,
                local,
                pitless,
                bridge,
                outbound,
            }),
            inbound,
        )
    }
}

impl Face for ChannelFace {
    fn id(&self) -> FaceId {
        self.id
    }

    fn is_local(&self) -> bool {
        self.local
    }

    fn is_pitless(&self) -> bool {
        self.pitless
    }

    fn is_bridge(&self) -> bool {
        self.bridge
    }

    fn send_interest(&self, interest: Interest) {
        if self
            .outbound
            .send(FaceEvent::InterestReceived(interest))
            .is_err()
        {
            warn!("channel-face {}: peer gone, dropping outgoing Interest", self.id);
        }
    }

    fn send_data(&self, data: Data) {
        if self.outbound.send(FaceEvent::DataReceived(data)).is_err() {
            warn!("channel-face {}: peer gone, dropping outgoing Data", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndnfw_common::ndn::Name;

    #[tokio::test]
    async fn sent_interest_arrives_as_a_face_event() {
        let (face, mut rx) = ChannelFace::new(FaceId(7));
        face.send_interest(Interest::new(Name::from_string("/a/b")));

        match rx.recv().await {
            Some(FaceEvent::InterestReceived(interest)) => {
                assert_eq!(interest.name, Name::from_string("/a/b"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn dropping_the_face_closes_the_channel() {
        let (face, mut rx) = ChannelFace::new(FaceId(1));
        drop(face);
        assert!(rx.recv().await.is_none());
    }
}

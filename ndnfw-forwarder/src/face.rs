//! The face collaborator contract and the reactor-owned table of faces
//! currently attached to a forwarder.

use ndnfw_common::ndn::{Data, FaceId, Interest};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// What the core consumes from a transport collaborator: the ability to hand
/// it outbound packets, plus the locality/plane flags the pipelines and
/// strategies branch on. Faces never hold a reference back into the
/// forwarder; the core only ever holds `FaceId`s and resolves them through
/// the `FaceTable`, so a face going away simply stops resolving.
pub trait Face: fmt::Debug {
    fn id(&self) -> FaceId;

    /// True for faces on the same host as the forwarder (NFD's `ndn:/localhost`
    /// scope check only applies to non-local faces).
    fn is_local(&self) -> bool {
        false
    }

    /// True when this face is attached to the PIT-less plane.
    fn is_pitless(&self) -> bool {
        false
    }

    /// True when this face is the classical ingress of a bridge.
    fn is_bridge(&self) -> bool {
        false
    }

    fn send_interest(&self, interest: Interest);
    fn send_data(&self, data: Data);
}

/// Reactor-owned table indexing live faces by id. The FIB, PIT and strategies
/// never hold a `Face` directly; they hold a `FaceId` and look it up here on
/// every use, so a face removed between FIB population and Interest arrival
/// is simply absent rather than a dangling reference.
#[derive(Default)]
pub struct FaceTable {
    faces: RefCell<HashMap<FaceId, Rc<dyn Face>>>,
}

impl FaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, face: Rc<dyn Face>) {
        self.faces.borrow_mut().insert(face.id(), face);
    }

    /// Lifecycle signal: a face has disconnected. Outstanding `FaceId`s
    /// simply stop resolving afterwards.
    pub fn remove(&self, id: FaceId) -> Option<Rc<dyn Face>> {
        self.faces.borrow_mut().remove(&id)
    }

    pub fn get(&self, id: FaceId) -> Option<Rc<dyn Face>> {
        self.faces.borrow().get(&id).cloned()
    }

    pub fn contains(&self, id: FaceId) -> bool {
        self.faces.borrow().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.faces.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.borrow().is_empty()
    }
}

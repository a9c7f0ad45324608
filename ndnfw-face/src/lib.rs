//! An in-process `Face` collaborator for `ndnfw-forwarder`.
//!
//! Transport and wire encoding are out of scope for this workspace; this
//! crate exists only so the forwarder's `Face` trait has a real, testable
//! implementation to attach to a `FaceTable`. A `ChannelFace` is one end of
//! a tokio mpsc channel -- pairing two of them and pumping each one's
//! receiver into the other forwarder's incoming pipeline is enough to wire
//! up a classical/PIT-less/bridge topology end to end, which is what
//! `ndnfw-cli` does.

mod face;

pub use face::{ChannelFace, FaceEvent};

//! Forwarding core: the FIB/CS/PIT/Dead-Nonce/Strategy-Choice tables, the
//! three strategy families, the strategy registry, and the three forwarder
//! planes (classical, PIT-less, bridge) that tie them together.
//!
//! The reactor model is single-threaded and cooperative: forwarders and
//! their tables use `Rc`/`RefCell`, not `Arc`/`Mutex`, and pipeline code is
//! meant to run inside a `tokio::task::LocalSet` (see `ndnfw-cli`). Timer
//! callbacks hold only weak references back into the forwarder and its PIT
//! entries so a dropped forwarder or finalized entry makes them no-ops
//! rather than dangling.

pub mod bridge_forwarder;
pub mod config;
pub mod error;
pub mod face;
pub mod forwarder;
pub mod pitless_forwarder;
pub mod registry;
pub mod strategy;
pub mod table;

use ndnfw_common::ndn::FaceId;
use std::time::{Duration, Instant};

/// Observability hook signature shared by `interestDelayCallback` and
/// `contentDelayCallback`, mirroring NFD's own delay-measurement hooks:
/// invoked from a pipeline terminator with the face the packet arrived on,
/// the current time, and the wall-clock elapsed during that pipeline
/// invocation.
pub type DelayCallback = Box<dyn Fn(FaceId, Instant, Duration)>;

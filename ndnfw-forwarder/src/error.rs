//! Error taxonomy for the forwarding core.
//!
//! Pipelines themselves are total: a scope violation, a duplicate nonce, a
//! stale face reference or a missing next-hop are all *handled* inline
//! (logged and dropped) rather than surfaced as `Err`. `ForwarderError` is
//! reserved for failures in setup and table administration, where a
//! collaborator (the CLI, a test) needs a `Result` to react to.

use ndnfw_common::ndn::Name;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForwarderError {
    #[error("no strategy registered under name {0}")]
    UnknownStrategy(Name),

    #[error("strategy {0} already installed under an exact prefix match")]
    DuplicateStrategy(Name),

    #[error("face {0} is not registered in the face table")]
    UnknownFace(u64),

    #[error("bridge fallback strategy {0} is missing from the PIT-less registry; broken installation")]
    BrokenBridgeFallback(Name),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ForwarderError>;

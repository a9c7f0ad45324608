//! Shared value types for the NDN forwarding workspace.
//!
//! This crate provides the `Name`/`Interest`/`Data` packet model, the TLV-ish
//! error taxonomy, and the metrics primitives used by both the forwarder core
//! and its face/CLI collaborators.

pub mod error;
pub mod metrics;
pub mod ndn;
pub mod tlv;

/// Reexport of common types
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

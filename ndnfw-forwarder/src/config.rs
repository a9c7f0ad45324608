//! Forwarder-wide tunables: a plain struct with a sensible `Default`,
//! mirroring `rust-udcn-quic::config`'s `ServerOptions`/`ClientOptions`
//! shape, covering what the collaborator-facing interfaces leave
//! unspecified.

use std::time::Duration;

/// What to do with Data that arrives on the classical plane with no
/// matching PIT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsolicitedDataPolicy {
    /// Drop it, matching NFD's default unsolicited-data policy.
    Drop,
    /// Cache it anyway, on the theory that some other Interest may still
    /// want it. Not the common case; exposed for completeness.
    CacheAnyway,
}

#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Dead-Nonce list retention window.
    pub dead_nonce_retention: Duration,
    /// How long after first satisfaction the Straggler timer waits before
    /// finalizing a PIT entry.
    pub straggler_timeout: Duration,
    pub unsolicited_data_policy: UnsolicitedDataPolicy,
    /// Content Store capacity (bounded FIFO; eviction policy beyond FIFO
    /// isn't modeled here).
    pub cs_capacity: usize,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            dead_nonce_retention: Duration::from_secs(60),
            straggler_timeout: Duration::from_millis(100),
            unsolicited_data_policy: UnsolicitedDataPolicy::Drop,
            cs_capacity: 1024,
        }
    }
}

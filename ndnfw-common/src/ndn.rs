//! NDN packet and name value types.
//!
//! This module provides the core data structures that represent NDN names,
//! Interests and Data that flow through the forwarding core.

use crate::error::Error;
use crate::tlv::{self, TlvElement};
use bytes::{Buf, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// Maximum length of an NDN name component.
pub const MAX_NAME_COMPONENT_LENGTH: usize = 255;
/// Maximum number of components in an NDN name.
pub const MAX_NAME_COMPONENTS: usize = 16;
/// Maximum size of an NDN packet.
pub const MAX_NDN_PACKET_SIZE: usize = 8800;

/// Reserved name prefix for local-only traffic (§4.1 scope check).
pub const LOCALHOST_NAME: &str = "/localhost";

/* ---------------------------------------------------------------- *\
 * FaceId
\* ---------------------------------------------------------------- */

/// Identifies a face. `0` and `u64::MAX` are reserved sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId(pub u64);

/// Never assigned to a real face; a zeroed/absent face reference.
pub const INVALID_FACEID: FaceId = FaceId(0);

/// Tags Data originating from the Content Store rather than a real face.
pub const FACEID_CONTENT_STORE: FaceId = FaceId(u64::MAX);

impl FaceId {
    pub fn is_valid(self) -> bool {
        self != INVALID_FACEID
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/* ---------------------------------------------------------------- *\
 * Name and NameComponent
\* ---------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameComponent(pub Bytes);

impl NameComponent {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    pub fn to_tlv(&self) -> TlvElement {
        TlvElement::new(tlv::TLV_COMPONENT, self.0.clone())
    }

    pub fn from_tlv(element: &TlvElement) -> Result<Self, Error> {
        if element.tlv_type != tlv::TLV_COMPONENT {
            return Err(Error::NdnPacket(format!(
                "Expected name component TLV type {}, got {}",
                tlv::TLV_COMPONENT,
                element.tlv_type
            )));
        }
        Ok(Self(element.value.clone()))
    }
}

impl PartialEq<&str> for NameComponent {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == other.as_bytes()
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let printable = self.0.iter().all(|&b| (b.is_ascii_graphic() || b == b' '));
        if printable {
            write!(f, "{}", String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "0x")?;
            for &b in &self.0 {
                write!(f, "{:02x}", b)?;
            }
            Ok(())
        }
    }
}

/// An ordered, immutable sequence of name components. Supports the prefix
/// relation used throughout FIB/PIT/strategy-choice longest-prefix lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    components: Vec<NameComponent>,
}

impl Name {
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    pub fn from_string(s: &str) -> Self {
        let components = s
            .split('/')
            .filter(|comp| !comp.is_empty())
            .map(|comp| NameComponent::new(comp.as_bytes().to_vec()))
            .collect();
        Self { components }
    }

    pub fn push(&mut self, component: NameComponent) -> &mut Self {
        self.components.push(component);
        self
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components(&self) -> impl Iterator<Item = &NameComponent> {
        self.components.iter()
    }

    pub fn get(&self, index: usize) -> Option<&NameComponent> {
        self.components.get(index)
    }

    pub fn prefix(&self, len: usize) -> Self {
        Self {
            components: self.components.iter().take(len).cloned().collect(),
        }
    }

    /// `self.is_prefix_of(other)` — true when `self` is a component-wise
    /// prefix of `other` (a name is its own prefix; empty name prefixes
    /// everything).
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.components.len() > other.components.len() {
            return false;
        }
        self.components
            .iter()
            .zip(other.components.iter())
            .all(|(a, b)| a == b)
    }

    pub fn to_tlv(&self) -> Result<TlvElement, Error> {
        let mut buf = BytesMut::new();
        for component in &self.components {
            component.to_tlv().encode(&mut buf);
        }
        Ok(TlvElement::new(tlv::TLV_NAME, buf.freeze()))
    }

    pub fn from_tlv(element: &TlvElement) -> Result<Self, Error> {
        if element.tlv_type != tlv::TLV_NAME {
            return Err(Error::NdnPacket(format!(
                "Expected name TLV type {}, got {}",
                tlv::TLV_NAME,
                element.tlv_type
            )));
        }

        let mut components = Vec::new();
        let mut buf = element.value.clone();
        while buf.has_remaining() {
            let e = TlvElement::decode(&mut buf)?;
            components.push(NameComponent::from_tlv(&e)?);
        }
        Ok(Self { components })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "/");
        }
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::new()
    }
}

/* ---------------------------------------------------------------- *\
 * Interest
\* ---------------------------------------------------------------- */

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interest {
    pub name: Name,
    /// Secondary name used by the PIT-less/bridge planes to convey upstream
    /// identity. Empty for classical traffic.
    pub supporting_name: Name,
    pub nonce: u32,
    pub lifetime_ms: u32,
    pub hop_limit: Option<u8>,
    pub can_be_prefix: bool,
    pub must_be_fresh: bool,
    /// Stamped by the ingress pipeline on arrival; `INVALID_FACEID` until then.
    pub incoming_face_id: FaceId,
}

impl Interest {
    pub fn new(name: Name) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|_| Duration::from_secs(0));
        let nonce = (now.as_nanos() % u32::MAX as u128) as u32;

        Self {
            name,
            supporting_name: Name::new(),
            nonce,
            lifetime_ms: 4000,
            hop_limit: Some(32),
            can_be_prefix: false,
            must_be_fresh: true,
            incoming_face_id: INVALID_FACEID,
        }
    }

    pub fn with_lifetime(mut self, lifetime_ms: u32) -> Self {
        self.lifetime_ms = lifetime_ms;
        self
    }
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = nonce;
        self
    }
    pub fn with_can_be_prefix(mut self, can_be_prefix: bool) -> Self {
        self.can_be_prefix = can_be_prefix;
        self
    }
    pub fn with_must_be_fresh(mut self, must_be_fresh: bool) -> Self {
        self.must_be_fresh = must_be_fresh;
        self
    }
    pub fn with_supporting_name(mut self, supporting_name: Name) -> Self {
        self.supporting_name = supporting_name;
        self
    }

    /// Returns a copy of this Interest rewritten with a new supporting name,
    /// as done by the bridge pipeline before dispatching into the PIT-less
    /// plane (name and nonce are preserved).
    pub fn rewritten_with_supporting_name(&self, supporting_name: Name) -> Self {
        let mut out = self.clone();
        out.supporting_name = supporting_name;
        out
    }

    pub fn wire_size(&self) -> Result<usize, Error> {
        Ok(self.name.to_tlv()?.len() + 20) // rough estimate
    }
}

/* ---------------------------------------------------------------- *\
 * Data
\* ---------------------------------------------------------------- */

/// Helper used only for deserialisation of `Data`.
#[derive(Deserialize)]
struct DataHelper {
    name: Name,
    #[serde(default)]
    supporting_name: Name,
    content: Bytes,
    #[serde(default)]
    freshness_period_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Data {
    pub name: Name,
    pub supporting_name: Name,
    pub content: Bytes,
    /// `None` means the Data never goes stale in the CS.
    pub freshness_period: Option<Duration>,
    /// Stamped by the ingress pipeline; `FACEID_CONTENT_STORE` for Data
    /// served out of the cache.
    pub incoming_face_id: FaceId,

    /// Creation timestamp, used for CS freshness accounting – not
    /// serialised, regenerated on deserialisation.
    #[serde(skip_serializing)]
    pub creation_time: Instant,
}

impl<'de> Deserialize<'de> for Data {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let helper = DataHelper::deserialize(deserializer)?;
        Ok(Self {
            name: helper.name,
            supporting_name: helper.supporting_name,
            content: helper.content,
            freshness_period: helper.freshness_period_ms.map(Duration::from_millis),
            incoming_face_id: INVALID_FACEID,
            creation_time: Instant::now(),
        })
    }
}

impl Data {
    pub fn new(name: Name, content: impl Into<Bytes>) -> Self {
        Self {
            name,
            supporting_name: Name::new(),
            content: content.into(),
            freshness_period: Some(Duration::from_secs(10)),
            incoming_face_id: INVALID_FACEID,
            creation_time: Instant::now(),
        }
    }

    pub fn with_freshness_period(mut self, freshness_period: Option<Duration>) -> Self {
        self.freshness_period = freshness_period;
        self
    }

    pub fn with_supporting_name(mut self, supporting_name: Name) -> Self {
        self.supporting_name = supporting_name;
        self
    }

    /// A fresh copy for the Content Store with per-packet transport tags
    /// stripped (§4.1 "strip transport-only tags" on CS insert).
    pub fn stripped_for_cs(&self) -> Self {
        Self {
            name: self.name.clone(),
            supporting_name: Name::new(),
            content: self.content.clone(),
            freshness_period: self.freshness_period,
            incoming_face_id: INVALID_FACEID,
            creation_time: self.creation_time,
        }
    }

    pub fn is_fresh(&self) -> bool {
        match self.freshness_period {
            None => true,
            Some(fp) => self.creation_time.elapsed() <= fp,
        }
    }

    pub fn wire_size(&self) -> Result<usize, Error> {
        Ok(self.name.to_tlv()?.len() + self.content.len() + 20)
    }
}

/* ---------------------------------------------------------------- *\
 * Misc
\* ---------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub enum InterestResult {
    Forwarded,
    SatisfiedByCs(Data),
    Aggregated,
    Dropped(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_from_string_round_trips() {
        let name = Name::from_string("/test/data/1");
        assert_eq!(name.len(), 3);
        assert_eq!(name.get(0).unwrap(), &"test");
        assert_eq!(name.to_string(), "/test/data/1");
    }

    #[test]
    fn name_prefix_relation() {
        let a = Name::from_string("/a/b");
        let abc = Name::from_string("/a/b/c");
        let d = Name::from_string("/a/b/d");

        assert!(a.is_prefix_of(&abc));
        assert!(!abc.is_prefix_of(&a));
        assert!(!d.is_prefix_of(&abc));
        assert!(abc.is_prefix_of(&abc));
    }

    #[test]
    fn localhost_is_a_prefix_of_local_names() {
        let localhost = Name::from_string(LOCALHOST_NAME);
        let nested = Name::from_string("/localhost/nfd/strategy");
        assert!(localhost.is_prefix_of(&nested));
    }

    #[test]
    fn face_id_sentinels_are_distinct() {
        assert_ne!(INVALID_FACEID, FACEID_CONTENT_STORE);
        assert!(!INVALID_FACEID.is_valid());
        assert!(FaceId(7).is_valid());
    }

    #[test]
    fn interest_rewrite_preserves_name_and_nonce() {
        let interest = Interest::new(Name::from_string("/c/y")).with_nonce(7);
        let bridged = interest.rewritten_with_supporting_name(Name::from_string("/bridge/42"));
        assert_eq!(bridged.name, interest.name);
        assert_eq!(bridged.nonce, 7);
        assert_eq!(bridged.supporting_name, Name::from_string("/bridge/42"));
    }

    #[test]
    fn data_stripped_for_cs_clears_transport_tags() {
        let mut data = Data::new(Name::from_string("/a/1"), Bytes::from_static(b"x"))
            .with_supporting_name(Name::from_string("/bridge/42"));
        data.incoming_face_id = FaceId(3);
        let stripped = data.stripped_for_cs();
        assert!(stripped.supporting_name.is_empty());
        assert_eq!(stripped.incoming_face_id, INVALID_FACEID);
        assert_eq!(stripped.name, data.name);
    }
}

//! `ReachId` and `NodeId`: strong handles for network entities, and the
//! [`Reach`] record itself.
//!
//! Attribute tables encode "no upstream reach" as `UpstreamID = 0`, so
//! `ReachId` wraps a `NonZeroU64` and the absent link becomes `None` rather
//! than a magic value. Node identifiers carry no such reservation.

use std::{fmt, num::NonZeroU64};

use serde::{Deserialize, Serialize};

use crate::geometry::polyline::Polyline;
use crate::topology_error::TopologyError;

/// Identifier of one reach, unique within a [`Network`](super::network::Network).
///
/// # Memory layout
/// `repr(transparent)` over `NonZeroU64`, so `Option<ReachId>` is the same
/// size as `u64`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
#[repr(transparent)]
pub struct ReachId(NonZeroU64);

impl ReachId {
    /// Creates a new `ReachId` from a raw `u64` value.
    ///
    /// # Errors
    /// Returns [`TopologyError::InvalidReachId`] if `raw == 0`.
    ///
    /// ```rust
    /// # use stream_topo::topology::reach::ReachId;
    /// let r = ReachId::new(17)?;
    /// assert_eq!(r.get(), 17);
    /// # Ok::<(), stream_topo::topology_error::TopologyError>(())
    /// ```
    #[inline]
    pub fn new(raw: u64) -> Result<Self, TopologyError> {
        NonZeroU64::new(raw)
            .map(ReachId)
            .ok_or(TopologyError::InvalidReachId)
    }

    /// Interprets an `UpstreamID` attribute: `0` means no upstream reach.
    #[inline]
    pub fn from_link(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(ReachId)
    }

    /// Returns the raw identifier.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for ReachId {
    type Error = TopologyError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        ReachId::new(raw)
    }
}

impl From<ReachId> for u64 {
    fn from(id: ReachId) -> u64 {
        id.get()
    }
}

impl fmt::Debug for ReachId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReachId").field(&self.get()).finish()
    }
}

impl fmt::Display for ReachId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Identifier of a node in the directed node graph (`FROM_NODE`/`TO_NODE`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line feature of the stream network together with its linkage.
///
/// Any of the optional parts may be missing in real datasets; detectors that
/// need a missing part skip the reach.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reach {
    pub id: ReachId,
    #[serde(default)]
    pub geometry: Option<Polyline>,
    /// Adjacent upstream reaches, in order of first appearance in the table.
    #[serde(default)]
    pub upstream: Vec<ReachId>,
    #[serde(default)]
    pub from_node: Option<NodeId>,
    #[serde(default)]
    pub to_node: Option<NodeId>,
}

impl Reach {
    /// A reach with geometry and no linkage.
    pub fn new(id: ReachId, geometry: Polyline) -> Self {
        Self {
            id,
            geometry: Some(geometry),
            upstream: Vec::new(),
            from_node: None,
            to_node: None,
        }
    }

    /// Adds an upstream link, ignoring repeats.
    pub fn with_upstream(mut self, upstream: ReachId) -> Self {
        if !self.upstream.contains(&upstream) {
            self.upstream.push(upstream);
        }
        self
    }

    /// Sets the directed endpoint nodes.
    pub fn with_nodes(mut self, from: NodeId, to: NodeId) -> Self {
        self.from_node = Some(from);
        self.to_node = Some(to);
        self
    }

    /// Geometry usable by geometric detectors: present and non-degenerate.
    pub fn valid_geometry(&self) -> Option<&Polyline> {
        self.geometry.as_ref().filter(|g| !g.is_degenerate())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(ReachId::new(0), Err(TopologyError::InvalidReachId));
        assert_eq!(ReachId::from_link(0), None);
    }

    #[test]
    fn debug_and_display() {
        let r = ReachId::new(7).unwrap();
        assert_eq!(format!("{:?}", r), "ReachId(7)");
        assert_eq!(format!("{}", r), "7");
    }

    #[test]
    fn serde_uses_raw_integer() {
        let r = ReachId::new(1135).unwrap();
        assert_eq!(serde_json::to_string(&r).unwrap(), "1135");
        let back: ReachId = serde_json::from_str("1135").unwrap();
        assert_eq!(back, r);
        assert!(serde_json::from_str::<ReachId>("0").is_err());
    }

    #[test]
    fn upstream_links_are_deduplicated() {
        let id = ReachId::new(1).unwrap();
        let up = ReachId::new(2).unwrap();
        let reach = Reach::new(id, Polyline::from_xy(&[(0.0, 0.0), (1.0, 0.0)]))
            .with_upstream(up)
            .with_upstream(up);
        assert_eq!(reach.upstream, vec![up]);
    }
}

//! Detector findings and the reducer that merges them into error codes.
//!
//! Detectors never write codes themselves. Each returns a sparse
//! [`Findings`] set (`reach_id -> proposed code`), and [`reduce`] folds the
//! sets over the initial code table in detector order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::engine::GeometryEngine;
use crate::topology::error_codes::ErrorCodes;
use crate::topology::error_kind::ErrorKind;
use crate::topology::network::Network;
use crate::topology::reach::ReachId;
use crate::topology_error::TopologyError;

/// The detectors, in the order a run applies them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DetectorKind {
    Dangle,
    Braid,
    Duplicate,
    ReachPair,
    FlowDirection,
}

impl DetectorKind {
    pub const ORDER: [DetectorKind; 5] = [
        DetectorKind::Dangle,
        DetectorKind::Braid,
        DetectorKind::Duplicate,
        DetectorKind::ReachPair,
        DetectorKind::FlowDirection,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            DetectorKind::Dangle => "dangles",
            DetectorKind::Braid => "braids",
            DetectorKind::Duplicate => "duplicate reaches",
            DetectorKind::ReachPair => "overlap/crossing errors",
            DetectorKind::FlowDirection => "flow direction",
        }
    }

    /// Whether [`MergePolicy::Legacy`] lets this detector replace a code set
    /// by an earlier detector. The reach-pair check only ever fills clean
    /// reaches.
    pub const fn overwrites_in_legacy(self) -> bool {
        !matches!(self, DetectorKind::ReachPair)
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How findings of later detectors interact with codes already set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The first detector to flag a reach decides its code.
    #[default]
    FirstFinding,
    /// Dangle, braid, duplicate and flow-direction codes replace earlier
    /// codes; reach-pair codes only fill clean reaches.
    Legacy,
}

/// Sparse set of proposed codes from one detector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Findings {
    detector: DetectorKind,
    proposals: BTreeMap<ReachId, ErrorKind>,
}

impl Findings {
    pub fn new(detector: DetectorKind) -> Self {
        Self {
            detector,
            proposals: BTreeMap::new(),
        }
    }

    pub fn detector(&self) -> DetectorKind {
        self.detector
    }

    /// Propose `kind` for `id`. The first proposal for a reach stands;
    /// `NoError` is never recorded. Returns whether the proposal was taken.
    pub fn propose(&mut self, id: ReachId, kind: ErrorKind) -> bool {
        if !kind.is_error() || self.proposals.contains_key(&id) {
            return false;
        }
        self.proposals.insert(id, kind);
        true
    }

    pub fn get(&self, id: ReachId) -> Option<ErrorKind> {
        self.proposals.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Proposals ordered by reach id.
    pub fn iter(&self) -> impl Iterator<Item = (ReachId, ErrorKind)> + '_ {
        self.proposals.iter().map(|(&id, &kind)| (id, kind))
    }
}

/// One topology check over a whole network.
pub trait Detector: Send + Sync {
    fn kind(&self) -> DetectorKind;

    /// Evaluate the check. Malformed reaches are skipped, not reported as
    /// errors; only fatal conditions return `Err`.
    fn detect(
        &self,
        network: &Network,
        engine: &dyn GeometryEngine,
    ) -> Result<Findings, TopologyError>;
}

/// Fold `findings` over `codes` in iteration order.
pub fn reduce<I>(mut codes: ErrorCodes, findings: I, policy: MergePolicy) -> ErrorCodes
where
    I: IntoIterator<Item = Findings>,
{
    for set in findings {
        let overwrite = policy == MergePolicy::Legacy && set.detector().overwrites_in_legacy();
        let applied = set
            .iter()
            .filter(|&(id, kind)| codes.assign(id, kind, overwrite))
            .count();
        log::debug!(
            "{}: {} findings, {} applied",
            set.detector(),
            set.len(),
            applied
        );
    }
    crate::debug_invariants!(&codes, "reduced error codes");
    codes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polyline::Polyline;
    use crate::topology::reach::Reach;

    fn rid(raw: u64) -> ReachId {
        ReachId::new(raw).unwrap()
    }

    fn network(n: u64) -> Network {
        let line = Polyline::from_xy(&[(0.0, 0.0), (1.0, 0.0)]);
        Network::new((1..=n).map(|i| Reach::new(rid(i), line.clone())).collect()).unwrap()
    }

    fn findings(detector: DetectorKind, items: &[(u64, ErrorKind)]) -> Findings {
        let mut f = Findings::new(detector);
        for &(id, kind) in items {
            f.propose(rid(id), kind);
        }
        f
    }

    #[test]
    fn first_proposal_per_reach_stands() {
        let mut f = Findings::new(DetectorKind::ReachPair);
        assert!(f.propose(rid(1), ErrorKind::Cross));
        assert!(!f.propose(rid(1), ErrorKind::Overlap));
        assert!(!f.propose(rid(2), ErrorKind::NoError));
        assert_eq!(f.get(rid(1)), Some(ErrorKind::Cross));
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn first_finding_policy_keeps_earliest_detector() {
        let net = network(3);
        let codes = reduce(
            ErrorCodes::new(&net),
            vec![
                findings(DetectorKind::Dangle, &[(1, ErrorKind::Dangle)]),
                findings(DetectorKind::Braid, &[(1, ErrorKind::Braid), (2, ErrorKind::Braid)]),
                findings(DetectorKind::FlowDirection, &[(2, ErrorKind::FlippedFlow)]),
            ],
            MergePolicy::FirstFinding,
        );
        assert_eq!(codes.get(rid(1)), Some(ErrorKind::Dangle));
        assert_eq!(codes.get(rid(2)), Some(ErrorKind::Braid));
        assert_eq!(codes.get(rid(3)), Some(ErrorKind::NoError));
    }

    #[test]
    fn legacy_policy_lets_later_detectors_overwrite() {
        let net = network(2);
        let codes = reduce(
            ErrorCodes::new(&net),
            vec![
                findings(DetectorKind::Dangle, &[(1, ErrorKind::Dangle), (2, ErrorKind::Dangle)]),
                findings(DetectorKind::Duplicate, &[(1, ErrorKind::Duplicate)]),
                findings(DetectorKind::ReachPair, &[(2, ErrorKind::Overlap)]),
            ],
            MergePolicy::Legacy,
        );
        assert_eq!(codes.get(rid(1)), Some(ErrorKind::Duplicate));
        assert_eq!(codes.get(rid(2)), Some(ErrorKind::Dangle));
    }

    #[test]
    fn order_is_fixed() {
        let mut sorted = DetectorKind::ORDER;
        sorted.sort();
        assert_eq!(sorted, DetectorKind::ORDER);
        assert_eq!(DetectorKind::ORDER[0], DetectorKind::Dangle);
        assert_eq!(DetectorKind::ORDER[4], DetectorKind::FlowDirection);
    }
}

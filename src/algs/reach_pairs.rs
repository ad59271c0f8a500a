//! Relational checks between a reach and its upstream partners.
//!
//! For each reach with upstream links, a subset `{reach, upstream...}` is
//! selected (`"ReachID" = a OR "ReachID" = b`) and the predicates in
//! [`PAIR_CHECKS`] are tried in order. The first predicate that holds decides
//! the code; when none holds, nothing is proposed.
//!
//! Subsets are visited breadth-first upstream from the outflow reach, so
//! [`Findings`] keeps the proposal of the first subset touching a reach.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::findings::{Detector, DetectorKind, Findings};
use super::map_in_order;
use crate::geometry::engine::GeometryEngine;
use crate::geometry::polyline::Polyline;
use crate::topology::error_kind::ErrorKind;
use crate::topology::network::{Network, Subset};
use crate::topology::query::Filter;
use crate::topology::reach::ReachId;
use crate::topology_error::TopologyError;

type Predicate = fn(&dyn GeometryEngine, &Polyline, &Polyline) -> bool;

/// Predicates in priority order.
pub const PAIR_CHECKS: [(ErrorKind, Predicate); 3] = [
    (ErrorKind::Overlap, |e, a, b| e.overlaps(a, b)),
    (ErrorKind::Cross, |e, a, b| e.crosses(a, b)),
    (ErrorKind::Disconnected, |e, a, b| e.disjoint(a, b)),
];

/// Which reaches form one subset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairGrouping {
    /// One subset `{reach, upstream}` per upstream link.
    #[default]
    PerUpstream,
    /// One subset of the reach with all of its upstream partners.
    Confluence,
}

/// How the pairs of a subset are tested against a predicate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairEvaluation {
    /// Only the first pair, in table order, is tested.
    #[default]
    FirstPairOnly,
    /// The predicate holds if it holds for any pair.
    AnyPair,
}

/// Which reaches of a subset receive the code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairTarget {
    /// Only the downstream reach the subset was built for.
    #[default]
    Primary,
    /// Every reach in the subset.
    Subset,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReachPairDetector {
    pub outflow: Option<ReachId>,
    pub grouping: PairGrouping,
    pub evaluation: PairEvaluation,
    pub target: PairTarget,
}

/// Evaluate one predicate over the geometries of a subset.
pub fn evaluate_subset(
    engine: &dyn GeometryEngine,
    geometries: &[&Polyline],
    predicate: Predicate,
    evaluation: PairEvaluation,
) -> bool {
    let mut pairs = geometries.iter().tuple_combinations::<(_, _)>();
    match evaluation {
        PairEvaluation::FirstPairOnly => pairs.next().is_some_and(|(a, b)| predicate(engine, a, b)),
        PairEvaluation::AnyPair => pairs.any(|(a, b)| predicate(engine, a, b)),
    }
}

/// The first error kind of [`PAIR_CHECKS`] that holds for the subset.
pub fn classify_subset(
    engine: &dyn GeometryEngine,
    geometries: &[&Polyline],
    evaluation: PairEvaluation,
) -> Option<ErrorKind> {
    PAIR_CHECKS
        .iter()
        .find(|(_, predicate)| evaluate_subset(engine, geometries, *predicate, evaluation))
        .map(|&(kind, _)| kind)
}

impl ReachPairDetector {
    pub fn new(outflow: Option<ReachId>) -> Self {
        Self {
            outflow,
            ..Self::default()
        }
    }

    pub fn with_grouping(mut self, grouping: PairGrouping) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_evaluation(mut self, evaluation: PairEvaluation) -> Self {
        self.evaluation = evaluation;
        self
    }

    pub fn with_target(mut self, target: PairTarget) -> Self {
        self.target = target;
        self
    }

    /// Id groups of the subsets built for `id`.
    fn groups(&self, network: &Network, id: ReachId) -> Vec<Vec<ReachId>> {
        let Some(reach) = network.get(id) else {
            return Vec::new();
        };
        let upstream: Vec<ReachId> = network.upstream_of(reach).map(|r| r.id).collect();
        if upstream.is_empty() {
            return Vec::new();
        }
        match self.grouping {
            PairGrouping::PerUpstream => upstream.into_iter().map(|up| vec![id, up]).collect(),
            PairGrouping::Confluence => {
                vec![std::iter::once(id).chain(upstream).collect()]
            }
        }
    }

    /// Proposals for the subsets of one reach, in subset order.
    fn check_reach(
        &self,
        network: &Network,
        engine: &dyn GeometryEngine,
        id: ReachId,
    ) -> Vec<(ReachId, ErrorKind)> {
        let mut out = Vec::new();
        for ids in self.groups(network, id) {
            // same rows as `network.select(&filter, ..)`, resolved by index
            let subset: Subset<'_> = network.subset(&ids);
            let geometries = subset.geometries();
            if geometries.len() < 2 {
                log::debug!(
                    "subset {}: fewer than two usable geometries, skipped",
                    Filter::reach_in(&ids)
                );
                continue;
            }
            let Some(kind) = classify_subset(engine, &geometries, self.evaluation) else {
                continue;
            };
            match self.target {
                PairTarget::Primary => out.push((id, kind)),
                PairTarget::Subset => out.extend(subset.iter().map(|r| (r.id, kind))),
            }
        }
        out
    }
}

impl Detector for ReachPairDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::ReachPair
    }

    fn detect(
        &self,
        network: &Network,
        engine: &dyn GeometryEngine,
    ) -> Result<Findings, TopologyError> {
        let order = network.traversal_order(self.outflow)?;
        let per_reach = map_in_order(&order, |&id| self.check_reach(network, engine, id));
        let mut findings = Findings::new(self.kind());
        for (id, kind) in per_reach.into_iter().flatten() {
            findings.propose(id, kind);
        }
        Ok(findings)
    }
}

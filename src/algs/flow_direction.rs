//! Flow-direction consistency against the directed node graph.
//!
//! Along a correctly digitised chain a reach starts where its upstream
//! partner ends: `R.from_node == U.to_node`. A reach that instead starts at
//! its partner's start node (`R.from_node == U.from_node`) runs against the
//! flow. Partner nodes are resolved through [`Network::node_index`].
//!
//! [`FlowRule::ReachIdGuard`] additionally skips a reach whose own id equals
//! the partner's `FROM_NODE`, for tables that number nodes after the reach
//! draining them. [`FlowRule::NodeChain`] instead skips a reach that also
//! starts at the partner's end node.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::findings::{Detector, DetectorKind, Findings};
use super::map_in_order;
use crate::geometry::engine::GeometryEngine;
use crate::topology::error_kind::ErrorKind;
use crate::topology::network::Network;
use crate::topology::reach::{NodeId, Reach, ReachId};
use crate::topology_error::TopologyError;

/// Which guard accompanies the shared-start-node test.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRule {
    /// `reach_id != U.from_node && R.from_node == U.from_node`.
    #[default]
    ReachIdGuard,
    /// `R.from_node == U.from_node && R.from_node != U.to_node`.
    NodeChain,
}

impl FlowRule {
    /// `true` when `reach` (starting at `reach_from`) runs against an
    /// upstream partner with nodes `upstream_from -> upstream_to`.
    pub fn is_flipped(
        self,
        reach: ReachId,
        reach_from: NodeId,
        upstream_from: NodeId,
        upstream_to: Option<NodeId>,
    ) -> bool {
        if reach_from != upstream_from {
            return false;
        }
        match self {
            FlowRule::ReachIdGuard => reach.get() != upstream_from.0,
            FlowRule::NodeChain => upstream_to != Some(reach_from),
        }
    }
}

type NodeIndex = HashMap<ReachId, (Option<NodeId>, Option<NodeId>)>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlowDirectionDetector {
    pub rule: FlowRule,
}

impl FlowDirectionDetector {
    pub fn new(rule: FlowRule) -> Self {
        Self { rule }
    }

    fn check_reach(&self, nodes: &NodeIndex, reach: &Reach) -> bool {
        if reach.upstream.is_empty() {
            return false;
        }
        let Some(from) = reach.from_node else {
            log::debug!("reach {}: no FROM_NODE, flow direction not checked", reach.id);
            return false;
        };
        reach
            .upstream
            .iter()
            .filter(|&&up| up != reach.id)
            .any(|up| match nodes.get(up) {
                Some((Some(up_from), up_to)) => {
                    self.rule.is_flipped(reach.id, from, *up_from, *up_to)
                }
                Some((None, _)) => {
                    log::debug!("reach {up}: no FROM_NODE, flow direction not checked");
                    false
                }
                None => {
                    log::debug!("reach {}: upstream reach {up} not in network", reach.id);
                    false
                }
            })
    }
}

impl Detector for FlowDirectionDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::FlowDirection
    }

    fn detect(
        &self,
        network: &Network,
        _engine: &dyn GeometryEngine,
    ) -> Result<Findings, TopologyError> {
        let nodes = network.node_index();
        let flipped = map_in_order(network.reaches(), |reach| {
            self.check_reach(&nodes, reach).then_some(reach.id)
        });
        let mut findings = Findings::new(self.kind());
        for id in flipped.into_iter().flatten() {
            findings.propose(id, ErrorKind::FlippedFlow);
        }
        Ok(findings)
    }
}

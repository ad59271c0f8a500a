//! End-to-end error detection over one network.
//!
//! A run starts with every reach at
//! [`ErrorKind::NoError`](crate::topology::error_kind::ErrorKind::NoError), evaluates the
//! detectors in [`DetectorKind::ORDER`] and folds their findings with the
//! configured [`MergePolicy`]. Nothing is written back to the network.
//!
//! ```rust
//! # use stream_topo::prelude::*;
//! # fn main() -> Result<(), TopologyError> {
//! let short = Reach::new(ReachId::new(1)?, Polyline::from_xy(&[(0.0, 0.0), (10.0, 0.0)]));
//! let network = Network::new(vec![short])?;
//! let report = find_errors(&network, &PlanarEngine::default(), ReachId::new(1)?, 30.0)?;
//! assert_eq!(report.get(ReachId::new(1)?), Some(ErrorKind::Dangle));
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use super::braids::BraidDetector;
use super::dangles::{DangleDetector, DangleRule};
use super::duplicates::{DuplicateDetector, DuplicateMatch};
use super::findings::{Detector, DetectorKind, Findings, MergePolicy, reduce};
use super::flow_direction::{FlowDirectionDetector, FlowRule};
use super::reach_pairs::{PairEvaluation, PairGrouping, PairTarget, ReachPairDetector};
use crate::geometry::engine::GeometryEngine;
use crate::report::ErrorReport;
use crate::topology::error_codes::ErrorCodes;
use crate::topology::network::Network;
use crate::topology::reach::ReachId;
use crate::topology_error::TopologyError;

/// Parameters of one detection run.
///
/// Every field has a default, so a partial JSON object is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindErrorsOptions {
    /// Outlet reach seeding the upstream traversal of reach-pair checks.
    pub outflow_id: Option<ReachId>,
    /// Dangles shorter than this (exclusive) are flagged.
    pub max_len: f64,
    pub dangle_rule: DangleRule,
    pub duplicate_match: DuplicateMatch,
    pub pair_grouping: PairGrouping,
    pub pair_evaluation: PairEvaluation,
    pub pair_target: PairTarget,
    pub flow_rule: FlowRule,
    pub merge_policy: MergePolicy,
}

impl Default for FindErrorsOptions {
    fn default() -> Self {
        Self {
            outflow_id: None,
            max_len: 30.0,
            dangle_rule: DangleRule::default(),
            duplicate_match: DuplicateMatch::default(),
            pair_grouping: PairGrouping::default(),
            pair_evaluation: PairEvaluation::default(),
            pair_target: PairTarget::default(),
            flow_rule: FlowRule::default(),
            merge_policy: MergePolicy::default(),
        }
    }
}

impl FindErrorsOptions {
    pub fn with_outflow(mut self, outflow: ReachId) -> Self {
        self.outflow_id = Some(outflow);
        self
    }

    pub fn with_max_len(mut self, max_len: f64) -> Self {
        self.max_len = max_len;
        self
    }

    /// Check the options against `network`.
    ///
    /// # Errors
    /// [`TopologyError::InvalidParameter`] for a bad `max_len`,
    /// [`TopologyError::UnknownOutflow`] for an outlet not in the network.
    pub fn validate(&self, network: &Network) -> Result<(), TopologyError> {
        DangleDetector::new(self.max_len, self.dangle_rule)?;
        match self.outflow_id {
            Some(id) if !network.contains(id) => Err(TopologyError::UnknownOutflow(id)),
            _ => Ok(()),
        }
    }

    /// The configured detectors in run order.
    pub fn detectors(&self) -> Result<Vec<Box<dyn Detector>>, TopologyError> {
        let detectors: Vec<Box<dyn Detector>> = vec![
            Box::new(DangleDetector::new(self.max_len, self.dangle_rule)?),
            Box::new(BraidDetector),
            Box::new(DuplicateDetector::new(self.duplicate_match)),
            Box::new(ReachPairDetector {
                outflow: self.outflow_id,
                grouping: self.pair_grouping,
                evaluation: self.pair_evaluation,
                target: self.pair_target,
            }),
            Box::new(FlowDirectionDetector::new(self.flow_rule)),
        ];
        debug_assert!(
            detectors
                .iter()
                .map(|d| d.kind())
                .eq(DetectorKind::ORDER.iter().copied())
        );
        Ok(detectors)
    }
}

/// Run every detector and collect its findings, in run order.
///
/// # Errors
/// The first fatal detector error; no partial result is returned.
pub fn run_detectors(
    network: &Network,
    engine: &dyn GeometryEngine,
    options: &FindErrorsOptions,
) -> Result<Vec<Findings>, TopologyError> {
    options.validate(network)?;
    options
        .detectors()?
        .iter()
        .map(|detector| {
            log::info!("Finding {}", detector.kind());
            let findings = detector.detect(network, engine)?;
            log::info!("{} reaches flagged by {}", findings.len(), detector.kind());
            Ok(findings)
        })
        .collect()
}

/// Error codes of every reach after a full run.
pub fn find_error_codes(
    network: &Network,
    engine: &dyn GeometryEngine,
    options: &FindErrorsOptions,
) -> Result<ErrorCodes, TopologyError> {
    let findings = run_detectors(network, engine, options)?;
    Ok(reduce(
        ErrorCodes::new(network),
        findings,
        options.merge_policy,
    ))
}

/// Full run with explicit options.
pub fn find_errors_with(
    network: &Network,
    engine: &dyn GeometryEngine,
    options: &FindErrorsOptions,
) -> Result<ErrorReport, TopologyError> {
    let codes = find_error_codes(network, engine, options)?;
    let report = ErrorReport::from_codes(&codes);
    log::info!(
        "{} of {} reaches have topology errors",
        report.len(),
        network.len()
    );
    Ok(report)
}

/// Full run with default options, seeded at `outflow_id`.
///
/// # Errors
/// [`TopologyError::UnknownOutflow`] if `outflow_id` is not in the network,
/// [`TopologyError::InvalidParameter`] for a bad `max_len`.
pub fn find_errors(
    network: &Network,
    engine: &dyn GeometryEngine,
    outflow_id: ReachId,
    max_len: f64,
) -> Result<ErrorReport, TopologyError> {
    let options = FindErrorsOptions::default()
        .with_outflow(outflow_id)
        .with_max_len(max_len);
    find_errors_with(network, engine, &options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::engine::PlanarEngine;
    use crate::geometry::polyline::Polyline;
    use crate::topology::reach::Reach;

    fn rid(raw: u64) -> ReachId {
        ReachId::new(raw).unwrap()
    }

    #[test]
    fn partial_json_options_use_defaults() {
        let opts: FindErrorsOptions =
            serde_json::from_str(r#"{ "outflow_id": 4, "pair_evaluation": "any_pair" }"#).unwrap();
        assert_eq!(opts.outflow_id, Some(rid(4)));
        assert_eq!(opts.max_len, 30.0);
        assert_eq!(opts.pair_evaluation, PairEvaluation::AnyPair);
        assert_eq!(opts.merge_policy, MergePolicy::FirstFinding);
        assert_eq!(opts.flow_rule, FlowRule::ReachIdGuard);
    }

    #[test]
    fn validation_rejects_bad_parameters() {
        let net = Network::new(vec![Reach::new(
            rid(1),
            Polyline::from_xy(&[(0.0, 0.0), (1.0, 0.0)]),
        )])
        .unwrap();
        let engine = PlanarEngine::default();
        assert_eq!(
            find_errors(&net, &engine, rid(2), 30.0).unwrap_err(),
            TopologyError::UnknownOutflow(rid(2))
        );
        assert!(matches!(
            find_errors(&net, &engine, rid(1), -1.0),
            Err(TopologyError::InvalidParameter(_))
        ));
    }

    #[test]
    fn detectors_follow_run_order() {
        let kinds: Vec<_> = FindErrorsOptions::default()
            .detectors()
            .unwrap()
            .iter()
            .map(|d| d.kind())
            .collect();
        assert_eq!(kinds, DetectorKind::ORDER);
    }
}

//! Duplicate detection.
//!
//! By default two reaches are duplicates when their lengths are the exact
//! same floating-point value. This misses shifted copies and catches
//! unrelated reaches of coincidentally equal length; [`DuplicateMatch::Geometry`]
//! compares the lines themselves instead.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::findings::{Detector, DetectorKind, Findings};
use crate::geometry::engine::GeometryEngine;
use crate::topology::error_kind::ErrorKind;
use crate::topology::network::Network;
use crate::topology_error::TopologyError;

/// How two reaches are recognised as duplicates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateMatch {
    /// Bit-identical lengths.
    #[default]
    Length,
    /// Equal point sets within the engine tolerance, in either direction.
    Geometry,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DuplicateDetector {
    pub matching: DuplicateMatch,
}

impl DuplicateDetector {
    pub fn new(matching: DuplicateMatch) -> Self {
        Self { matching }
    }
}

impl Detector for DuplicateDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Duplicate
    }

    fn detect(
        &self,
        network: &Network,
        engine: &dyn GeometryEngine,
    ) -> Result<Findings, TopologyError> {
        let mut findings = Findings::new(self.kind());
        let usable: Vec<_> = network
            .iter()
            .filter_map(|r| r.valid_geometry().map(|g| (r.id, g)))
            .collect();

        match self.matching {
            DuplicateMatch::Length => {
                let groups = usable
                    .iter()
                    .into_group_map_by(|&&(_, g)| engine.length(g).to_bits());
                for (_, group) in groups.into_iter().filter(|(_, g)| g.len() > 1) {
                    for &&(id, _) in &group {
                        findings.propose(id, ErrorKind::Duplicate);
                    }
                }
            }
            DuplicateMatch::Geometry => {
                for (&(a, ga), &(b, gb)) in usable.iter().tuple_combinations() {
                    if engine.equals(ga, gb) {
                        findings.propose(a, ErrorKind::Duplicate);
                        findings.propose(b, ErrorKind::Duplicate);
                    }
                }
            }
        }
        Ok(findings)
    }
}

//! Braid detection: reaches on the boundary of an enclosed polygon.
//!
//! All usable reach lines are polygonized together. A bounded face means a
//! closed alternate flow path, and every reach running along a face boundary
//! is part of the braid.

use super::findings::{Detector, DetectorKind, Findings};
use crate::geometry::engine::GeometryEngine;
use crate::geometry::grid::BoxIndex;
use crate::topology::error_kind::ErrorKind;
use crate::topology::network::Network;
use crate::topology_error::TopologyError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BraidDetector;

impl Detector for BraidDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Braid
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
        let lines: Vec<_> = usable.iter().map(|&(_, g)| g).collect();
        let polygons = engine.polygonize(&lines);
        log::debug!("{} enclosed polygons", polygons.len());
        if polygons.is_empty() {
            return Ok(findings);
        }

        let mut usable_boxes = Vec::with_capacity(usable.len());
        let mut with_box = Vec::with_capacity(usable.len());
        for &(id, line) in &usable {
            if let Some(bbox) = line.bbox() {
                usable_boxes.push(bbox);
                with_box.push((id, line));
            }
        }
        let index = BoxIndex::new(usable_boxes, engine.tolerance());
        for polygon in &polygons {
            let Some(pbox) = polygon.boundary().bbox() else { continue };
            for i in index.query_box(&pbox) {
                let (id, line) = with_box[i];
                if findings.get(id).is_none() && engine.shares_segment(line, polygon) {
                    findings.propose(id, ErrorKind::Braid);
                }
            }
        }
        Ok(findings)
    }
}

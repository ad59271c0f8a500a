//! Dangle detection: short reaches ending in an unconnected endpoint.
//!
//! A dangle point is a reach endpoint whose incidence in the endpoint graph
//! is exactly one. Endpoints within the engine tolerance of each other are
//! welded into one node, so a closed reach puts two incidences on its single
//! endpoint and never dangles by itself. Every reach that touches a dangle point and is
//! shorter than `max_len` (exclusive) is flagged once.

use serde::{Deserialize, Serialize};

use super::findings::{Detector, DetectorKind, Findings};
use super::map_in_order;
use crate::geometry::engine::{GeometryEngine, VertexSelection};
use crate::geometry::grid::{BoxIndex, SnapGrid};
use crate::geometry::polyline::{Bbox, Coord, Polyline};
use crate::topology::error_kind::ErrorKind;
use crate::topology::network::Network;
use crate::topology::query::{Field, Filter};
use crate::topology::reach::ReachId;
use crate::topology_error::TopologyError;

/// What makes an endpoint a dangle point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangleRule {
    /// Incidence one among reach endpoints.
    #[default]
    EndpointsOnly,
    /// Incidence one, and no other reach passes through the point anywhere
    /// along its length.
    AlongLine,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DangleDetector {
    max_len: f64,
    rule: DangleRule,
}

#[derive(Clone, Copy, Debug)]
struct Endpoint {
    owner: ReachId,
    incidence: usize,
}

impl DangleDetector {
    /// # Errors
    /// [`TopologyError::InvalidParameter`] unless `max_len` is positive and
    /// not NaN.
    pub fn new(max_len: f64, rule: DangleRule) -> Result<Self, TopologyError> {
        if max_len.is_nan() || max_len <= 0.0 {
            return Err(TopologyError::InvalidParameter(format!(
                "max_len must be positive, got {max_len}"
            )));
        }
        Ok(Self { max_len, rule })
    }

    pub fn max_len(&self) -> f64 {
        self.max_len
    }

    pub fn rule(&self) -> DangleRule {
        self.rule
    }

    /// The length filter applied to candidate reaches.
    pub fn length_filter(&self) -> Filter {
        Filter::less_than(Field::Length, self.max_len)
    }

    /// Dangle points of `network`, in order of first appearance.
    pub fn dangle_points(&self, network: &Network, engine: &dyn GeometryEngine) -> Vec<Coord> {
        let mut nodes = SnapGrid::new(engine.tolerance());
        let mut endpoints: Vec<Endpoint> = Vec::new();

        for reach in network.iter() {
            let Some(line) = reach.valid_geometry() else {
                log::debug!("reach {}: no usable geometry, skipped for dangles", reach.id);
                continue;
            };
            for point in engine.vertices_to_points(line, VertexSelection::BothEnds) {
                let slot = nodes.insert(point);
                if slot == endpoints.len() {
                    endpoints.push(Endpoint {
                        owner: reach.id,
                        incidence: 0,
                    });
                }
                endpoints[slot].incidence += 1;
            }
        }

        let lonely = nodes
            .points()
            .iter()
            .zip(&endpoints)
            .filter(|(_, e)| e.incidence == 1);
        match self.rule {
            DangleRule::EndpointsOnly => lonely.map(|(&p, _)| p).collect(),
            DangleRule::AlongLine => {
                let lines: Vec<_> = network
                    .iter()
                    .filter_map(|r| r.valid_geometry().map(|g| (r.id, g)))
                    .collect();
                let index =
                    BoxIndex::new(line_boxes(lines.iter().map(|&(_, g)| g)), engine.tolerance());
                lonely
                    .filter(|&(&p, e)| {
                        !index.query_point(p).into_iter().any(|i| {
                            let (id, line) = lines[i];
                            id != e.owner && engine.intersects_point(line, p)
                        })
                    })
                    .map(|(&p, _)| p)
                    .collect()
            }
        }
    }
}

/// One box per line; an empty line gets a NaN box that matches nothing.
fn line_boxes<'a>(lines: impl Iterator<Item = &'a Polyline>) -> Vec<Bbox> {
    let nowhere = Coord::new(f64::NAN, f64::NAN);
    lines
        .map(|line| {
            line.bbox().unwrap_or(Bbox {
                min: nowhere,
                max: nowhere,
            })
        })
        .collect()
}

impl Default for DangleDetector {
    fn default() -> Self {
        Self {
            max_len: 30.0,
            rule: DangleRule::default(),
        }
    }
}

impl Detector for DangleDetector {
    fn kind(&self) -> DetectorKind {
        DetectorKind::Dangle
    }

    fn detect(
        &self,
        network: &Network,
        engine: &dyn GeometryEngine,
    ) -> Result<Findings, TopologyError> {
        let mut findings = Findings::new(self.kind());
        let points = self.dangle_points(network, engine);
        if points.is_empty() {
            return Ok(findings);
        }
        log::debug!("{} dangle points", points.len());

        let candidates: Vec<_> = network
            .select(&self.length_filter(), engine, None)
            .iter()
            .filter_map(|reach| reach.valid_geometry().map(|g| (reach.id, g)))
            .collect();
        let index = BoxIndex::new(
            line_boxes(candidates.iter().map(|&(_, g)| g)),
            engine.tolerance(),
        );
        let touched = map_in_order(&points, |&p| {
            index
                .query_point(p)
                .into_iter()
                .filter(|&i| engine.intersects_point(candidates[i].1, p))
                .map(|i| candidates[i].0)
                .collect::<Vec<_>>()
        });
        for id in touched.into_iter().flatten() {
            findings.propose(id, ErrorKind::Dangle);
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::engine::PlanarEngine;
    use crate::geometry::polyline::Polyline;
    use crate::topology::reach::Reach;

    fn reach(id: u64, pts: &[(f64, f64)]) -> Reach {
        Reach::new(ReachId::new(id).unwrap(), Polyline::from_xy(pts))
    }

    #[test]
    fn rejects_bad_threshold() {
        assert!(DangleDetector::new(0.0, DangleRule::EndpointsOnly).is_err());
        assert!(DangleDetector::new(f64::NAN, DangleRule::EndpointsOnly).is_err());
        assert!(DangleDetector::new(f64::INFINITY, DangleRule::EndpointsOnly).is_ok());
    }

    #[test]
    fn shared_endpoints_are_not_dangle_points() {
        let net = Network::new(vec![
            reach(1, &[(0.0, 0.0), (100.0, 0.0)]),
            reach(2, &[(100.0, 0.0), (200.0, 0.0)]),
        ])
        .unwrap();
        let points = DangleDetector::default().dangle_points(&net, &PlanarEngine::default());
        assert_eq!(points, vec![Coord::new(0.0, 0.0), Coord::new(200.0, 0.0)]);
    }

    #[test]
    fn endpoints_within_tolerance_are_one_node() {
        // the two ends meet 0.4 units apart, on either side of a grid line
        let engine = PlanarEngine::new(1.0).unwrap();
        let net = Network::new(vec![
            reach(1, &[(-50.0, 0.0), (0.8, 0.0)]),
            reach(2, &[(1.2, 0.0), (60.0, 0.0)]),
        ])
        .unwrap();
        let points = DangleDetector::default().dangle_points(&net, &engine);
        assert_eq!(points, vec![Coord::new(-50.0, 0.0), Coord::new(60.0, 0.0)]);
    }

    #[test]
    fn only_touched_short_reaches_are_flagged_in_a_long_row() {
        // isolated 10-unit stubs alternate with 100-unit reaches sharing ends
        let mut reaches = Vec::new();
        for i in 0..200u64 {
            let x = i as f64 * 1000.0;
            reaches.push(reach(2 * i + 1, &[(x, 0.0), (x + 100.0, 0.0)]));
            reaches.push(reach(2 * i + 2, &[(x + 100.0, 0.0), (x + 100.0, 10.0)]));
        }
        let net = Network::new(reaches).unwrap();
        let findings = DangleDetector::default()
            .detect(&net, &PlanarEngine::default())
            .unwrap();
        assert_eq!(findings.len(), 200);
        assert!(findings.iter().all(|(id, _)| id.get() % 2 == 0));
    }

    #[test]
    fn closed_reach_does_not_dangle() {
        let net = Network::new(vec![reach(
            1,
            &[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 0.0)],
        )])
        .unwrap();
        let findings = DangleDetector::default()
            .detect(&net, &PlanarEngine::default())
            .unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn along_line_rule_ignores_t_junctions() {
        // reach 2 ends on the interior of reach 1
        let net = Network::new(vec![
            reach(1, &[(0.0, 0.0), (100.0, 0.0)]),
            reach(2, &[(50.0, 10.0), (50.0, 0.0)]),
        ])
        .unwrap();
        let engine = PlanarEngine::default();
        let endpoints = DangleDetector::new(30.0, DangleRule::EndpointsOnly).unwrap();
        let along = DangleDetector::new(30.0, DangleRule::AlongLine).unwrap();
        assert_eq!(endpoints.dangle_points(&net, &engine).len(), 4);
        assert_eq!(along.dangle_points(&net, &engine).len(), 3);
    }

    #[test]
    fn threshold_is_exclusive() {
        let net = Network::new(vec![
            reach(1, &[(0.0, 0.0), (30.0, 0.0)]),
            reach(2, &[(0.0, 10.0), (29.5, 10.0)]),
        ])
        .unwrap();
        let findings = DangleDetector::default()
            .detect(&net, &PlanarEngine::default())
            .unwrap();
        assert_eq!(findings.get(ReachId::new(1).unwrap()), None);
        assert_eq!(findings.get(ReachId::new(2).unwrap()), Some(ErrorKind::Dangle));
    }
}

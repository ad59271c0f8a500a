//! The geometry predicate adapter.
//!
//! Detectors never touch coordinates directly; they ask a [`GeometryEngine`]
//! for lengths, spatial predicates and polygon construction. Any GIS backend
//! can sit behind the trait. [`PlanarEngine`] is the built-in implementation
//! for planar (projected) coordinates.
//!
//! # Predicate semantics
//! Predicates follow the usual line/line DE-9IM reading:
//! - `overlaps`: the lines share a stretch of non-zero length and neither is
//!   contained in the other.
//! - `crosses`: the interiors meet, only in isolated points. Endpoints of an
//!   open line are its boundary, so meeting at an endpoint is not a crossing.
//! - `disjoint`: no point in common at all.
//!
//! A degenerate line (no segment of non-zero length) stands in no relation to
//! anything: every predicate involving it returns `false`.

use super::polygonize::{Polygon, polygonize};
use super::polyline::{Coord, Polyline};
use super::segment::{SegmentIntersection, intersect_segments, param_on, point_segment_distance};
use crate::topology_error::TopologyError;

/// Default coordinate tolerance in network units.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Which vertices [`GeometryEngine::vertices_to_points`] extracts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexSelection {
    All,
    Start,
    End,
    BothEnds,
}

/// Narrow interface over a geometry engine.
pub trait GeometryEngine: Send + Sync {
    /// Distance within which two coordinates are the same point.
    fn tolerance(&self) -> f64;

    /// Length of a line; `0.0` for degenerate lines.
    fn length(&self, line: &Polyline) -> f64;

    fn overlaps(&self, a: &Polyline, b: &Polyline) -> bool;

    fn crosses(&self, a: &Polyline, b: &Polyline) -> bool;

    fn disjoint(&self, a: &Polyline, b: &Polyline) -> bool;

    /// Same point set, regardless of vertex order or direction.
    fn equals(&self, a: &Polyline, b: &Polyline) -> bool;

    /// `point` lies on the line.
    fn intersects_point(&self, line: &Polyline, point: Coord) -> bool;

    /// `line` has a stretch of non-zero length on the polygon boundary.
    fn shares_segment(&self, line: &Polyline, polygon: &Polygon) -> bool;

    /// Bounded polygons enclosed by the planar arrangement of `lines`.
    fn polygonize(&self, lines: &[&Polyline]) -> Vec<Polygon>;

    fn vertices_to_points(&self, line: &Polyline, selection: VertexSelection) -> Vec<Coord> {
        match selection {
            VertexSelection::All => line.coords().to_vec(),
            VertexSelection::Start => line.start().into_iter().collect(),
            VertexSelection::End => line.end().into_iter().collect(),
            VertexSelection::BothEnds => line.start().into_iter().chain(line.end()).collect(),
        }
    }
}

/// Built-in engine for projected planar coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarEngine {
    tolerance: f64,
}

impl Default for PlanarEngine {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl PlanarEngine {
    /// Engine with a custom coordinate tolerance.
    pub fn new(tolerance: f64) -> Result<Self, TopologyError> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(TopologyError::InvalidParameter(format!(
                "tolerance must be positive and finite, got {tolerance}"
            )));
        }
        Ok(Self { tolerance })
    }

    /// Length of `a` that lies on `b`.
    fn shared_length(&self, a: &Polyline, b: &Polyline) -> f64 {
        let tol = self.tolerance;
        let mut total = 0.0;
        for (a0, a1) in a.segments() {
            let mut spans: Vec<(f64, f64)> = b
                .segments()
                .filter_map(|(b0, b1)| match intersect_segments(a0, a1, b0, b1, tol) {
                    SegmentIntersection::Collinear(c0, c1) => {
                        let t0 = param_on(a0, a1, c0).clamp(0.0, 1.0);
                        let t1 = param_on(a0, a1, c1).clamp(0.0, 1.0);
                        Some((t0.min(t1), t0.max(t1)))
                    }
                    _ => None,
                })
                .collect();
            if spans.is_empty() {
                continue;
            }
            spans.sort_by(|x, y| x.0.total_cmp(&y.0));
            let mut covered = 0.0;
            let (mut lo, mut hi) = spans[0];
            for &(s, e) in &spans[1..] {
                if s > hi {
                    covered += hi - lo;
                    lo = s;
                    hi = e;
                } else {
                    hi = hi.max(e);
                }
            }
            covered += hi - lo;
            total += covered * a0.distance(a1);
        }
        total
    }

    /// A point is interior to an open line unless it is one of its endpoints.
    fn is_interior(&self, line: &Polyline, p: Coord) -> bool {
        if line.is_closed(self.tolerance) {
            return true;
        }
        let near = |q: Option<Coord>| q.is_some_and(|q| q.distance(p) <= self.tolerance);
        !near(line.start()) && !near(line.end())
    }

    fn either_degenerate(a: &Polyline, b: &Polyline) -> bool {
        a.is_degenerate() || b.is_degenerate()
    }
}

impl GeometryEngine for PlanarEngine {
    fn tolerance(&self) -> f64 {
        self.tolerance
    }

    fn length(&self, line: &Polyline) -> f64 {
        if line.is_degenerate() {
            return 0.0;
        }
        line.euclidean_length()
    }

    fn overlaps(&self, a: &Polyline, b: &Polyline) -> bool {
        if Self::either_degenerate(a, b) {
            return false;
        }
        let tol = self.tolerance;
        let shared_a = self.shared_length(a, b);
        let shared_b = self.shared_length(b, a);
        shared_a > tol
            && shared_b > tol
            && self.length(a) - shared_a > tol
            && self.length(b) - shared_b > tol
    }

    fn crosses(&self, a: &Polyline, b: &Polyline) -> bool {
        if Self::either_degenerate(a, b) {
            return false;
        }
        if self.shared_length(a, b) > self.tolerance {
            return false;
        }
        a.segments().any(|(a0, a1)| {
            b.segments().any(|(b0, b1)| {
                match intersect_segments(a0, a1, b0, b1, self.tolerance) {
                    SegmentIntersection::Point(p) => self.is_interior(a, p) && self.is_interior(b, p),
                    _ => false,
                }
            })
        })
    }

    fn disjoint(&self, a: &Polyline, b: &Polyline) -> bool {
        if Self::either_degenerate(a, b) {
            return false;
        }
        if let (Some(ba), Some(bb)) = (a.bbox(), b.bbox()) {
            if !ba.intersects(&bb, self.tolerance) {
                return true;
            }
        }
        a.segments().all(|(a0, a1)| {
            b.segments().all(|(b0, b1)| {
                intersect_segments(a0, a1, b0, b1, self.tolerance) == SegmentIntersection::None
            })
        })
    }

    fn equals(&self, a: &Polyline, b: &Polyline) -> bool {
        if Self::either_degenerate(a, b) {
            return false;
        }
        let (len_a, len_b) = (self.length(a), self.length(b));
        let slack = |len: f64| self.tolerance.max(len * 1e-12);
        len_a - self.shared_length(a, b) <= slack(len_a)
            && len_b - self.shared_length(b, a) <= slack(len_b)
    }

    fn intersects_point(&self, line: &Polyline, point: Coord) -> bool {
        if line.is_degenerate() {
            return false;
        }
        line.segments()
            .any(|(a, b)| point_segment_distance(point, a, b) <= self.tolerance)
    }

    fn shares_segment(&self, line: &Polyline, polygon: &Polygon) -> bool {
        if line.is_degenerate() {
            return false;
        }
        self.shared_length(line, &polygon.boundary()) > self.tolerance
    }

    fn polygonize(&self, lines: &[&Polyline]) -> Vec<Polygon> {
        polygonize(lines, self.tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> Polyline {
        Polyline::from_xy(points)
    }

    #[test]
    fn partial_overlap() {
        let eng = PlanarEngine::default();
        let a = line(&[(0.0, 0.0), (20.0, 0.0)]);
        let b = line(&[(10.0, 0.0), (35.0, 0.0)]);
        assert!(eng.overlaps(&a, &b));
        assert!(!eng.crosses(&a, &b));
        assert!(!eng.disjoint(&a, &b));
    }

    #[test]
    fn containment_is_not_overlap() {
        let eng = PlanarEngine::default();
        let a = line(&[(0.0, 0.0), (20.0, 0.0)]);
        let b = line(&[(5.0, 0.0), (10.0, 0.0)]);
        assert!(!eng.overlaps(&a, &b));
        assert!(!eng.overlaps(&a, &a.clone()));
    }

    #[test]
    fn x_shape_crosses() {
        let eng = PlanarEngine::default();
        let a = line(&[(0.0, 0.0), (10.0, 10.0)]);
        let b = line(&[(0.0, 10.0), (10.0, 0.0)]);
        assert!(eng.crosses(&a, &b));
        assert!(!eng.overlaps(&a, &b));
    }

    #[test]
    fn shared_endpoint_is_not_a_crossing() {
        let eng = PlanarEngine::default();
        let down = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let up = line(&[(10.0, 0.0), (20.0, 5.0)]);
        assert!(!eng.crosses(&down, &up));
        assert!(!eng.disjoint(&down, &up));
    }

    #[test]
    fn t_junction_touches_without_crossing() {
        let eng = PlanarEngine::default();
        let main = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let trib = line(&[(5.0, 0.0), (5.0, 7.0)]);
        assert!(!eng.crosses(&main, &trib));
        assert!(eng.intersects_point(&main, Coord::new(5.0, 0.0)));
    }

    #[test]
    fn gap_is_disjoint() {
        let eng = PlanarEngine::default();
        let a = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let b = line(&[(10.5, 0.0), (20.0, 0.0)]);
        assert!(eng.disjoint(&a, &b));
    }

    #[test]
    fn equality_ignores_direction_and_vertex_split() {
        let eng = PlanarEngine::default();
        let a = line(&[(0.0, 0.0), (10.0, 0.0), (10.0, 5.0)]);
        let b = line(&[(10.0, 5.0), (10.0, 0.0), (4.0, 0.0), (0.0, 0.0)]);
        assert!(eng.equals(&a, &b));
        let c = line(&[(0.0, 0.0), (10.0, 0.0)]);
        assert!(!eng.equals(&a, &c));
    }

    #[test]
    fn degenerate_lines_have_no_relation() {
        let eng = PlanarEngine::default();
        let good = line(&[(0.0, 0.0), (10.0, 0.0)]);
        let bad = line(&[(50.0, 50.0)]);
        assert!(!eng.disjoint(&good, &bad));
        assert!(!eng.overlaps(&good, &bad));
        assert!(!eng.crosses(&bad, &good));
        assert_eq!(eng.length(&bad), 0.0);
    }

    #[test]
    fn vertex_selection() {
        let eng = PlanarEngine::default();
        let l = line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(eng.vertices_to_points(&l, VertexSelection::All).len(), 3);
        assert_eq!(
            eng.vertices_to_points(&l, VertexSelection::BothEnds),
            vec![Coord::new(0.0, 0.0), Coord::new(2.0, 0.0)]
        );
        assert_eq!(
            eng.vertices_to_points(&l, VertexSelection::End),
            vec![Coord::new(2.0, 0.0)]
        );
    }

    #[test]
    fn rejects_bad_tolerance() {
        assert!(PlanarEngine::new(0.0).is_err());
        assert!(PlanarEngine::new(f64::NAN).is_err());
        assert!(PlanarEngine::new(0.001).is_ok());
    }
}

//! Segment/segment and point/segment primitives.
//!
//! All tests are tolerance based: a point is "on" a line when its
//! perpendicular distance is at most `tol` (network units).

use super::polyline::{Bbox, Coord};

/// Result of intersecting two segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentIntersection {
    /// The segments have no point in common.
    None,
    /// The segments meet in a single point.
    Point(Coord),
    /// The segments are collinear and share a stretch of non-zero length.
    Collinear(Coord, Coord),
}

#[inline]
fn cross(o: Coord, a: Coord, b: Coord) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Side of `p` relative to the directed line `a -> b`: -1, 0 or 1.
#[inline]
fn side(a: Coord, b: Coord, p: Coord, tol: f64) -> i8 {
    let len = a.distance(b);
    let d = cross(a, b, p) / len;
    if d.abs() <= tol {
        0
    } else if d > 0.0 {
        1
    } else {
        -1
    }
}

/// Parameter of the projection of `p` onto segment `a -> b` (unclamped).
#[inline]
pub(crate) fn param_on(a: Coord, b: Coord, p: Coord) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    ((p.x - a.x) * dx + (p.y - a.y) * dy) / (dx * dx + dy * dy)
}

/// Shortest distance from `p` to segment `a -> b`.
pub fn point_segment_distance(p: Coord, a: Coord, b: Coord) -> f64 {
    if a == b {
        return p.distance(a);
    }
    let t = param_on(a, b, p).clamp(0.0, 1.0);
    p.distance(a.lerp(b, t))
}

/// Intersect segment `p0 -> p1` with segment `q0 -> q1`.
///
/// Both segments must have non-zero length.
pub fn intersect_segments(
    p0: Coord,
    p1: Coord,
    q0: Coord,
    q1: Coord,
    tol: f64,
) -> SegmentIntersection {
    if !Bbox::of_segment(p0, p1).intersects(&Bbox::of_segment(q0, q1), tol) {
        return SegmentIntersection::None;
    }

    let s1 = side(q0, q1, p0, tol);
    let s2 = side(q0, q1, p1, tol);
    let s3 = side(p0, p1, q0, tol);
    let s4 = side(p0, p1, q1, tol);

    if (s1 == 0 && s2 == 0) || (s3 == 0 && s4 == 0) {
        return collinear(p0, p1, q0, q1, tol);
    }
    if s1 * s2 > 0 || s3 * s4 > 0 {
        return SegmentIntersection::None;
    }
    let point = if s1 == 0 {
        p0
    } else if s2 == 0 {
        p1
    } else if s3 == 0 {
        q0
    } else if s4 == 0 {
        q1
    } else {
        let d1 = cross(q0, q1, p0);
        let d2 = cross(q0, q1, p1);
        p0.lerp(p1, d1 / (d1 - d2))
    };
    SegmentIntersection::Point(point)
}

fn collinear(p0: Coord, p1: Coord, q0: Coord, q1: Coord, tol: f64) -> SegmentIntersection {
    // project onto the longer segment for numerical stability
    let (a, b, c, d) = if p0.distance(p1) >= q0.distance(q1) {
        (p0, p1, q0, q1)
    } else {
        (q0, q1, p0, p1)
    };
    let len = a.distance(b);
    let tc = param_on(a, b, c);
    let td = param_on(a, b, d);
    let lo = tc.min(td).max(0.0);
    let hi = tc.max(td).min(1.0);
    let gap = (lo - hi) * len;
    if gap > tol {
        return SegmentIntersection::None;
    }
    if (hi - lo) * len <= tol {
        return SegmentIntersection::Point(a.lerp(b, (lo + hi) * 0.5));
    }
    SegmentIntersection::Collinear(a.lerp(b, lo), a.lerp(b, hi))
}

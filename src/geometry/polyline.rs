//! Planar coordinates and polylines.
//!
//! Reach geometry is a sequence of `(x, y)` vertices in the network's
//! coordinate reference system. Consecutive repeated vertices are tolerated
//! and ignored by [`Polyline::segments`].

use serde::{Deserialize, Serialize};

/// A 2-D coordinate. Serialized as `[x, y]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Coord) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    pub(crate) fn lerp(self, other: Coord, t: f64) -> Coord {
        Coord::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Coord {
    fn from([x, y]: [f64; 2]) -> Self {
        Coord::new(x, y)
    }
}

impl From<Coord> for [f64; 2] {
    fn from(c: Coord) -> Self {
        [c.x, c.y]
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Coord::new(x, y)
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bbox {
    pub min: Coord,
    pub max: Coord,
}

impl Bbox {
    pub(crate) fn of_segment(a: Coord, b: Coord) -> Self {
        Bbox {
            min: Coord::new(a.x.min(b.x), a.y.min(b.y)),
            max: Coord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// `true` when the boxes, each grown by `tol`, intersect.
    pub fn intersects(&self, other: &Bbox, tol: f64) -> bool {
        self.min.x <= other.max.x + tol
            && other.min.x <= self.max.x + tol
            && self.min.y <= other.max.y + tol
            && other.min.y <= self.max.y + tol
    }
}

/// An open or closed chain of line segments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    coords: Vec<Coord>,
}

impl Polyline {
    pub fn new(coords: Vec<Coord>) -> Self {
        Self { coords }
    }

    /// Convenience constructor from `(x, y)` tuples.
    pub fn from_xy(points: &[(f64, f64)]) -> Self {
        Self::new(points.iter().copied().map(Coord::from).collect())
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    pub fn start(&self) -> Option<Coord> {
        self.coords.first().copied()
    }

    pub fn end(&self) -> Option<Coord> {
        self.coords.last().copied()
    }

    /// Non-zero-length segments in vertex order.
    pub fn segments(&self) -> impl Iterator<Item = (Coord, Coord)> + '_ {
        self.coords
            .windows(2)
            .map(|w| (w[0], w[1]))
            .filter(|(a, b)| a != b)
    }

    /// Sum of segment lengths.
    pub fn euclidean_length(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance(b)).sum()
    }

    /// A polyline is degenerate when it has a non-finite vertex or no
    /// segment of non-zero length.
    pub fn is_degenerate(&self) -> bool {
        !self.coords.iter().all(|c| c.is_finite()) || self.segments().next().is_none()
    }

    /// First and last vertex coincide within `tol`.
    pub fn is_closed(&self, tol: f64) -> bool {
        match (self.start(), self.end()) {
            (Some(s), Some(e)) => self.coords.len() > 2 && s.distance(e) <= tol,
            _ => false,
        }
    }

    pub fn bbox(&self) -> Option<Bbox> {
        let first = *self.coords.first()?;
        let mut bbox = Bbox {
            min: first,
            max: first,
        };
        for c in &self.coords[1..] {
            bbox.min.x = bbox.min.x.min(c.x);
            bbox.min.y = bbox.min.y.min(c.y);
            bbox.max.x = bbox.max.x.max(c.x);
            bbox.max.y = bbox.max.y.max(c.y);
        }
        Some(bbox)
    }
}

impl From<Vec<Coord>> for Polyline {
    fn from(coords: Vec<Coord>) -> Self {
        Polyline::new(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_skips_repeated_vertices() {
        let line = Polyline::from_xy(&[(0.0, 0.0), (3.0, 0.0), (3.0, 0.0), (3.0, 4.0)]);
        assert_eq!(line.segments().count(), 2);
        assert_eq!(line.euclidean_length(), 7.0);
        assert!(!line.is_degenerate());
    }

    #[test]
    fn degenerate_lines() {
        assert!(Polyline::default().is_degenerate());
        assert!(Polyline::from_xy(&[(1.0, 1.0)]).is_degenerate());
        assert!(Polyline::from_xy(&[(1.0, 1.0), (1.0, 1.0)]).is_degenerate());
        assert!(Polyline::from_xy(&[(0.0, 0.0), (f64::NAN, 1.0)]).is_degenerate());
    }

    #[test]
    fn closed_ring() {
        let ring = Polyline::from_xy(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        assert!(ring.is_closed(1e-9));
        let open = Polyline::from_xy(&[(0.0, 0.0), (1.0, 0.0)]);
        assert!(!open.is_closed(1e-9));
    }

    #[test]
    fn serde_as_coordinate_arrays() {
        let line = Polyline::from_xy(&[(0.0, 1.5), (2.0, 3.0)]);
        let json = serde_json::to_string(&line).unwrap();
        assert_eq!(json, "[[0.0,1.5],[2.0,3.0]]");
        let back: Polyline = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }
}

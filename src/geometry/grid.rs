//! Spatial hashing for network-wide geometric searches.
//!
//! [`SnapGrid`] merges points that lie within the tolerance of an earlier
//! point, searching the neighbouring cells as well so two points on either
//! side of a cell boundary still merge. [`BoxIndex`] buckets bounding boxes
//! into a uniform grid so pair and point searches only compare boxes that
//! share a cell.

use hashbrown::HashMap as FastMap;

use super::polyline::{Bbox, Coord};

type CellKey = (i64, i64);

/// Boxes spanning more cells than this along an axis are kept out of the
/// buckets and compared against everything.
const MAX_SPAN: i64 = 64;

/// Point welding on a tolerance grid.
///
/// Each point joins the first earlier representative within `tol`; the
/// merge is not transitive beyond that representative.
#[derive(Clone, Debug)]
pub struct SnapGrid {
    tol: f64,
    cells: FastMap<CellKey, Vec<usize>>,
    points: Vec<Coord>,
}

impl SnapGrid {
    pub fn new(tol: f64) -> Self {
        Self {
            tol,
            cells: FastMap::new(),
            points: Vec::new(),
        }
    }

    /// Representatives in insertion order.
    pub fn points(&self) -> &[Coord] {
        &self.points
    }

    /// Index of the representative within `tol` of `p`, if any.
    pub fn find(&self, p: Coord) -> Option<usize> {
        let (cx, cy) = cell_of(p, self.tol);
        let mut best: Option<(f64, usize)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(bucket) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &idx in bucket {
                    let q = self.points[idx];
                    let d = (q.x - p.x).hypot(q.y - p.y);
                    let closer = match best {
                        None => true,
                        Some((bd, bi)) => d < bd || (d == bd && idx < bi),
                    };
                    if d <= self.tol && closer {
                        best = Some((d, idx));
                    }
                }
            }
        }
        best.map(|(_, idx)| idx)
    }

    /// Index of the representative of `p`, adding `p` when none is in range.
    pub fn insert(&mut self, p: Coord) -> usize {
        if let Some(idx) = self.find(p) {
            return idx;
        }
        let idx = self.points.len();
        self.points.push(p);
        self.cells.entry(cell_of(p, self.tol)).or_default().push(idx);
        idx
    }
}

fn cell_of(p: Coord, size: f64) -> CellKey {
    ((p.x / size).floor() as i64, (p.y / size).floor() as i64)
}

#[derive(Clone, Copy, Debug)]
struct CellRange {
    lo: CellKey,
    hi: CellKey,
}

/// Uniform grid over bounding boxes grown by a tolerance.
#[derive(Clone, Debug)]
pub struct BoxIndex {
    tol: f64,
    cell: f64,
    boxes: Vec<Bbox>,
    ranges: Vec<Option<CellRange>>,
    buckets: FastMap<CellKey, Vec<usize>>,
    oversized: Vec<usize>,
}

impl BoxIndex {
    /// Index `boxes`; item `i` of every query result refers to `boxes[i]`.
    ///
    /// The cell size is the median box extent, so a typical box covers a
    /// handful of cells.
    pub fn new(boxes: Vec<Bbox>, tol: f64) -> Self {
        let cell = cell_size(&boxes, tol);
        let mut index = Self {
            tol,
            cell,
            ranges: Vec::with_capacity(boxes.len()),
            buckets: FastMap::new(),
            oversized: Vec::new(),
            boxes: Vec::new(),
        };
        for (i, b) in boxes.iter().enumerate() {
            let range = index.range_of(b);
            if range.hi.0.saturating_sub(range.lo.0) > MAX_SPAN
                || range.hi.1.saturating_sub(range.lo.1) > MAX_SPAN
            {
                index.oversized.push(i);
                index.ranges.push(None);
                continue;
            }
            for x in range.lo.0..=range.hi.0 {
                for y in range.lo.1..=range.hi.1 {
                    index.buckets.entry((x, y)).or_default().push(i);
                }
            }
            index.ranges.push(Some(range));
        }
        index.boxes = boxes;
        log::trace!(
            "box index: {} boxes, {} cells of size {}, {} oversized",
            index.boxes.len(),
            index.buckets.len(),
            index.cell,
            index.oversized.len()
        );
        index
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    fn key(&self, x: f64, y: f64) -> CellKey {
        cell_of(Coord::new(x, y), self.cell)
    }

    fn range_of(&self, b: &Bbox) -> CellRange {
        CellRange {
            lo: self.key(b.min.x - self.tol, b.min.y - self.tol),
            hi: self.key(b.max.x + self.tol, b.max.y + self.tol),
        }
    }

    /// Indices of boxes that contain `p` (grown by the tolerance), ascending.
    pub fn query_point(&self, p: Coord) -> Vec<usize> {
        let at = Bbox { min: p, max: p };
        let mut hits: Vec<usize> = self
            .buckets
            .get(&self.key(p.x, p.y))
            .into_iter()
            .flatten()
            .chain(&self.oversized)
            .copied()
            .filter(|&i| self.boxes[i].intersects(&at, self.tol))
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Indices of boxes intersecting `b` (both grown by the tolerance),
    /// ascending and without repeats.
    pub fn query_box(&self, b: &Bbox) -> Vec<usize> {
        let range = self.range_of(b);
        let span = |lo: i64, hi: i64| hi.saturating_sub(lo).saturating_add(1);
        let cells = span(range.lo.0, range.hi.0).saturating_mul(span(range.lo.1, range.hi.1));
        let mut hits: Vec<usize> = if cells > self.buckets.len() as i64 {
            (0..self.boxes.len()).collect()
        } else {
            let mut found = Vec::new();
            for x in range.lo.0..=range.hi.0 {
                for y in range.lo.1..=range.hi.1 {
                    if let Some(bucket) = self.buckets.get(&(x, y)) {
                        found.extend_from_slice(bucket);
                    }
                }
            }
            found.extend_from_slice(&self.oversized);
            found
        };
        hits.sort_unstable();
        hits.dedup();
        hits.retain(|&i| self.boxes[i].intersects(b, self.tol));
        hits
    }

    /// Every pair `(i, j)`, `i < j`, of intersecting boxes, sorted.
    ///
    /// A pair sharing several cells is reported from the lowest shared cell
    /// only.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (&key, bucket) in &self.buckets {
            for (a, &i) in bucket.iter().enumerate() {
                for &j in &bucket[a + 1..] {
                    let (Some(ri), Some(rj)) = (self.ranges[i], self.ranges[j]) else {
                        continue;
                    };
                    let first_shared = (ri.lo.0.max(rj.lo.0), ri.lo.1.max(rj.lo.1));
                    if first_shared == key && self.boxes[i].intersects(&self.boxes[j], self.tol) {
                        pairs.push((i.min(j), i.max(j)));
                    }
                }
            }
        }
        for &big in &self.oversized {
            for j in 0..self.boxes.len() {
                // pairs of two oversized boxes are emitted by the lower one
                if j == big || (self.ranges[j].is_none() && j < big) {
                    continue;
                }
                if self.boxes[big].intersects(&self.boxes[j], self.tol) {
                    pairs.push((big.min(j), big.max(j)));
                }
            }
        }
        pairs.sort_unstable();
        pairs
    }
}

fn cell_size(boxes: &[Bbox], tol: f64) -> f64 {
    let mut extents: Vec<f64> = boxes
        .iter()
        .map(|b| (b.max.x - b.min.x).max(b.max.y - b.min.y))
        .filter(|e| e.is_finite())
        .collect();
    let floor = (4.0 * tol).max(f64::MIN_POSITIVE);
    if extents.is_empty() {
        return floor.max(1.0);
    }
    let mid = extents.len() / 2;
    let (_, median, _) = extents.select_nth_unstable_by(mid, f64::total_cmp);
    (*median).max(floor)
}

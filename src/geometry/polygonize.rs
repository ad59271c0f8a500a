//! Polygons from a planar arrangement of lines.
//!
//! The input segments are noded (split at every mutual intersection, with
//! coincident pieces merged), edges that cannot lie on a cycle (bridges and
//! dangling chains) are dropped, and the bounded faces of what remains are
//! traced as closed rings. Intersections are only computed for segments
//! whose boxes share a [`BoxIndex`] cell, and vertices within the tolerance
//! of each other are welded through a [`SnapGrid`].

use hashbrown::HashSet as FastSet;

use super::grid::{BoxIndex, SnapGrid};
use super::polyline::{Bbox, Coord, Polyline};
use super::segment::{SegmentIntersection, intersect_segments, param_on};

/// A simple polygon given by its closed exterior ring (first == last).
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    ring: Vec<Coord>,
}

impl Polygon {
    pub fn ring(&self) -> &[Coord] {
        &self.ring
    }

    /// Ring as a closed polyline.
    pub fn boundary(&self) -> Polyline {
        Polyline::new(self.ring.clone())
    }

    /// Unsigned area.
    pub fn area(&self) -> f64 {
        signed_area(&self.ring).abs()
    }
}

fn signed_area(ring: &[Coord]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        * 0.5
}

/// Undirected planar graph with snapped vertices and deduplicated edges.
#[derive(Debug, Default)]
struct PlanarGraph {
    vertices: Vec<Coord>,
    edges: Vec<(usize, usize)>,
}

impl PlanarGraph {
    fn noded(segments: &[(Coord, Coord)], tol: f64) -> Self {
        let boxes: Vec<Bbox> = segments
            .iter()
            .map(|&(a, b)| Bbox::of_segment(a, b))
            .collect();
        let pairs = BoxIndex::new(boxes, tol).candidate_pairs();

        let mut splits: Vec<Vec<Coord>> = segments.iter().map(|&(a, b)| vec![a, b]).collect();
        for (i, j) in pairs {
            let (p0, p1) = segments[i];
            let (q0, q1) = segments[j];
            match intersect_segments(p0, p1, q0, q1, tol) {
                SegmentIntersection::None => {}
                SegmentIntersection::Point(p) => {
                    splits[i].push(p);
                    splits[j].push(p);
                }
                SegmentIntersection::Collinear(c0, c1) => {
                    splits[i].extend([c0, c1]);
                    splits[j].extend([c0, c1]);
                }
            }
        }

        let mut welded = SnapGrid::new(tol);
        let mut edges = Vec::new();
        let mut seen: FastSet<(usize, usize)> = FastSet::new();
        for (&(a, b), points) in segments.iter().zip(splits.iter_mut()) {
            points.sort_by(|p, q| param_on(a, b, *p).total_cmp(&param_on(a, b, *q)));
            let ids: Vec<usize> = points.iter().map(|&p| welded.insert(p)).collect();
            for w in ids.windows(2) {
                let (u, v) = (w[0].min(w[1]), w[0].max(w[1]));
                if u != v && seen.insert((u, v)) {
                    edges.push((u, v));
                }
            }
        }
        PlanarGraph {
            vertices: welded.points().to_vec(),
            edges,
        }
    }

    fn adjacency(&self) -> Vec<Vec<(usize, usize)>> {
        let mut adj = vec![Vec::new(); self.vertices.len()];
        for (e, &(u, v)) in self.edges.iter().enumerate() {
            adj[u].push((v, e));
            adj[v].push((u, e));
        }
        adj
    }

    /// Marks bridges with an iterative Tarjan low-link search.
    fn bridges(&self) -> Vec<bool> {
        const UNVISITED: usize = usize::MAX;
        let adj = self.adjacency();
        let n = self.vertices.len();
        let mut disc = vec![UNVISITED; n];
        let mut low = vec![0usize; n];
        let mut is_bridge = vec![false; self.edges.len()];
        let mut timer = 0usize;

        for root in 0..n {
            if disc[root] != UNVISITED {
                continue;
            }
            disc[root] = timer;
            low[root] = timer;
            timer += 1;
            // (vertex, edge we arrived by, next adjacency slot)
            let mut stack: Vec<(usize, usize, usize)> = vec![(root, usize::MAX, 0)];
            while let Some(frame) = stack.last_mut() {
                let (v, parent_edge) = (frame.0, frame.1);
                if frame.2 < adj[v].len() {
                    let (w, e) = adj[v][frame.2];
                    frame.2 += 1;
                    if e == parent_edge {
                        continue;
                    }
                    if disc[w] == UNVISITED {
                        disc[w] = timer;
                        low[w] = timer;
                        timer += 1;
                        stack.push((w, e, 0));
                    } else {
                        low[v] = low[v].min(disc[w]);
                    }
                } else {
                    stack.pop();
                    if let Some(&(u, _, _)) = stack.last() {
                        low[u] = low[u].min(low[v]);
                        if low[v] > disc[u] {
                            is_bridge[parent_edge] = true;
                        }
                    }
                }
            }
        }
        is_bridge
    }

    /// Traces every face of the graph and keeps the bounded ones.
    ///
    /// Half-edge `2k` runs `u -> v` of edge `k`, `2k + 1` runs back. Walking
    /// "turn to the next edge clockwise" keeps the face on the left, so
    /// bounded faces come out counter-clockwise with positive area.
    fn bounded_faces(&self, tol: f64) -> Vec<Polygon> {
        let half_count = self.edges.len() * 2;
        let origin = |h: usize| {
            let (u, v) = self.edges[h / 2];
            if h % 2 == 0 { u } else { v }
        };
        let target = |h: usize| origin(h ^ 1);

        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); self.vertices.len()];
        for h in 0..half_count {
            outgoing[origin(h)].push(h);
        }
        let angle = |h: usize| {
            let a = self.vertices[origin(h)];
            let b = self.vertices[target(h)];
            (b.y - a.y).atan2(b.x - a.x)
        };
        let mut slot = vec![0usize; half_count];
        for out in &mut outgoing {
            out.sort_by(|&h, &k| angle(h).total_cmp(&angle(k)));
            for (i, &h) in out.iter().enumerate() {
                slot[h] = i;
            }
        }

        let mut visited = vec![false; half_count];
        let mut faces = Vec::new();
        for start in 0..half_count {
            if visited[start] {
                continue;
            }
            let mut ring = Vec::new();
            let mut h = start;
            for _ in 0..=half_count {
                if visited[h] {
                    break;
                }
                visited[h] = true;
                ring.push(self.vertices[origin(h)]);
                let twin = h ^ 1;
                let around = &outgoing[target(h)];
                h = around[(slot[twin] + around.len() - 1) % around.len()];
            }
            if h != start || ring.len() < 3 {
                log::debug!("polygonize: discarding open face walk from half-edge {start}");
                continue;
            }
            ring.push(ring[0]);
            if signed_area(&ring) > tol * tol {
                faces.push(Polygon { ring });
            }
        }
        faces
    }
}

/// Build the bounded polygons enclosed by `lines`.
///
/// Degenerate lines contribute nothing. Coincident segments are merged, so
/// two identical lines never enclose a polygon.
pub fn polygonize(lines: &[&Polyline], tol: f64) -> Vec<Polygon> {
    let segments: Vec<(Coord, Coord)> = lines
        .iter()
        .filter(|l| !l.is_degenerate())
        .flat_map(|l| l.segments())
        .collect();
    let mut graph = PlanarGraph::noded(&segments, tol);
    let bridges = graph.bridges();
    let before = graph.edges.len();
    graph.edges = graph
        .edges
        .iter()
        .zip(&bridges)
        .filter_map(|(&e, &bridge)| (!bridge).then_some(e))
        .collect();
    log::trace!(
        "polygonize: {} vertices, {} edges, {} on cycles",
        graph.vertices.len(),
        before,
        graph.edges.len()
    );
    graph.bounded_faces(tol)
}

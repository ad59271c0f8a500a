#![allow(dead_code)]
use stream_topo::prelude::*;

pub fn rid(u: u64) -> ReachId {
    ReachId::new(u).unwrap()
}

pub fn line(points: &[(f64, f64)]) -> Polyline {
    Polyline::from_xy(points)
}

/// Reach with geometry and no linkage.
pub fn reach(id: u64, points: &[(f64, f64)]) -> Reach {
    Reach::new(rid(id), line(points))
}

pub fn linked(id: u64, up: u64, from: u64, to: u64, points: &[(f64, f64)]) -> Reach {
    let r = reach(id, points).with_nodes(NodeId(from), NodeId(to));
    match ReachId::from_link(up) {
        Some(up) => r.with_upstream(up),
        None => r,
    }
}

pub fn network(reaches: Vec<Reach>) -> Network {
    Network::new(reaches).unwrap()
}

/// Codes of a full default run seeded at `outflow`.
pub fn codes_of(net: &Network, outflow: u64) -> Vec<(u64, u8)> {
    let opts = FindErrorsOptions::default().with_outflow(rid(outflow));
    find_error_codes(net, &PlanarEngine::default(), &opts)
        .unwrap()
        .iter()
        .map(|(id, k)| (id.get(), k.code()))
        .collect()
}

/// A linear chain of `n` reaches flowing towards reach 1 with consistent
/// node ids. Reach `i` is `base + i` long, so no two lengths collide.
pub fn chain(n: u64, base: f64) -> Network {
    let mut x = 0.0;
    let reaches = (1..=n)
        .map(|i| {
            let x0 = x;
            x += base + i as f64;
            let up = if i < n { i + 1 } else { 0 };
            linked(i, up, i + 1, i, &[(x, 0.0), (x0, 0.0)])
        })
        .collect();
    network(reaches)
}

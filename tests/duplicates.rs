mod util;
use stream_topo::algs::{DuplicateMatch, FindErrorsOptions};
use stream_topo::prelude::*;
use util::*;

fn run(net: &Network, matching: DuplicateMatch) -> ErrorReport {
    let opts = FindErrorsOptions {
        duplicate_match: matching,
        ..FindErrorsOptions::default().with_outflow(rid(1))
    };
    find_errors_with(net, &PlanarEngine::default(), &opts).unwrap()
}

#[test]
fn exact_length_collision_is_a_duplicate() {
    let net = network(vec![
        reach(1, &[(0.0, 0.0), (42.0, 0.0)]),
        reach(2, &[(0.0, 100.0), (42.0, 100.0)]),
    ]);
    let report = run(&net, DuplicateMatch::Length);
    assert_eq!(report.get(rid(1)), Some(ErrorKind::Duplicate));
    assert_eq!(report.get(rid(2)), Some(ErrorKind::Duplicate));
}

#[test]
fn nearly_equal_lengths_are_not_duplicates() {
    let net = network(vec![
        reach(1, &[(0.0, 0.0), (42.0, 0.0)]),
        reach(2, &[(0.0, 100.0), (42.0001, 100.0)]),
    ]);
    assert!(run(&net, DuplicateMatch::Length).is_empty());
}

#[test]
fn geometry_matching_ignores_coincidental_lengths() {
    let net = network(vec![
        reach(1, &[(0.0, 0.0), (42.0, 0.0)]),
        reach(2, &[(0.0, 100.0), (42.0, 100.0)]),
        reach(3, &[(42.0, 0.0), (0.0, 0.0)]),
    ]);
    let report = run(&net, DuplicateMatch::Geometry);
    assert_eq!(report.get(rid(1)), Some(ErrorKind::Duplicate));
    assert_eq!(report.get(rid(2)), None);
    assert_eq!(report.get(rid(3)), Some(ErrorKind::Duplicate));
}

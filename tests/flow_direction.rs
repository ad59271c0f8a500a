mod util;
use stream_topo::prelude::*;
use util::*;

#[test]
fn reach_starting_at_partner_start_is_flipped() {
    // reach 2 was digitised against the flow: it runs 3 -> 4 while 1 starts at 3
    let net = network(vec![
        linked(1, 2, 3, 1, &[(100.0, 0.0), (0.0, 0.0)]),
        linked(2, 0, 3, 4, &[(100.0, 0.0), (190.0, 0.0)]),
    ]);
    let report = find_errors(&net, &PlanarEngine::default(), rid(1), 30.0).unwrap();
    assert_eq!(report.get(rid(1)), Some(ErrorKind::FlippedFlow));
    assert_eq!(report.get(rid(2)), None);
}

#[test]
fn consistent_chain_is_clean() {
    let net = chain(6, 40.0);
    assert!(codes_of(&net, 1).iter().all(|&(_, code)| code == 0));
}

#[test]
fn missing_node_ids_are_not_evaluated() {
    let mut down = linked(1, 2, 3, 1, &[(100.0, 0.0), (0.0, 0.0)]);
    down.from_node = None;
    let net = network(vec![down, linked(2, 0, 3, 4, &[(100.0, 0.0), (190.0, 0.0)])]);
    assert!(find_errors(&net, &PlanarEngine::default(), rid(1), 30.0)
        .unwrap()
        .is_empty());
}

#[test]
fn dangling_upstream_link_is_skipped() {
    let net = network(vec![linked(1, 42, 3, 1, &[(100.0, 0.0), (0.0, 0.0)])]);
    assert!(find_errors(&net, &PlanarEngine::default(), rid(1), 30.0)
        .unwrap()
        .is_empty());
}

#[test]
fn reach_numbered_like_partner_start_node_is_clean_by_default() {
    // reach 5 and its partner 6 both start at node 5
    let net = network(vec![
        linked(5, 6, 5, 4, &[(0.0, 0.0), (100.0, 0.0)]),
        linked(6, 0, 5, 9, &[(0.0, 0.0), (0.0, 120.0)]),
    ]);
    let engine = PlanarEngine::default();
    assert!(find_errors(&net, &engine, rid(5), 30.0).unwrap().is_empty());

    let opts = FindErrorsOptions {
        flow_rule: FlowRule::NodeChain,
        ..FindErrorsOptions::default().with_outflow(rid(5))
    };
    let report = find_errors_with(&net, &engine, &opts).unwrap();
    assert_eq!(report.get(rid(5)), Some(ErrorKind::FlippedFlow));
}

mod util;
use std::fs;

use stream_topo::io::{self, csv, json};
use stream_topo::prelude::*;
use util::*;

const FEATURES: &str = r#"{
    "features": [
        { "reach_id": 10, "geometry": [[0.0, 0.0], [100.0, 0.0]] },
        { "reach_id": 20, "geometry": [[100.0, 0.0], [100.0, 12.0]] },
        { "reach_id": 30, "geometry": [[100.0, 0.0], [250.0, 0.0]] }
    ]
}"#;

const TABLE: &str = "ReachID,UpstreamID,FROM_NODE,TO_NODE\n\
                     10,20,2,1\n\
                     10,30,2,1\n\
                     20,0,3,2\n\
                     30,0,4,2\n";

#[test]
fn json_features_with_csv_table() {
    let mut dataset = json::read_dataset(FEATURES.as_bytes()).unwrap();
    dataset.table = csv::read_attribute_table(TABLE.as_bytes()).unwrap();
    let net = dataset.into_network().unwrap();
    assert_eq!(net.get(rid(10)).unwrap().upstream, vec![rid(20), rid(30)]);

    let report = find_errors(&net, &PlanarEngine::default(), rid(10), 30.0).unwrap();
    assert_eq!(report.get(rid(20)), Some(ErrorKind::Dangle));
    assert_eq!(report.len(), 1);

    let mut out = Vec::new();
    csv::write_report(&mut out, &report).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "ObjectID,ReachID,ERROR_CODE\n2,20,1\n"
    );

    let mut out = Vec::new();
    json::write_report(&mut out, &report).unwrap();
    let back: ErrorReport = serde_json::from_slice(&out).unwrap();
    assert_eq!(back, report);
}

#[test]
fn report_file_is_replaced_whole() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("errors.csv");
    fs::write(&path, "stale").unwrap();

    let net = network(vec![reach(1, &[(0.0, 0.0), (5.0, 0.0)])]);
    let report = find_errors(&net, &PlanarEngine::default(), rid(1), 30.0).unwrap();
    csv::write_report_file(&path, &report).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "ObjectID,ReachID,ERROR_CODE\n1,1,1\n"
    );
    let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);

    let json_path = dir.path().join("errors.json");
    io::write_report_file(&json::JsonFormat { pretty: true }, &json_path, &report).unwrap();
    let back: ErrorReport = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(back, report);
}

#[test]
fn options_from_json() {
    let opts = json::read_options(r#"{ "outflow_id": 10, "max_len": 12.5, "merge_policy": "legacy" }"#.as_bytes())
        .unwrap();
    assert_eq!(opts.outflow_id, Some(rid(10)));
    assert_eq!(opts.max_len, 12.5);
    assert_eq!(opts.merge_policy, MergePolicy::Legacy);
    assert!(json::read_options(r#"{ "outflow_id": 0 }"#.as_bytes()).is_err());
}

//! JSON datasets, run options and reports.
//!
//! # Supported format
//! ```json
//! {
//!   "features": [{ "reach_id": 1, "geometry": [[0.0, 0.0], [10.0, 0.0]] }],
//!   "table": [{ "ReachID": 1, "UpstreamID": 0, "FROM_NODE": 2, "TO_NODE": 1 }]
//! }
//! ```
//! `geometry`, `UpstreamID`, `FROM_NODE` and `TO_NODE` may be omitted or
//! `null`. A document without a `features` array is a schema error. Inside
//! the arrays, elements are read one at a time: a feature or row without a
//! valid id is logged and skipped, and a feature whose geometry does not
//! parse is kept without geometry.
//!
//! Reports are written as an array of `{ "ObjectID", "ReachID", "ERROR_CODE" }`
//! objects.

use std::io::{Read, Write};

use serde::Deserialize;
use serde_json::Value;

use crate::algs::pipeline::FindErrorsOptions;
use crate::geometry::polyline::Polyline;
use crate::io::{Dataset, DatasetReader, ReportWriter};
use crate::report::ErrorReport;
use crate::topology::network::{AttributeRow, Feature, Network};
use crate::topology::reach::ReachId;
use crate::topology_error::TopologyError;

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonFormat {
    /// Indent the written report.
    pub pretty: bool,
}

/// Top-level shape; elements are decoded individually.
#[derive(Deserialize)]
struct RawDataset {
    features: Vec<Value>,
    #[serde(default)]
    table: Vec<Value>,
}

fn parse_feature(pos: usize, mut value: Value) -> Option<Feature> {
    let geometry = value.get_mut("geometry").map(Value::take);
    let reach_id = match value.get_mut("reach_id").map(Value::take) {
        Some(raw) => match serde_json::from_value::<ReachId>(raw) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("feature {pos}: invalid reach_id: {e}; feature skipped");
                return None;
            }
        },
        None => {
            log::warn!("feature {pos}: no reach_id; feature skipped");
            return None;
        }
    };
    let geometry = match geometry {
        None | Some(Value::Null) => None,
        Some(raw) => match serde_json::from_value::<Polyline>(raw) {
            Ok(line) => Some(line),
            Err(e) => {
                log::warn!("reach {reach_id}: invalid geometry: {e}; read as missing");
                None
            }
        },
    };
    Some(Feature { reach_id, geometry })
}

fn parse_row(pos: usize, value: Value) -> Option<AttributeRow> {
    serde_json::from_value(value)
        .map_err(|e| log::warn!("attribute row {pos}: {e}; row skipped"))
        .ok()
}

impl DatasetReader for JsonFormat {
    fn read<R: Read>(&self, reader: R) -> Result<Dataset, TopologyError> {
        let raw: RawDataset = serde_json::from_reader(reader)?;
        let (n_features, n_rows) = (raw.features.len(), raw.table.len());
        let dataset = Dataset {
            features: raw
                .features
                .into_iter()
                .enumerate()
                .filter_map(|(pos, v)| parse_feature(pos, v))
                .collect(),
            table: raw
                .table
                .into_iter()
                .enumerate()
                .filter_map(|(pos, v)| parse_row(pos, v))
                .collect(),
        };
        let skipped = (n_features - dataset.features.len()) + (n_rows - dataset.table.len());
        if skipped > 0 {
            log::warn!("{skipped} malformed features or attribute rows skipped");
        }
        log::debug!(
            "read {} features and {} attribute rows",
            dataset.features.len(),
            dataset.table.len()
        );
        Ok(dataset)
    }
}

impl ReportWriter for JsonFormat {
    fn write<W: Write>(&self, writer: W, report: &ErrorReport) -> Result<(), TopologyError> {
        if self.pretty {
            serde_json::to_writer_pretty(writer, report)?;
        } else {
            serde_json::to_writer(writer, report)?;
        }
        Ok(())
    }
}

pub fn read_dataset<R: Read>(reader: R) -> Result<Dataset, TopologyError> {
    JsonFormat::default().read(reader)
}

/// Read a dataset and join it into a [`Network`].
pub fn read_network<R: Read>(reader: R) -> Result<Network, TopologyError> {
    read_dataset(reader)?.into_network()
}

/// Read run options; absent fields take their defaults.
pub fn read_options<R: Read>(reader: R) -> Result<FindErrorsOptions, TopologyError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn write_report<W: Write>(writer: W, report: &ErrorReport) -> Result<(), TopologyError> {
    JsonFormat::default().write(writer, report)
}

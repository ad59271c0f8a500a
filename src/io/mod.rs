//! Dataset readers and report writers.
//!
//! Readers turn a byte stream into a [`Dataset`] (line features plus the
//! attribute table); writers serialize an [`ErrorReport`]. Both are
//! trait-based so callers can pick a format without touching the detectors.

pub mod csv;
pub mod json;

use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::report::ErrorReport;
use crate::topology::network::{AttributeRow, Feature, Network};
use crate::topology_error::TopologyError;

/// Raw input of one run, before the tables are joined.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub features: Vec<Feature>,
    #[serde(default)]
    pub table: Vec<AttributeRow>,
}

impl Dataset {
    /// Join features and attribute rows into a [`Network`].
    pub fn into_network(self) -> Result<Network, TopologyError> {
        Network::from_tables(self.features, self.table)
    }
}

/// Readers that produce a [`Dataset`].
pub trait DatasetReader {
    fn read<R: Read>(&self, reader: R) -> Result<Dataset, TopologyError>;
}

/// Writers that serialize an [`ErrorReport`].
pub trait ReportWriter {
    fn write<W: Write>(&self, writer: W, report: &ErrorReport) -> Result<(), TopologyError>;
}

/// Write `report` to `path` through `format`.
///
/// The report goes to a temporary sibling first and is renamed into place,
/// so `path` holds either the previous content or the complete new table.
pub fn write_report_file<F: ReportWriter>(
    format: &F,
    path: impl AsRef<Path>,
    report: &ErrorReport,
) -> Result<(), TopologyError> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .ok_or_else(|| TopologyError::Io(format!("not a file path: {}", path.display())))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let result: Result<(), TopologyError> = (|| {
        let mut out = BufWriter::new(fs::File::create(&tmp)?);
        format.write(&mut out, report)?;
        out.flush()?;
        out.into_inner()
            .map_err(|e| TopologyError::Io(e.to_string()))?
            .sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

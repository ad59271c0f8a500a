//! Comma-separated attribute tables and reports.
//!
//! # Supported format
//! - First line is a header. Column names are matched exactly; surrounding
//!   whitespace and double quotes are stripped.
//! - `ReachID` and `UpstreamID` are required columns. `FROM_NODE` and
//!   `TO_NODE` are optional; an empty cell is a missing value.
//!
//! # Limitations
//! - No quoted fields containing commas or line breaks.
//! - Geometry is not read from CSV; pair the table with JSON features.

use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use crate::io::ReportWriter;
use crate::report::ErrorReport;
use crate::topology::network::AttributeRow;
use crate::topology::reach::{NodeId, ReachId};
use crate::topology_error::TopologyError;

#[derive(Clone, Copy, Debug, Default)]
pub struct CsvFormat;

#[derive(Clone, Copy, Debug)]
struct Columns {
    reach_id: usize,
    upstream_id: usize,
    from_node: Option<usize>,
    to_node: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self, TopologyError> {
        let names: Vec<&str> = split(header).collect();
        let find = |name: &str| names.iter().position(|n| *n == name);
        let require = |name: &str| find(name).ok_or_else(|| TopologyError::MissingField(name.into()));
        Ok(Self {
            reach_id: require("ReachID")?,
            upstream_id: require("UpstreamID")?,
            from_node: find("FROM_NODE"),
            to_node: find("TO_NODE"),
        })
    }

    fn parse_row(&self, line: &str) -> Result<AttributeRow, TopologyError> {
        let cells: Vec<&str> = split(line).collect();
        let cell = |idx: usize| cells.get(idx).copied().unwrap_or("");
        let optional_node = |idx: Option<usize>| -> Result<Option<NodeId>, TopologyError> {
            match idx.map(cell) {
                None | Some("") => Ok(None),
                Some(raw) => parse_u64(raw, "node id").map(|n| Some(NodeId(n))),
            }
        };
        let upstream = cell(self.upstream_id);
        Ok(AttributeRow {
            reach_id: ReachId::new(parse_u64(cell(self.reach_id), "ReachID")?)?,
            upstream_id: if upstream.is_empty() {
                0
            } else {
                parse_u64(upstream, "UpstreamID")?
            },
            from_node: optional_node(self.from_node)?,
            to_node: optional_node(self.to_node)?,
        })
    }
}

fn split(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(|c| c.trim().trim_matches('"'))
}

fn parse_u64(raw: &str, what: &str) -> Result<u64, TopologyError> {
    // some exports write integer columns as `12.0`
    let raw = raw.strip_suffix(".0").unwrap_or(raw);
    raw.parse::<u64>()
        .map_err(|_| TopologyError::Parse(format!("invalid {what}: {raw}")))
}

impl CsvFormat {
    /// Read the attribute table.
    ///
    /// # Errors
    /// [`TopologyError::MissingField`] for an absent required column,
    /// [`TopologyError::Io`] if the stream fails. Unparsable rows are
    /// logged and skipped.
    pub fn read_rows<R: Read>(&self, reader: R) -> Result<Vec<AttributeRow>, TopologyError> {
        let mut lines = BufReader::new(reader).lines();
        let header = lines
            .next()
            .transpose()?
            .ok_or_else(|| TopologyError::MissingField("ReachID".into()))?;
        let columns = Columns::from_header(header.trim_start_matches('\u{feff}'))?;

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        for (lineno, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match columns.parse_row(&line) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    skipped += 1;
                    log::warn!("attribute table line {}: {e}; row skipped", lineno + 2);
                }
            }
        }
        if skipped > 0 {
            log::warn!("{skipped} attribute rows skipped");
        }
        Ok(rows)
    }
}

impl ReportWriter for CsvFormat {
    fn write<W: Write>(&self, mut writer: W, report: &ErrorReport) -> Result<(), TopologyError> {
        writeln!(writer, "ObjectID,ReachID,ERROR_CODE")?;
        for row in report.rows() {
            writeln!(
                writer,
                "{},{},{}",
                row.object_id,
                row.reach_id,
                row.error_code.code()
            )?;
        }
        Ok(())
    }
}

pub fn read_attribute_table<R: Read>(reader: R) -> Result<Vec<AttributeRow>, TopologyError> {
    CsvFormat.read_rows(reader)
}

pub fn write_report<W: Write>(writer: W, report: &ErrorReport) -> Result<(), TopologyError> {
    CsvFormat.write(writer, report)
}

/// Write the report to `path`; see [`crate::io::write_report_file`].
pub fn write_report_file(path: impl AsRef<Path>, report: &ErrorReport) -> Result<(), TopologyError> {
    crate::io::write_report_file(&CsvFormat, path, report)
}

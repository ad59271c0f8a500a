#![cfg_attr(docsrs, feature(doc_cfg))]
//! # stream-topo
//!
//! stream-topo detects topology errors in stream (river) networks. A network
//! is a table of reaches: 2-D polylines linked to their upstream partners and
//! to a directed node graph. Independent detectors classify each reach, and
//! their findings are merged into one error code per reach.
//!
//! ## Error codes
//! | code | kind |
//! |------|------|
//! | 0 | no error |
//! | 1 | dangle |
//! | 2 | braid |
//! | 3 | duplicate |
//! | 4 | overlap with upstream reach |
//! | 5 | crossing with upstream reach |
//! | 6 | disconnected from upstream reach |
//! | 7 | flipped flow direction |
//!
//! ## Features
//! - `rayon`: evaluate per-reach checks in parallel. Results are collected in
//!   input order, so the report is identical to the serial run.
//! - `check-invariants`: validate network and code-table bookkeeping in
//!   release builds (always on with `debug_assertions`).
//!
//! ## Usage
//! ```rust
//! use stream_topo::prelude::*;
//!
//! # fn main() -> Result<(), TopologyError> {
//! let dataset = r#"{
//!   "features": [
//!     { "reach_id": 1, "geometry": [[-20.0, 0.0], [100.0, 0.0]] },
//!     { "reach_id": 2, "geometry": [[100.0, 0.0], [200.0, 0.0]] },
//!     { "reach_id": 3, "geometry": [[150.0, 0.0], [260.0, 0.0]] }
//!   ],
//!   "table": [
//!     { "ReachID": 1, "UpstreamID": 2, "FROM_NODE": 2, "TO_NODE": 1 },
//!     { "ReachID": 2, "UpstreamID": 3, "FROM_NODE": 3, "TO_NODE": 2 },
//!     { "ReachID": 3, "UpstreamID": 0, "FROM_NODE": 4, "TO_NODE": 3 }
//!   ]
//! }"#;
//! let network = stream_topo::io::json::read_network(dataset.as_bytes())?;
//! let report = find_errors(&network, &PlanarEngine::default(), ReachId::new(1)?, 30.0)?;
//! assert_eq!(report.get(ReachId::new(2)?), Some(ErrorKind::Overlap));
//! # Ok(())
//! # }
//! ```
//!
//! The crate logs through the [`log`] facade and installs no logger.

pub mod algs;
pub mod debug_invariants;
pub mod geometry;
pub mod io;
pub mod report;
pub mod topology;
pub mod topology_error;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::{
        Detector, DetectorKind, FindErrorsOptions, Findings, FlowRule, MergePolicy,
        find_error_codes, find_errors, find_errors_with, reduce, run_detectors,
    };
    pub use crate::geometry::engine::{GeometryEngine, PlanarEngine};
    pub use crate::geometry::polyline::{Coord, Polyline};
    pub use crate::report::{ErrorReport, ErrorRow};
    pub use crate::topology::{
        AttributeRow, ErrorCodes, ErrorKind, Feature, Field, Filter, Network, NodeId, Reach,
        ReachId,
    };
    pub use crate::topology_error::TopologyError;
}

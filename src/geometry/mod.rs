//! Geometry for stream-topo.
//!
//! Polylines, segment primitives, polygon construction, and the
//! [`GeometryEngine`](engine::GeometryEngine) trait the detectors evaluate
//! spatial predicates through.

pub mod engine;
pub mod grid;
pub mod polygonize;
pub mod polyline;
pub mod segment;

pub use engine::{GeometryEngine, PlanarEngine, VertexSelection};
pub use polygonize::Polygon;
pub use polyline::{Coord, Polyline};

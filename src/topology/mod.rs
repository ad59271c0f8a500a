//! Network table model: reaches, identifiers, error codes and typed filters.

pub mod error_codes;
pub mod error_kind;
pub mod network;
pub mod query;
pub mod reach;

pub use error_codes::ErrorCodes;
pub use error_kind::ErrorKind;
pub use network::{AttributeRow, Feature, Network, Subset};
pub use query::{CmpOp, Field, FieldSource, Filter, Value};
pub use reach::{NodeId, Reach, ReachId};

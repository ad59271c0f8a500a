//! Structural self-checks for the network and code tables.
//!
//! Checks run in debug builds, or in release builds with the
//! `check-invariants` feature. They guard the index/ordering bookkeeping of
//! [`Network`](crate::topology::network::Network) and
//! [`ErrorCodes`](crate::topology::error_codes::ErrorCodes), not the input data:
//! bad input is reported through logging or [`TopologyError`].

use crate::topology_error::TopologyError;

/// Types whose internal bookkeeping can be verified.
pub trait DebugInvariants {
    /// Panic on the first violated invariant when checks are enabled.
    fn debug_assert_invariants(&self);
    /// Return the first violated invariant, if any.
    fn validate_invariants(&self) -> Result<(), TopologyError>;
}

/// Validate `$target` and panic with `$ctx` when invariant checking is on.
#[macro_export]
macro_rules! debug_invariants {
    ($target:expr, $ctx:literal) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $crate::debug_invariants::DebugInvariants::validate_invariants($target) {
            panic!(concat!("[invariants] ", $ctx, ": {}"), e);
        }
    };
}

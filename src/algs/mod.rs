//! Topology error detectors and the pipeline that runs them.

pub mod braids;
pub mod dangles;
pub mod duplicates;
pub mod findings;
pub mod flow_direction;
pub mod pipeline;
pub mod reach_pairs;

pub use braids::BraidDetector;
pub use dangles::{DangleDetector, DangleRule};
pub use duplicates::{DuplicateDetector, DuplicateMatch};
pub use findings::{Detector, DetectorKind, Findings, MergePolicy, reduce};
pub use flow_direction::{FlowDirectionDetector, FlowRule};
pub use pipeline::{
    FindErrorsOptions, find_error_codes, find_errors, find_errors_with, run_detectors,
};
pub use reach_pairs::{PairEvaluation, PairGrouping, PairTarget, ReachPairDetector};

/// Map `items` through `f`, in parallel when the `rayon` feature is on.
/// Output order always matches input order.
#[cfg(feature = "rayon")]
pub(crate) fn map_in_order<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    use rayon::prelude::*;
    items.par_iter().map(f).collect()
}

#[cfg(not(feature = "rayon"))]
pub(crate) fn map_in_order<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    F: Fn(&T) -> R,
{
    items.iter().map(f).collect()
}

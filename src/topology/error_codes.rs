//! The `ERROR_CODE` column of a run.

use std::collections::HashMap;

use crate::debug_invariants::DebugInvariants;
use crate::topology::error_kind::ErrorKind;
use crate::topology::network::Network;
use crate::topology::reach::ReachId;
use crate::topology_error::TopologyError;

/// One error code per reach, in network table order.
///
/// Codes only move away from [`ErrorKind::NoError`]; there is no way to reset
/// a reach back to clean.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorCodes {
    order: Vec<ReachId>,
    codes: HashMap<ReachId, ErrorKind>,
}

impl ErrorCodes {
    /// Every reach of `network` at [`ErrorKind::NoError`].
    pub fn new(network: &Network) -> Self {
        let order: Vec<ReachId> = network.ids().collect();
        let codes = order.iter().map(|&id| (id, ErrorKind::NoError)).collect();
        let table = Self { order, codes };
        crate::debug_invariants!(&table, "error code initialization");
        table
    }

    pub fn get(&self, id: ReachId) -> Option<ErrorKind> {
        self.codes.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// `(reach_id, code)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (ReachId, ErrorKind)> + '_ {
        self.order.iter().map(move |id| (*id, self.codes[id]))
    }

    /// Number of reaches currently carrying `kind`.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.codes.values().filter(|&&k| k == kind).count()
    }

    /// Record `kind` for `id`.
    ///
    /// A clean reach always takes the code. A reach that already has a code
    /// takes it only when `overwrite` is set. `NoError` is never written.
    /// Returns whether the stored code changed.
    pub fn assign(&mut self, id: ReachId, kind: ErrorKind, overwrite: bool) -> bool {
        if !kind.is_error() {
            return false;
        }
        let Some(slot) = self.codes.get_mut(&id) else {
            log::debug!("ignoring code {kind} for reach {id} outside the network");
            return false;
        };
        if *slot == kind || (slot.is_error() && !overwrite) {
            return false;
        }
        *slot = kind;
        true
    }
}

impl DebugInvariants for ErrorCodes {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self, "error codes");
    }

    fn validate_invariants(&self) -> Result<(), TopologyError> {
        if self.order.len() != self.codes.len() {
            return Err(TopologyError::Invariant(format!(
                "{} rows but {} codes",
                self.order.len(),
                self.codes.len()
            )));
        }
        match self.order.iter().find(|id| !self.codes.contains_key(id)) {
            Some(id) => Err(TopologyError::Invariant(format!("reach {id} has no code"))),
            None => Ok(()),
        }
    }
}

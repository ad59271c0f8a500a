//! Error classification for reaches.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::topology_error::TopologyError;

/// Closed set of per-reach topology error codes.
///
/// The discriminants are the `ERROR_CODE` values written to the report.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum ErrorKind {
    /// No error detected.
    #[default]
    NoError = 0,
    /// Short reach ending at an unconnected endpoint.
    Dangle = 1,
    /// Reach on a closed loop (multiple flow paths).
    Braid = 2,
    /// Reach that duplicates another.
    Duplicate = 3,
    /// Reach partially coincides with its upstream partner.
    Overlap = 4,
    /// Reach crosses its upstream partner away from a shared endpoint.
    Cross = 5,
    /// Reach does not touch its upstream partner.
    Disconnected = 6,
    /// Node ordering contradicts the upstream linkage.
    FlippedFlow = 7,
}

impl ErrorKind {
    /// All kinds in code order.
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::NoError,
        ErrorKind::Dangle,
        ErrorKind::Braid,
        ErrorKind::Duplicate,
        ErrorKind::Overlap,
        ErrorKind::Cross,
        ErrorKind::Disconnected,
        ErrorKind::FlippedFlow,
    ];

    /// Integer code as stored in the `ERROR_CODE` column.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// `true` for every kind except [`ErrorKind::NoError`].
    #[inline]
    pub const fn is_error(self) -> bool {
        !matches!(self, ErrorKind::NoError)
    }

    /// Short human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::NoError => "no error",
            ErrorKind::Dangle => "dangle",
            ErrorKind::Braid => "potential braid",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::Overlap => "overlap",
            ErrorKind::Cross => "crossed",
            ErrorKind::Disconnected => "disconnected",
            ErrorKind::FlippedFlow => "flipped flow direction",
        }
    }
}

impl TryFrom<u8> for ErrorKind {
    type Error = TopologyError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        ErrorKind::ALL
            .get(usize::from(code))
            .copied()
            .ok_or_else(|| TopologyError::Parse(format!("unknown error code {code}")))
    }
}

impl From<ErrorKind> for u8 {
    fn from(kind: ErrorKind) -> u8 {
        kind.code()
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_table_values() {
        for (i, kind) in ErrorKind::ALL.iter().enumerate() {
            assert_eq!(usize::from(kind.code()), i);
            assert_eq!(ErrorKind::try_from(kind.code()).unwrap(), *kind);
        }
        assert!(ErrorKind::try_from(8).is_err());
    }

    #[test]
    fn only_no_error_is_clean() {
        let clean: Vec<_> = ErrorKind::ALL.iter().filter(|k| !k.is_error()).collect();
        assert_eq!(clean, vec![&ErrorKind::NoError]);
        assert_eq!(ErrorKind::default(), ErrorKind::NoError);
    }
}

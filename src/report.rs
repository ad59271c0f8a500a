//! The error report: one row per reach with a non-zero code.

use serde::{Deserialize, Serialize};

use crate::topology::error_codes::ErrorCodes;
use crate::topology::error_kind::ErrorKind;
use crate::topology::query::{Field, FieldSource, Filter, Value};
use crate::topology::reach::ReachId;

/// One report row. `object_id` is the 1-based row of the reach in the
/// network table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRow {
    #[serde(rename = "ObjectID")]
    pub object_id: u64,
    #[serde(rename = "ReachID")]
    pub reach_id: ReachId,
    #[serde(rename = "ERROR_CODE")]
    pub error_code: ErrorKind,
}

impl FieldSource for ErrorRow {
    fn field(&self, field: Field) -> Option<Value> {
        match field {
            Field::ReachId => Some(self.reach_id.into()),
            Field::ErrorCode => Some(self.error_code.into()),
            _ => None,
        }
    }
}

/// Reaches flagged by a run, in table order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorReport {
    rows: Vec<ErrorRow>,
}

impl ErrorReport {
    /// Rows of `codes` matching `"ERROR_CODE" > 0`.
    pub fn from_codes(codes: &ErrorCodes) -> Self {
        let flagged = Filter::greater_than(Field::ErrorCode, 0i64);
        let rows = codes
            .iter()
            .zip(1u64..)
            .map(|((reach_id, error_code), object_id)| ErrorRow {
                object_id,
                reach_id,
                error_code,
            })
            .filter(|row| flagged.matches(row))
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[ErrorRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Code reported for `id`, if the reach was flagged.
    pub fn get(&self, id: ReachId) -> Option<ErrorKind> {
        self.rows
            .iter()
            .find(|row| row.reach_id == id)
            .map(|row| row.error_code)
    }

    /// Number of rows per error kind, indexed by code.
    pub fn counts(&self) -> [usize; ErrorKind::ALL.len()] {
        let mut counts = [0; ErrorKind::ALL.len()];
        for row in &self.rows {
            counts[usize::from(row.error_code.code())] += 1;
        }
        counts
    }
}

impl IntoIterator for ErrorReport {
    type Item = ErrorRow;
    type IntoIter = std::vec::IntoIter<ErrorRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polyline::Polyline;
    use crate::topology::network::Network;
    use crate::topology::reach::Reach;

    fn rid(raw: u64) -> ReachId {
        ReachId::new(raw).unwrap()
    }

    #[test]
    fn keeps_flagged_rows_with_table_positions() {
        let line = Polyline::from_xy(&[(0.0, 0.0), (1.0, 0.0)]);
        let net = Network::new(
            [7, 3, 5]
                .into_iter()
                .map(|i| Reach::new(rid(i), line.clone()))
                .collect(),
        )
        .unwrap();
        let mut codes = ErrorCodes::new(&net);
        codes.assign(rid(5), ErrorKind::Cross, false);
        codes.assign(rid(7), ErrorKind::Dangle, false);

        let report = ErrorReport::from_codes(&codes);
        assert_eq!(
            report.rows(),
            &[
                ErrorRow {
                    object_id: 1,
                    reach_id: rid(7),
                    error_code: ErrorKind::Dangle
                },
                ErrorRow {
                    object_id: 3,
                    reach_id: rid(5),
                    error_code: ErrorKind::Cross
                },
            ]
        );
        assert_eq!(report.get(rid(3)), None);
        assert_eq!(report.counts()[5], 1);
    }

    #[test]
    fn serializes_with_column_names() {
        let row = ErrorRow {
            object_id: 2,
            reach_id: rid(11),
            error_code: ErrorKind::FlippedFlow,
        };
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"ObjectID":2,"ReachID":11,"ERROR_CODE":7}"#
        );
    }
}

//! Typed attribute filters.
//!
//! Selections over the network table are built as data (`field op value`
//! terms combined with `AND`/`OR`/`NOT`) instead of query strings. A filter
//! can be evaluated against any [`FieldSource`] and rendered for logging.

use std::cmp::Ordering;
use std::fmt;

use crate::geometry::engine::GeometryEngine;
use crate::topology::error_kind::ErrorKind;
use crate::topology::reach::{Reach, ReachId};

/// Columns of the network table a filter can test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    ReachId,
    /// First recorded upstream link; `0` when there is none.
    UpstreamId,
    FromNode,
    ToNode,
    /// Geometric length; absent for reaches without usable geometry.
    Length,
    ErrorCode,
}

impl Field {
    /// Column name as it appears in the attribute table.
    pub const fn name(self) -> &'static str {
        match self {
            Field::ReachId => "ReachID",
            Field::UpstreamId => "UpstreamID",
            Field::FromNode => "FROM_NODE",
            Field::ToNode => "TO_NODE",
            Field::Length => "Shape_Length",
            Field::ErrorCode => "ERROR_CODE",
        }
    }
}

/// A scalar column value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    fn compare(self, other: Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Value::Int(v) => v as f64,
            Value::Float(v) => v,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Value::Float(v as f64), Value::Int)
    }
}

impl From<ReachId> for Value {
    fn from(id: ReachId) -> Self {
        Value::from(id.get())
    }
}

impl From<ErrorKind> for Value {
    fn from(kind: ErrorKind) -> Self {
        Value::Int(i64::from(kind.code()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// Comparison operator of a filter term.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "<>",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// Anything that can answer column lookups.
pub trait FieldSource {
    /// Value of `field`, or `None` when the record has no value (NULL).
    fn field(&self, field: Field) -> Option<Value>;
}

/// Structured selection predicate.
///
/// Comparisons against a NULL value are false, as in SQL. An empty `And`
/// matches everything; an empty `Or` matches nothing.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Cmp { field: Field, op: CmpOp, value: Value },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn cmp(field: Field, op: CmpOp, value: impl Into<Value>) -> Self {
        Filter::Cmp {
            field,
            op,
            value: value.into(),
        }
    }

    pub fn equal(field: Field, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Eq, value)
    }

    pub fn less_than(field: Field, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Lt, value)
    }

    pub fn greater_than(field: Field, value: impl Into<Value>) -> Self {
        Self::cmp(field, CmpOp::Gt, value)
    }

    /// `ReachID = a OR ReachID = b OR ...`
    pub fn reach_in(ids: &[ReachId]) -> Self {
        Filter::Or(ids.iter().map(|&id| Self::equal(Field::ReachId, id)).collect())
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut terms) => {
                terms.push(other);
                Filter::And(terms)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut terms) => {
                terms.push(other);
                Filter::Or(terms)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }

    pub fn matches(&self, record: &dyn FieldSource) -> bool {
        match self {
            Filter::Cmp { field, op, value } => record
                .field(*field)
                .and_then(|actual| actual.compare(*value))
                .is_some_and(|ord| op.holds(ord)),
            Filter::And(terms) => terms.iter().all(|t| t.matches(record)),
            Filter::Or(terms) => terms.iter().any(|t| t.matches(record)),
            Filter::Not(inner) => !inner.matches(record),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, terms: &[Filter], sep: &str, empty: &str) -> fmt::Result {
            if terms.is_empty() {
                return f.write_str(empty);
            }
            for (i, t) in terms.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                match t {
                    Filter::Cmp { .. } | Filter::Not(_) => write!(f, "{t}")?,
                    _ => write!(f, "({t})")?,
                }
            }
            Ok(())
        }
        match self {
            Filter::Cmp { field, op, value } => {
                write!(f, "\"{}\" {} {}", field.name(), op.symbol(), value)
            }
            Filter::And(terms) => join(f, terms, " AND ", "TRUE"),
            Filter::Or(terms) => join(f, terms, " OR ", "FALSE"),
            Filter::Not(inner) => write!(f, "NOT ({inner})"),
        }
    }
}

/// A reach viewed as a table row, with derived columns resolved lazily.
pub struct ReachRecord<'a> {
    pub reach: &'a Reach,
    pub engine: &'a dyn GeometryEngine,
    pub code: ErrorKind,
}

impl FieldSource for ReachRecord<'_> {
    fn field(&self, field: Field) -> Option<Value> {
        match field {
            Field::ReachId => Some(self.reach.id.into()),
            Field::UpstreamId => Some(
                self.reach
                    .upstream
                    .first()
                    .map_or(Value::Int(0), |&id| id.into()),
            ),
            Field::FromNode => self.reach.from_node.map(|n| n.0.into()),
            Field::ToNode => self.reach.to_node.map(|n| n.0.into()),
            Field::Length => self
                .reach
                .valid_geometry()
                .map(|g| Value::Float(self.engine.length(g))),
            Field::ErrorCode => Some(self.code.into()),
        }
    }
}

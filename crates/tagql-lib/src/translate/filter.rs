//! The executable filter: a backend-neutral predicate tree.
//!
//! This is the machine-facing half of the compiler's output. It serializes
//! with an internally-tagged `type` discriminator so storage backends can
//! dispatch on predicate shape without sniffing fields.

use serde::Serialize;

use crate::analyze::ResolvedValue;
use crate::dialect::CompareOp;

/// A typed constant inside a predicate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    String(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
}

impl From<ResolvedValue> for FilterValue {
    fn from(value: ResolvedValue) -> Self {
        match value {
            ResolvedValue::String(s) => FilterValue::String(s),
            ResolvedValue::Integer(n) => FilterValue::Integer(n),
            ResolvedValue::Decimal(d) => FilterValue::Decimal(d),
            // Dates travel as their normalized spelling.
            ResolvedValue::Date(d) => FilterValue::String(d),
            ResolvedValue::Bool(b) => FilterValue::Bool(b),
            // Enums travel as the canonical member name.
            ResolvedValue::Enum(name) => FilterValue::String(name),
        }
    }
}

/// One node of the predicate tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Predicate {
    /// Exact equality on a single-valued field.
    Equals { field: String, value: FilterValue },
    /// Ordering comparison.
    Compare {
        field: String,
        op: CompareOp,
        value: FilterValue,
    },
    /// Inclusive range, folded from a `>=` / `<=` pair on the same field.
    InRange {
        field: String,
        low: FilterValue,
        high: FilterValue,
    },
    /// Membership in a multivalued field, or substring-style string match.
    Contains { field: String, value: FilterValue },
    And { operands: Vec<Predicate> },
    Or { operands: Vec<Predicate> },
    Not { operand: Box<Predicate> },
}

/// One sort key, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: String,
    pub ascending: bool,
}

/// The complete machine-facing output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutableFilter {
    /// Absent for an empty query: match everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<Predicate>,
    pub sort: Vec<SortKey>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn predicates_serialize_with_type_tag() {
        let p = Predicate::And {
            operands: vec![
                Predicate::Compare {
                    field: "score".to_string(),
                    op: CompareOp::GreaterEq,
                    value: FilterValue::Decimal(8.0),
                },
                Predicate::Contains {
                    field: "artist".to_string(),
                    value: FilterValue::String("jane doe".to_string()),
                },
            ],
        };
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({
                "type": "and",
                "operands": [
                    {"type": "compare", "field": "score", "op": ">=", "value": 8.0},
                    {"type": "contains", "field": "artist", "value": "jane doe"},
                ],
            })
        );
    }

    #[test]
    fn empty_filter_omits_root() {
        let filter = ExecutableFilter {
            root: None,
            sort: vec![SortKey {
                field: "score".to_string(),
                ascending: false,
            }],
        };
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"sort": [{"field": "score", "ascending": false}]})
        );
    }
}

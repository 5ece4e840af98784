//! Translation: the resolved query into the executable filter.
//!
//! Lowering is mostly structural. The one optimization that lives here is
//! range folding: a `>=` / `<=` pair on the same field inside one conjunction
//! becomes a single `InRange` predicate so backends can use one index scan.

pub mod annotation;
pub mod filter;

pub use annotation::{AnnotationRole, VisualAnnotation, annotate};
pub use filter::{ExecutableFilter, FilterValue, Predicate, SortKey};

use crate::analyze::{SemanticKind, SemanticNode, SemanticQuery};
use crate::dialect::{CompareOp, ValueType};

/// Lowers the semantic query into a filter. Placeholders vanish here; the
/// error diagnostics that produced them withhold the filter upstream.
pub fn translate(semantic: &SemanticQuery) -> ExecutableFilter {
    ExecutableFilter {
        root: semantic.root.as_ref().and_then(lower),
        sort: semantic
            .sort
            .iter()
            .map(|entry| SortKey {
                field: entry.field.clone(),
                ascending: entry.ascending,
            })
            .collect(),
    }
}

fn lower(node: &SemanticNode) -> Option<Predicate> {
    match &node.kind {
        SemanticKind::And(children) => {
            let operands = fold_ranges(children.iter().filter_map(lower).collect());
            combine(operands, |operands| Predicate::And { operands })
        }
        SemanticKind::Or(children) => {
            let operands: Vec<Predicate> = children.iter().filter_map(lower).collect();
            combine(operands, |operands| Predicate::Or { operands })
        }
        SemanticKind::Not(inner) => lower(inner).map(|operand| Predicate::Not {
            operand: Box::new(operand),
        }),
        SemanticKind::Comparison {
            field,
            operator,
            value,
        } => {
            let value = FilterValue::from(value.clone());
            let name = field.name.clone();
            let predicate = if operator.is_ordering() {
                Predicate::Compare {
                    field: name,
                    op: *operator,
                    value,
                }
            } else if field.multivalued {
                // Both `:` and `=` mean membership on a collection.
                Predicate::Contains { field: name, value }
            } else if *operator == CompareOp::Match && field.value_type == ValueType::String {
                Predicate::Contains { field: name, value }
            } else {
                Predicate::Equals { field: name, value }
            };
            Some(predicate)
        }
        SemanticKind::Tag { field, text } => Some(Predicate::Contains {
            field: field.name.clone(),
            value: FilterValue::String(text.clone()),
        }),
        SemanticKind::Placeholder => None,
    }
}

fn combine(mut operands: Vec<Predicate>, wrap: impl FnOnce(Vec<Predicate>) -> Predicate) -> Option<Predicate> {
    match operands.len() {
        0 => None,
        1 => operands.pop(),
        _ => Some(wrap(operands)),
    }
}

/// Folds `field >= low` and `field <= high` on the same field into one
/// inclusive `InRange`. Only this exact pair folds; mixing strict bounds
/// keeps the individual comparisons.
fn fold_ranges(operands: Vec<Predicate>) -> Vec<Predicate> {
    let mut out: Vec<Predicate> = Vec::with_capacity(operands.len());
    for predicate in operands {
        let Predicate::Compare { field, op, value } = predicate else {
            out.push(predicate);
            continue;
        };
        let partner = out.iter().position(|p| match p {
            Predicate::Compare {
                field: other,
                op: other_op,
                ..
            } => {
                *other == field
                    && matches!(
                        (op, other_op),
                        (CompareOp::GreaterEq, CompareOp::LessEq)
                            | (CompareOp::LessEq, CompareOp::GreaterEq)
                    )
            }
            _ => false,
        });
        match partner {
            Some(index) => {
                let Predicate::Compare {
                    op: other_op,
                    value: other_value,
                    ..
                } = out.remove(index)
                else {
                    unreachable!("position matched a Compare");
                };
                let (low, high) = if other_op == CompareOp::GreaterEq {
                    (other_value, value)
                } else {
                    (value, other_value)
                };
                out.insert(index, Predicate::InRange { field, low, high });
            }
            None => out.push(Predicate::Compare { field, op, value }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::analyze;
    use crate::dialect::DialectRegistry;
    use crate::diagnostics::Diagnostics;
    use crate::parser::parse;

    fn translate_text(text: &str) -> ExecutableFilter {
        let registry = DialectRegistry::builtin();
        let dialect = registry.lookup("illustration").unwrap();
        let parse = parse(text);
        let syntax = parse.syntax();
        let mut diagnostics = Diagnostics::new();
        let semantic = analyze(&syntax, dialect, &mut diagnostics);
        translate(&semantic)
    }

    #[test]
    fn conjunction_of_compare_and_contains() {
        let filter = translate_text("score>=8 & artist:\"jane doe\"");
        assert_eq!(
            filter.root,
            Some(Predicate::And {
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
            })
        );
    }

    #[test]
    fn boolean_structure_with_negation() {
        let filter = translate_text("tag1 -tag2 | tag3");
        let tag = |t: &str| Predicate::Contains {
            field: "tag".to_string(),
            value: FilterValue::String(t.to_string()),
        };
        assert_eq!(
            filter.root,
            Some(Predicate::Or {
                operands: vec![
                    Predicate::And {
                        operands: vec![
                            tag("tag1"),
                            Predicate::Not {
                                operand: Box::new(tag("tag2")),
                            },
                        ],
                    },
                    tag("tag3"),
                ],
            })
        );
    }

    #[test]
    fn range_folding() {
        let filter = translate_text("score>=5 score<=8");
        assert_eq!(
            filter.root,
            Some(Predicate::InRange {
                field: "score".to_string(),
                low: FilterValue::Decimal(5.0),
                high: FilterValue::Decimal(8.0),
            })
        );

        // Strict bounds stay separate.
        let filter = translate_text("score>5 score<=8");
        assert!(matches!(filter.root, Some(Predicate::And { ref operands }) if operands.len() == 2));
    }

    #[test]
    fn equality_forms() {
        // Exact equality on a single-valued string field.
        let filter = translate_text("description=exact");
        assert_eq!(
            filter.root,
            Some(Predicate::Equals {
                field: "description".to_string(),
                value: FilterValue::String("exact".to_string()),
            })
        );
        // Match on a single-valued string field is a loose contains.
        let filter = translate_text("description:loose");
        assert!(matches!(filter.root, Some(Predicate::Contains { .. })));
        // Flags compare by equality even with `:`.
        let filter = translate_text("favorite:true");
        assert_eq!(
            filter.root,
            Some(Predicate::Equals {
                field: "favorite".to_string(),
                value: FilterValue::Bool(true),
            })
        );
    }

    #[test]
    fn empty_and_sort_only_queries() {
        let filter = translate_text("");
        assert_eq!(filter.root, None);
        assert!(filter.sort.is_empty());

        let filter = translate_text("order:score-,id");
        assert_eq!(filter.root, None);
        assert_eq!(
            filter.sort,
            vec![
                SortKey {
                    field: "score".to_string(),
                    ascending: false,
                },
                SortKey {
                    field: "id".to_string(),
                    ascending: true,
                },
            ]
        );
    }

    #[test]
    fn single_operand_connectives_unwrap() {
        // The unknown field drops out of the conjunction, leaving one operand.
        let registry = DialectRegistry::builtin();
        let dialect = registry.lookup("illustration").unwrap();
        let parse = parse("bogus:5 score>=8");
        let syntax = parse.syntax();
        let mut diagnostics = Diagnostics::new();
        let semantic = analyze(&syntax, dialect, &mut diagnostics);
        let filter = translate(&semantic);
        assert!(matches!(filter.root, Some(Predicate::Compare { .. })));
    }
}

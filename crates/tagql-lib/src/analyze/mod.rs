//! Semantic analysis: resolves the dialect-agnostic CST against one dialect.
//!
//! The analyzer never fails. Clauses that cannot be resolved (unknown field,
//! bad operator, uncoercible value) collapse into [`SemanticKind::Placeholder`]
//! and the walk continues, so every clause in the query gets feedback in one
//! pass rather than stopping at the first problem.

pub mod values;

use rowan::TextRange;

use crate::ast::{Expr, FieldTerm, Query, SimpleTag, SortClause};
use crate::dialect::{CompareOp, Dialect, FieldSpec, ValueType};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::syntax::kind::SyntaxNode;

pub use values::ResolvedValue;

/// Resolved form of the query, the translator's input.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticQuery {
    /// Absent for an empty query (match everything).
    pub root: Option<SemanticNode>,
    pub sort: Vec<SortEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticNode {
    pub span: TextRange,
    pub kind: SemanticKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SemanticKind {
    And(Vec<SemanticNode>),
    Or(Vec<SemanticNode>),
    Not(Box<SemanticNode>),
    Comparison {
        field: FieldRef,
        operator: CompareOp,
        value: ResolvedValue,
    },
    /// A bare tag, resolved against the dialect's default tag field.
    Tag { field: FieldRef, text: String },
    /// Stands in for a clause that failed to resolve. Keeps siblings
    /// analyzable; the corresponding diagnostic withholds the filter anyway.
    Placeholder,
}

/// The slice of a [`FieldSpec`] the translator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub name: String,
    pub multivalued: bool,
    pub value_type: ValueType,
}

impl FieldRef {
    fn new(name: &str, spec: &FieldSpec) -> Self {
        Self {
            name: name.to_string(),
            multivalued: spec.multivalued,
            value_type: spec.value_type,
        }
    }
}

/// One validated sort key, in query order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortEntry {
    pub field: String,
    pub ascending: bool,
    pub span: TextRange,
}

/// Resolves the tree rooted at `root` (a `Query` node) against `dialect`.
pub fn analyze(root: &SyntaxNode, dialect: &Dialect, diagnostics: &mut Diagnostics) -> SemanticQuery {
    let analyzer = Analyzer {
        dialect,
        diagnostics,
    };
    analyzer.run(root)
}

struct Analyzer<'a> {
    dialect: &'a Dialect,
    diagnostics: &'a mut Diagnostics,
}

impl Analyzer<'_> {
    fn run(mut self, root: &SyntaxNode) -> SemanticQuery {
        let Some(query) = Query::cast(root.clone()) else {
            return SemanticQuery {
                root: None,
                sort: Vec::new(),
            };
        };

        // Recovery can leave several top-level clauses; they conjoin so every
        // span still reaches the analyzer.
        let mut nodes: Vec<SemanticNode> = query
            .exprs()
            .map(|expr| self.analyze_expr(&expr))
            .collect();
        let root = match nodes.len() {
            0 => None,
            1 => nodes.pop(),
            _ => {
                let span = TextRange::new(
                    nodes[0].span.start(),
                    nodes[nodes.len() - 1].span.end(),
                );
                Some(SemanticNode {
                    span,
                    kind: SemanticKind::And(nodes),
                })
            }
        };

        let sort = match query.sort_clause() {
            Some(clause) => self.analyze_sort(&clause),
            None => Vec::new(),
        };

        SemanticQuery { root, sort }
    }

    fn analyze_expr(&mut self, expr: &Expr) -> SemanticNode {
        let span = expr.syntax().text_range();
        let kind = match expr {
            Expr::Or(or) => {
                SemanticKind::Or(or.operands().map(|e| self.analyze_expr(&e)).collect())
            }
            Expr::And(and) => {
                SemanticKind::And(and.operands().map(|e| self.analyze_expr(&e)).collect())
            }
            Expr::Not(not) => match not.operand() {
                Some(inner) => SemanticKind::Not(Box::new(self.analyze_expr(&inner))),
                // Operand missing after recovery; the parser already reported it.
                None => SemanticKind::Placeholder,
            },
            Expr::Group(group) => match group.inner() {
                Some(inner) => return self.analyze_expr(&inner),
                None => SemanticKind::Placeholder,
            },
            Expr::FieldTerm(term) => self.analyze_field_term(term),
            Expr::SimpleTag(tag) => self.analyze_simple_tag(tag),
        };
        SemanticNode { span, kind }
    }

    fn analyze_field_term(&mut self, term: &FieldTerm) -> SemanticKind {
        let Some(path) = term.path() else {
            return SemanticKind::Placeholder;
        };
        let path_text = path.text();
        let path_span = path.syntax().text_range();

        let Some((canonical, spec)) = self.dialect.resolve_field(&path_text) else {
            self.diagnostics
                .report(DiagnosticKind::UnknownField, path_span)
                .message(&path_text)
                .emit();
            return SemanticKind::Placeholder;
        };
        // Clone out of the dialect so the borrow does not pin `self`.
        let canonical = canonical.to_string();
        let spec = spec.clone();

        // Missing operator or value was already reported during parsing.
        let Some(op_token) = term.operator() else {
            return SemanticKind::Placeholder;
        };
        let Some(operator) = CompareOp::from_kind(op_token.kind()) else {
            return SemanticKind::Placeholder;
        };
        if !spec.operators.contains(operator) {
            self.diagnostics
                .report(DiagnosticKind::InvalidOperator, op_token.text_range())
                .message(format!(
                    "operator `{operator}` is not allowed for field `{canonical}` (allowed: {})",
                    spec.operators.describe()
                ))
                .emit();
            return SemanticKind::Placeholder;
        }

        let Some(value_token) = term.value().and_then(|v| v.token()) else {
            return SemanticKind::Placeholder;
        };
        match values::coerce(
            &canonical,
            &spec,
            value_token.kind(),
            value_token.text(),
        ) {
            Ok(value) => SemanticKind::Comparison {
                field: FieldRef::new(&canonical, &spec),
                operator,
                value,
            },
            Err(err) => {
                self.diagnostics
                    .report(err.kind, value_token.text_range())
                    .message(err.message)
                    .emit();
                SemanticKind::Placeholder
            }
        }
    }

    fn analyze_simple_tag(&mut self, tag: &SimpleTag) -> SemanticKind {
        let Some(token) = tag.token() else {
            return SemanticKind::Placeholder;
        };
        let (name, spec) = self.dialect.default_tag_field();
        SemanticKind::Tag {
            field: FieldRef::new(name, spec),
            text: values::literal_text(token.kind(), token.text()),
        }
    }

    fn analyze_sort(&mut self, clause: &SortClause) -> Vec<SortEntry> {
        let mut entries: Vec<SortEntry> = Vec::new();
        for field in clause.fields() {
            let Some(name_token) = field.name() else {
                continue;
            };
            let span = field.syntax().text_range();
            let written = name_token.text();

            let Some((canonical, spec)) = self.dialect.resolve_field(written) else {
                self.diagnostics
                    .report(DiagnosticKind::UnknownField, name_token.text_range())
                    .message(written)
                    .emit();
                continue;
            };
            if !spec.sortable {
                self.diagnostics
                    .report(DiagnosticKind::UnsortableField, name_token.text_range())
                    .message(format!("field `{canonical}` cannot be used for sorting"))
                    .emit();
                continue;
            }
            if entries.iter().any(|e| e.field == canonical) {
                // Warning only: the first occurrence wins, the filter survives.
                self.diagnostics
                    .report(DiagnosticKind::DuplicateSortField, span)
                    .message(format!("duplicate sort field `{canonical}`"))
                    .emit();
                continue;
            }
            entries.push(SortEntry {
                field: canonical.to_string(),
                ascending: !field.is_descending(),
                span,
            });
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectRegistry;
    use crate::parser::parse;

    fn analyze_text(text: &str) -> (SemanticQuery, Diagnostics) {
        let registry = DialectRegistry::builtin();
        let dialect = registry.lookup("illustration").unwrap();
        let parse = parse(text);
        let syntax = parse.syntax();
        let (_, mut diagnostics) = parse.into_parts();
        let semantic = analyze(&syntax, dialect, &mut diagnostics);
        (semantic, diagnostics)
    }

    #[test]
    fn comparison_and_string_term() {
        let (semantic, diagnostics) = analyze_text("score>=8 & artist:\"jane doe\"");
        assert!(diagnostics.is_empty());
        let root = semantic.root.unwrap();
        let SemanticKind::And(operands) = root.kind else {
            panic!("expected And, got {:?}", root.kind);
        };
        assert_eq!(operands.len(), 2);
        assert!(matches!(
            &operands[0].kind,
            SemanticKind::Comparison {
                field,
                operator: CompareOp::GreaterEq,
                value: ResolvedValue::Decimal(v),
            } if field.name == "score" && *v == 8.0
        ));
        assert!(matches!(
            &operands[1].kind,
            SemanticKind::Comparison {
                field,
                operator: CompareOp::Match,
                value: ResolvedValue::String(s),
            } if field.name == "artist" && s == "jane doe"
        ));
    }

    #[test]
    fn bare_tags_use_default_field() {
        let (semantic, diagnostics) = analyze_text("tag1 -tag2 | tag3");
        assert!(diagnostics.is_empty());
        let root = semantic.root.unwrap();
        let SemanticKind::Or(arms) = root.kind else {
            panic!("expected Or");
        };
        assert_eq!(arms.len(), 2);
        let SemanticKind::And(conj) = &arms[0].kind else {
            panic!("expected And");
        };
        assert!(matches!(
            &conj[0].kind,
            SemanticKind::Tag { field, text } if field.name == "tag" && text == "tag1"
        ));
        assert!(matches!(&conj[1].kind, SemanticKind::Not(_)));
    }

    #[test]
    fn unknown_field_leaves_placeholder_and_sibling_survives() {
        let (semantic, diagnostics) = analyze_text("unknownfield:5 score>=8");
        assert_eq!(diagnostics.error_count(), 1);
        let d = &diagnostics.as_slice()[0];
        assert_eq!(d.code(), "unknown-field");
        assert_eq!(d.message, "unknown field `unknownfield`");
        assert_eq!(
            (u32::from(d.range.start()), u32::from(d.range.end())),
            (0, 12)
        );

        let root = semantic.root.unwrap();
        let SemanticKind::And(operands) = root.kind else {
            panic!("expected And");
        };
        assert!(matches!(operands[0].kind, SemanticKind::Placeholder));
        assert!(matches!(operands[1].kind, SemanticKind::Comparison { .. }));
    }

    #[test]
    fn type_mismatch_spans_the_value() {
        let (_, diagnostics) = analyze_text("score>=abc");
        assert_eq!(diagnostics.error_count(), 1);
        let d = &diagnostics.as_slice()[0];
        assert_eq!(d.code(), "type-mismatch");
        assert_eq!(d.message, "field `score` expects a number, got `abc`");
        assert_eq!(
            (u32::from(d.range.start()), u32::from(d.range.end())),
            (7, 10)
        );
    }

    #[test]
    fn ordering_operator_rejected_on_string_field() {
        let (_, diagnostics) = analyze_text("artist>5");
        assert_eq!(diagnostics.error_count(), 1);
        let d = &diagnostics.as_slice()[0];
        assert_eq!(d.code(), "invalid-operator");
        assert!(d.message.contains("operator `>` is not allowed for field `artist`"));
    }

    #[test]
    fn enum_resolution_through_comparison() {
        let (semantic, diagnostics) = analyze_text("tagme:au");
        assert!(diagnostics.is_empty());
        let root = semantic.root.unwrap();
        assert!(matches!(
            root.kind,
            SemanticKind::Comparison {
                value: ResolvedValue::Enum(ref name),
                ..
            } if name == "AUTHOR"
        ));
    }

    #[test]
    fn sort_validation() {
        let (semantic, diagnostics) = analyze_text("order:s-,score,artist,bogus");
        // duplicate `score` (via alias `s`), unsortable `artist`, unknown `bogus`
        assert_eq!(diagnostics.error_count(), 2);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(semantic.sort.len(), 1);
        assert_eq!(semantic.sort[0].field, "score");
        assert!(!semantic.sort[0].ascending);

        let codes: Vec<&str> = diagnostics.iter().map(|d| d.code()).collect();
        assert!(codes.contains(&"duplicate-sort"));
        assert!(codes.contains(&"invalid-operator"));
        assert!(codes.contains(&"unknown-field"));
    }

    #[test]
    fn empty_query_has_no_root() {
        let (semantic, diagnostics) = analyze_text("");
        assert!(diagnostics.is_empty());
        assert!(semantic.root.is_none());
        assert!(semantic.sort.is_empty());
    }
}

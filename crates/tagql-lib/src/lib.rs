//! tagql: a query-language compiler for tagged-media search.
//!
//! The pipeline is lexer → parser → semantic analyzer → translator:
//!
//! - [`parser::parse`] turns text into a lossless concrete syntax tree with
//!   panic-mode recovery; it knows nothing about any dialect.
//! - [`analyze::analyze`] resolves fields, operators and values against one
//!   [`dialect::Dialect`], a table of per-entity-kind vocabulary.
//! - [`translate::translate`] lowers the result into an [`ExecutableFilter`]
//!   for the storage layer, while [`translate::annotate`] derives the
//!   [`VisualAnnotation`] stream for the UI from the same tree.
//!
//! Problems at any stage accumulate as [`Diagnostic`]s; nothing past dialect
//! lookup ever fails. The filter is withheld whenever an error-severity
//! diagnostic exists, but annotations and diagnostics are always produced.
//!
//! ```
//! use tagql_lib::compile;
//!
//! let result = compile("score>=8 & artist:\"jane doe\"", "illustration").unwrap();
//! assert!(result.filter.is_some());
//! assert!(result.diagnostics.is_empty());
//! ```

pub mod analyze;
pub mod ast;
pub mod dialect;
pub mod diagnostics;
pub mod parser;
pub mod syntax;
pub mod translate;

use std::sync::LazyLock;

use serde::Serialize;

pub use crate::dialect::{Dialect, DialectRegistry};
pub use crate::diagnostics::{Diagnostic, Diagnostics, DiagnosticsPrinter, Severity};
pub use crate::parser::{Parse, parse};
pub use crate::translate::{ExecutableFilter, Predicate, VisualAnnotation};

/// Failures of the compiler surface itself, as opposed to problems with the
/// query text (those are [`Diagnostic`]s).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: unknown dialect `{0}`")]
    UnknownDialect(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The complete output of one compilation.
#[derive(Debug, Clone, Serialize)]
pub struct CompileResult {
    /// Present only when no error-severity diagnostic exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<ExecutableFilter>,
    /// One per significant token, ordered by span start. Always present.
    pub annotations: Vec<VisualAnnotation>,
    /// Ordered by span start.
    pub diagnostics: Vec<Diagnostic>,
}

static BUILTIN: LazyLock<DialectRegistry> = LazyLock::new(DialectRegistry::builtin);

/// The built-in dialect catalog.
pub fn builtin_dialects() -> &'static DialectRegistry {
    &BUILTIN
}

/// Compiles `text` against a built-in dialect.
///
/// The only failure is an unknown dialect identifier, which aborts before
/// lexing. Everything else is reported through the result's diagnostics.
pub fn compile(text: &str, dialect_id: &str) -> Result<CompileResult> {
    let dialect = BUILTIN.lookup(dialect_id)?;
    Ok(compile_with(text, dialect))
}

/// Compiles `text` against an already-resolved dialect. Never fails.
pub fn compile_with(text: &str, dialect: &Dialect) -> CompileResult {
    let parse = parser::parse(text);
    let syntax = parse.syntax();
    let (_, mut diagnostics) = parse.into_parts();

    let semantic = analyze::analyze(&syntax, dialect, &mut diagnostics);
    let filter = translate::translate(&semantic);
    let annotations = translate::annotate(&syntax, &diagnostics);
    diagnostics.sort_by_span();

    CompileResult {
        filter: (!diagnostics.has_errors()).then_some(filter),
        annotations,
        diagnostics: diagnostics.into_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{CompareOp, FieldSpec, OperatorSet, ValueType};
    use crate::translate::{FilterValue, SortKey};

    #[test]
    fn valid_query_produces_filter_and_clean_diagnostics() {
        let result = compile("score>=8 & artist:\"jane doe\"", "illustration").unwrap();
        assert!(result.diagnostics.is_empty());
        let filter = result.filter.unwrap();
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
    fn type_mismatch_withholds_filter_but_keeps_annotations() {
        let result = compile("score>=abc", "illustration").unwrap();
        assert!(result.filter.is_none());
        assert_eq!(result.diagnostics.len(), 1);
        let d = &result.diagnostics[0];
        assert_eq!(d.code(), "type-mismatch");
        assert_eq!(
            (u32::from(d.range.start()), u32::from(d.range.end())),
            (7, 10)
        );
        // All three tokens still annotated; only the value is invalid.
        assert_eq!(result.annotations.len(), 3);
        assert!(result.annotations[0].valid);
        assert!(!result.annotations[2].valid);
    }

    #[test]
    fn unknown_field_spans_the_field() {
        let result = compile("unknownfield:5", "illustration").unwrap();
        assert!(result.filter.is_none());
        assert_eq!(result.diagnostics.len(), 1);
        let d = &result.diagnostics[0];
        assert_eq!(d.code(), "unknown-field");
        assert_eq!(
            (u32::from(d.range.start()), u32::from(d.range.end())),
            (0, 12)
        );
    }

    #[test]
    fn precedence_of_implicit_and_over_or() {
        let result = compile("tag1 -tag2 | tag3", "illustration").unwrap();
        let tag = |t: &str| Predicate::Contains {
            field: "tag".to_string(),
            value: FilterValue::String(t.to_string()),
        };
        assert_eq!(
            result.filter.unwrap().root,
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
    fn grouping_changes_structure() {
        let a = compile("tag1 & (tag2 | tag3)", "illustration").unwrap();
        let b = compile("(tag1 & tag2) | tag3", "illustration").unwrap();
        assert_ne!(a.filter.unwrap().root, b.filter.unwrap().root);
    }

    #[test]
    fn unknown_dialect_aborts_before_lexing() {
        let err = compile("anything", "nope").unwrap_err();
        assert!(matches!(err, Error::UnknownDialect(ref id) if id == "nope"));
        assert_eq!(
            err.to_string(),
            "configuration error: unknown dialect `nope`"
        );
    }

    #[test]
    fn compilation_is_idempotent() {
        let text = "score>=5 score<=8 | -tag1 order:id-,score";
        let a = compile(text, "illustration").unwrap();
        let b = compile(text, "illustration").unwrap();
        assert_eq!(a.filter, b.filter);
        assert_eq!(a.annotations, b.annotations);
    }

    #[test]
    fn annotations_cover_every_non_whitespace_token_even_on_garbage() {
        let text = "score>= & %% (tag1";
        let result = compile(text, "illustration").unwrap();
        assert!(result.filter.is_none());
        let covered: usize = result
            .annotations
            .iter()
            .map(|a| usize::from(a.span.len()))
            .sum();
        let non_ws = text.chars().filter(|c| !c.is_whitespace()).count();
        assert_eq!(covered, non_ws);
    }

    #[test]
    fn diagnostics_are_ordered_by_span() {
        let result = compile("bogus:1 score>=abc", "illustration").unwrap();
        for pair in result.diagnostics.windows(2) {
            assert!(pair[0].range.start() <= pair[1].range.start());
        }
    }

    #[test]
    fn warning_alone_keeps_the_filter() {
        let result = compile("tag1 order:score,score", "illustration").unwrap();
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code(), "duplicate-sort");
        let filter = result.filter.unwrap();
        assert_eq!(
            filter.sort,
            vec![SortKey {
                field: "score".to_string(),
                ascending: true,
            }]
        );
    }

    #[test]
    fn dotted_field_paths_resolve_like_plain_ones() {
        let string_spec = |multivalued| FieldSpec {
            value_type: ValueType::String,
            multivalued,
            operators: OperatorSet::EQUALITY,
            enum_values: Vec::new(),
            sortable: false,
        };
        let dialect = Dialect::builder("series")
            .field(&["title"], string_spec(true))
            .field(&["author.name", "an"], string_spec(false))
            .default_tag_field("title")
            .build();

        let result = compile_with("author.name:jane", &dialect);
        assert!(result.diagnostics.is_empty());
        let root = result.filter.unwrap().root;
        assert_eq!(
            root,
            Some(Predicate::Contains {
                field: "author.name".to_string(),
                value: FilterValue::String("jane".to_string()),
            })
        );

        // The alias lands on the same canonical dotted name.
        let aliased = compile_with("an:jane", &dialect);
        assert_eq!(aliased.filter.unwrap().root, root);
    }

    #[test]
    fn result_serializes_for_the_api_surface() {
        let result = compile("score>=8", "illustration").unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["filter"]["root"].is_object());
        assert_eq!(json["annotations"][0]["role"], "field");
        assert_eq!(json["annotations"][0]["span"]["start"], 0);
        assert_eq!(json["diagnostics"], serde_json::json!([]));
    }
}

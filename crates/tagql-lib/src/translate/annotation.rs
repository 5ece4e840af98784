//! The annotation stream: the human-facing half of the compiler's output.
//!
//! Annotations are produced from the lossless CST, one per significant token
//! in source order, so an editor can color every character the user typed.
//! Validity is derived by intersecting token spans with error diagnostics.

use rowan::TextRange;
use serde::Serialize;

use crate::diagnostics::Diagnostics;
use crate::syntax::kind::token_sets::CMP_OPS;
use crate::syntax::kind::{SyntaxKind, SyntaxNode, SyntaxToken};

/// What a span means, for syntax highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationRole {
    /// A field name (including `.` path separators).
    Field,
    /// A comparison operator or boolean connective.
    Operator,
    /// The right-hand side of a comparison.
    Value,
    /// A bare tag term.
    LiteralTag,
    /// Grouping parentheses.
    Group,
    /// Anything inside the sort clause, marker included.
    Sort,
}

/// One highlighted span of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualAnnotation {
    #[serde(serialize_with = "crate::diagnostics::serialize_text_range")]
    pub span: TextRange,
    pub role: AnnotationRole,
    /// `false` when an error diagnostic overlaps this span.
    pub valid: bool,
    /// The overlapping diagnostic's message, for hover tooltips.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Walks every non-trivia token under `root` and builds the stream.
pub fn annotate(root: &SyntaxNode, diagnostics: &Diagnostics) -> Vec<VisualAnnotation> {
    let mut out = Vec::new();
    for element in root.descendants_with_tokens() {
        let Some(token) = element.into_token() else {
            continue;
        };
        if token.kind().is_trivia() {
            continue;
        }
        let span = token.text_range();
        let overlapping = diagnostics
            .iter()
            .find(|d| d.is_error() && touches(span, d.range));
        out.push(VisualAnnotation {
            span,
            role: role_for(&token),
            valid: overlapping.is_none(),
            message: overlapping.map(|d| d.message.clone()),
        });
    }
    out
}

/// Role from the nearest enclosing node, falling back to the token kind for
/// tokens inside `Error` nodes.
fn role_for(token: &SyntaxToken) -> AnnotationRole {
    for ancestor in token.parent_ancestors() {
        match ancestor.kind() {
            SyntaxKind::FieldPath => return AnnotationRole::Field,
            SyntaxKind::Value => return AnnotationRole::Value,
            SyntaxKind::SimpleTag => return AnnotationRole::LiteralTag,
            SyntaxKind::SortField | SyntaxKind::SortClause => return AnnotationRole::Sort,
            _ => {}
        }
    }
    match token.kind() {
        kind if CMP_OPS.contains(kind) => AnnotationRole::Operator,
        SyntaxKind::Pipe | SyntaxKind::Ampersand | SyntaxKind::Minus => AnnotationRole::Operator,
        SyntaxKind::ParenOpen | SyntaxKind::ParenClose => AnnotationRole::Group,
        SyntaxKind::SortMarker => AnnotationRole::Sort,
        _ => AnnotationRole::LiteralTag,
    }
}

/// Overlap test. Zero-width diagnostics (insertion points) count as touching
/// the token that contains their position.
fn touches(token: TextRange, diagnostic: TextRange) -> bool {
    if diagnostic.is_empty() {
        token.start() <= diagnostic.start() && diagnostic.start() < token.end()
    } else {
        token.start() < diagnostic.end() && diagnostic.start() < token.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn annotate_text(text: &str) -> Vec<VisualAnnotation> {
        let parse = parse(text);
        annotate(&parse.syntax(), parse.diagnostics())
    }

    fn spans_and_roles(annotations: &[VisualAnnotation]) -> Vec<(u32, u32, AnnotationRole)> {
        annotations
            .iter()
            .map(|a| (a.span.start().into(), a.span.end().into(), a.role))
            .collect()
    }

    #[test]
    fn field_term_roles() {
        let annotations = annotate_text("score>=8");
        assert_eq!(
            spans_and_roles(&annotations),
            vec![
                (0, 5, AnnotationRole::Field),
                (5, 7, AnnotationRole::Operator),
                (7, 8, AnnotationRole::Value),
            ]
        );
        assert!(annotations.iter().all(|a| a.valid));
    }

    #[test]
    fn connectives_tags_and_sort() {
        let annotations = annotate_text("tag1 | tag2 order:score-");
        assert_eq!(
            spans_and_roles(&annotations),
            vec![
                (0, 4, AnnotationRole::LiteralTag),
                (5, 6, AnnotationRole::Operator),
                (7, 11, AnnotationRole::LiteralTag),
                (12, 18, AnnotationRole::Sort),
                (18, 23, AnnotationRole::Sort),
                (23, 24, AnnotationRole::Sort),
            ]
        );
    }

    #[test]
    fn group_parens() {
        let annotations = annotate_text("(a)");
        assert_eq!(annotations[0].role, AnnotationRole::Group);
        assert_eq!(annotations[2].role, AnnotationRole::Group);
    }

    #[test]
    fn error_overlap_marks_invalid_with_message() {
        let parse = parse("score>=8");
        let mut diagnostics = parse.diagnostics().clone();
        diagnostics
            .report(crate::diagnostics::DiagnosticKind::TypeMismatch, TextRange::new(7.into(), 8.into()))
            .message("field `score` expects a number, got `x`")
            .emit();
        let annotations = annotate(&parse.syntax(), &diagnostics);
        let value = &annotations[2];
        assert!(!value.valid);
        assert!(value.message.as_deref().unwrap().contains("expects a number"));
        // The untouched tokens stay valid.
        assert!(annotations[0].valid);
        assert!(annotations[1].valid);
    }

    #[test]
    fn annotations_cover_all_non_whitespace() {
        let text = "score>=8 & (tag1 | -tag2) order:id";
        let annotations = annotate_text(text);
        let covered: usize = annotations
            .iter()
            .map(|a| usize::from(a.span.len()))
            .sum();
        let non_ws = text.chars().filter(|c| !c.is_whitespace()).count();
        assert_eq!(covered, non_ws);
        // Source order, no overlaps.
        for pair in annotations.windows(2) {
            assert!(pair[0].span.end() <= pair[1].span.start());
        }
    }
}

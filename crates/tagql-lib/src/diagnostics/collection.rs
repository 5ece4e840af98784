//! Diagnostics collection for accumulating compiler messages.

use rowan::TextRange;

use super::message::{Diagnostic, DiagnosticKind, RelatedInfo, Severity};

/// Collection of diagnostic messages from lexing, parsing, and analysis.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Starts a diagnostic for `kind` at `range`. Call `.emit()` to record it.
    #[must_use = "the diagnostic is only recorded by calling emit()"]
    pub fn report(&mut self, kind: DiagnosticKind, range: TextRange) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            kind,
            range,
            detail: None,
            related: Vec::new(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.0.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.0.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.0.iter().filter(|d| d.is_warning()).count()
    }

    pub fn filter_by_severity(&self, severity: Severity) -> Vec<&Diagnostic> {
        self.0.iter().filter(|d| d.severity() == severity).collect()
    }

    /// Orders diagnostics by span start, matching the annotation stream.
    pub fn sort_by_span(&mut self) {
        self.0.sort_by_key(|d| (d.range.start(), d.range.end()));
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Diagnostic> for Diagnostics {
    fn from_iter<T: IntoIterator<Item = Diagnostic>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builder returned by [`Diagnostics::report`].
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    kind: DiagnosticKind,
    range: TextRange,
    detail: Option<String>,
    related: Vec<RelatedInfo>,
}

impl DiagnosticBuilder<'_> {
    /// Detail substituted into the kind's message template.
    #[must_use]
    pub fn message(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Points at a second location, e.g. where an unclosed group started.
    #[must_use]
    pub fn related_to(mut self, range: TextRange, message: impl Into<String>) -> Self {
        self.related.push(RelatedInfo::new(range, message));
        self
    }

    pub fn emit(self) {
        let message = self.kind.message(self.detail.as_deref());
        let mut diagnostic = Diagnostic::new(self.kind, self.range, message);
        diagnostic.related = self.related;
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(start.into(), end.into())
    }

    #[test]
    fn builder_emits_with_fallback_message() {
        let mut diagnostics = Diagnostics::new();
        diagnostics
            .report(DiagnosticKind::UnclosedGroup, range(3, 4))
            .emit();
        assert_eq!(diagnostics.len(), 1);
        let d = &diagnostics.as_slice()[0];
        assert_eq!(d.message, "missing closing `)`");
        assert_eq!(d.code(), "syntax");
        assert!(d.is_error());
    }

    #[test]
    fn builder_substitutes_detail() {
        let mut diagnostics = Diagnostics::new();
        diagnostics
            .report(DiagnosticKind::UnknownField, range(0, 5))
            .message("artist")
            .emit();
        assert_eq!(diagnostics.as_slice()[0].message, "unknown field `artist`");
        assert_eq!(diagnostics.as_slice()[0].code(), "unknown-field");
    }

    #[test]
    fn sort_by_span_orders_by_start() {
        let mut diagnostics = Diagnostics::new();
        diagnostics
            .report(DiagnosticKind::TypeMismatch, range(10, 13))
            .message("second")
            .emit();
        diagnostics
            .report(DiagnosticKind::UnknownField, range(0, 5))
            .message("first")
            .emit();
        diagnostics.sort_by_span();
        assert_eq!(diagnostics.as_slice()[0].message, "unknown field `first`");
    }

    #[test]
    fn warning_counting() {
        let mut diagnostics = Diagnostics::new();
        diagnostics
            .report(DiagnosticKind::DuplicateSortField, range(0, 5))
            .message("duplicate sort field `score`")
            .emit();
        assert!(!diagnostics.has_errors());
        assert!(diagnostics.has_warnings());
        assert_eq!(diagnostics.warning_count(), 1);
    }
}

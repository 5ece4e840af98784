use rowan::TextRange;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Every kind of problem the compiler can report.
///
/// Each kind maps to one code of the public error taxonomy via [`code`];
/// several kinds can share a code (all parser recovery paths are `syntax`).
///
/// [`code`]: DiagnosticKind::code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    // Lexical
    UnterminatedString,
    UnexpectedCharacters,

    // Syntax
    UnexpectedToken,
    ExpectedClause,
    ExpectedValue,
    ExpectedOperator,
    ExpectedFieldName,
    ExpectedSortField,
    UnclosedGroup,
    RecursionLimit,

    // Semantic
    UnknownField,
    InvalidOperator,
    UnsortableField,
    TypeMismatch,
    UnknownValue,
    AmbiguousValue,
    DuplicateSortField,
}

impl DiagnosticKind {
    /// The taxonomy code surfaced to API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnterminatedString | Self::UnexpectedCharacters => "lexical",
            Self::UnexpectedToken
            | Self::ExpectedClause
            | Self::ExpectedValue
            | Self::ExpectedOperator
            | Self::ExpectedFieldName
            | Self::ExpectedSortField
            | Self::UnclosedGroup
            | Self::RecursionLimit => "syntax",
            Self::UnknownField => "unknown-field",
            Self::InvalidOperator | Self::UnsortableField => "invalid-operator",
            Self::TypeMismatch => "type-mismatch",
            Self::UnknownValue => "unknown-value",
            Self::AmbiguousValue => "ambiguous-value",
            Self::DuplicateSortField => "duplicate-sort",
        }
    }

    /// Default severity for this kind.
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::DuplicateSortField => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Base message for this diagnostic kind, used when no detail is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::UnterminatedString => "unterminated string literal",
            Self::UnexpectedCharacters => "unrecognized characters",
            Self::UnexpectedToken => "unexpected token",
            Self::ExpectedClause => "expected a clause",
            Self::ExpectedValue => "expected a value",
            Self::ExpectedOperator => "expected a comparison operator",
            Self::ExpectedFieldName => "expected a field name after `.`",
            Self::ExpectedSortField => "expected a sort field name",
            Self::UnclosedGroup => "missing closing `)`",
            Self::RecursionLimit => "query is nested too deeply",
            Self::UnknownField => "unknown field",
            Self::InvalidOperator => "operator not allowed for this field",
            Self::UnsortableField => "field cannot be used for sorting",
            Self::TypeMismatch => "value does not match the field type",
            Self::UnknownValue => "value is not a member of this enumeration",
            Self::AmbiguousValue => "value matches more than one enumeration member",
            Self::DuplicateSortField => "duplicate sort field",
        }
    }

    /// Template for detailed messages. Contains `{}` for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnknownField => "unknown field `{}`".to_string(),
            Self::UnexpectedToken => "unexpected token: {}".to_string(),

            // Semantic kinds build the whole sentence at the call site
            Self::InvalidOperator
            | Self::UnsortableField
            | Self::TypeMismatch
            | Self::UnknownValue
            | Self::AmbiguousValue
            | Self::DuplicateSortField => "{}".to_string(),

            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Related location information for a diagnostic.
/// Used to point to where a construct started (e.g., unclosed group).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedInfo {
    #[serde(
        rename = "span",
        serialize_with = "super::serialize_text_range"
    )]
    pub range: TextRange,
    pub message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

/// One accumulated problem: a span, a taxonomy code, a severity, and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub range: TextRange,
    pub message: String,
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let fields = if self.related.is_empty() { 4 } else { 5 };
        let mut state = s.serialize_struct("Diagnostic", fields)?;
        state.serialize_field("span", &SpanRepr::from(self.range))?;
        state.serialize_field("severity", &self.severity())?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("message", &self.message)?;
        if !self.related.is_empty() {
            state.serialize_field("related", &self.related)?;
        }
        state.end()
    }
}

#[derive(Serialize)]
struct SpanRepr {
    start: u32,
    end: u32,
}

impl From<TextRange> for SpanRepr {
    fn from(range: TextRange) -> Self {
        Self {
            start: range.start().into(),
            end: range.end().into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}] at {}..{}: {}",
            self.severity(),
            self.code(),
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        Ok(())
    }
}

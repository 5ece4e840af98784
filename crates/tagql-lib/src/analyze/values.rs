//! Value coercion: raw literal tokens into typed values per the field spec.

use crate::dialect::{EnumEntry, FieldSpec, ValueType};
use crate::diagnostics::DiagnosticKind;
use crate::syntax::kind::SyntaxKind;
use crate::syntax::lexer::unescape_string;

/// A literal after coercion against its field's declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    String(String),
    Integer(i64),
    Decimal(f64),
    /// Normalized `yyyy-mm-dd`.
    Date(String),
    Bool(bool),
    /// Canonical member name from the field's enumeration.
    Enum(String),
}

/// A failed coercion, carrying the full message for the diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueError {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl ValueError {
    fn mismatch(message: String) -> Self {
        Self {
            kind: DiagnosticKind::TypeMismatch,
            message,
        }
    }
}

/// The literal's text with string quoting stripped.
pub(super) fn literal_text(kind: SyntaxKind, raw: &str) -> String {
    match kind {
        SyntaxKind::Str | SyntaxKind::UnterminatedStr => unescape_string(raw),
        _ => raw.to_string(),
    }
}

/// Coerces one literal token against a field spec.
pub(super) fn coerce(
    field: &str,
    spec: &FieldSpec,
    kind: SyntaxKind,
    raw: &str,
) -> Result<ResolvedValue, ValueError> {
    let text = literal_text(kind, raw);
    match spec.value_type {
        ValueType::String => Ok(ResolvedValue::String(text)),
        ValueType::Integer => text.parse::<i64>().map(ResolvedValue::Integer).map_err(|_| {
            ValueError::mismatch(format!("field `{field}` expects an integer, got `{text}`"))
        }),
        ValueType::Decimal => text.parse::<f64>().map(ResolvedValue::Decimal).map_err(|_| {
            ValueError::mismatch(format!("field `{field}` expects a number, got `{text}`"))
        }),
        ValueType::Date => coerce_date(&text).map(ResolvedValue::Date).ok_or_else(|| {
            ValueError::mismatch(format!("field `{field}` expects a date, got `{text}`"))
        }),
        ValueType::Boolean => coerce_bool(&text).map(ResolvedValue::Bool).ok_or_else(|| {
            ValueError::mismatch(format!("field `{field}` expects a boolean, got `{text}`"))
        }),
        ValueType::Enum => resolve_enum(field, &spec.enum_values, &text),
    }
}

/// Accepts `yyyy-mm-dd`, `yyyy-m-d` and the compact `yyyymmdd` form.
/// Returns the normalized zero-padded spelling.
fn coerce_date(text: &str) -> Option<String> {
    let (year, month, day) = if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        (
            text[0..4].parse::<u32>().ok()?,
            text[4..6].parse::<u32>().ok()?,
            text[6..8].parse::<u32>().ok()?,
        )
    } else {
        let mut parts = text.split('-');
        let year = parts.next()?;
        let month = parts.next()?;
        let day = parts.next()?;
        if parts.next().is_some() || year.len() != 4 || month.is_empty() || month.len() > 2 {
            return None;
        }
        if day.is_empty() || day.len() > 2 {
            return None;
        }
        (
            year.parse().ok()?,
            month.parse().ok()?,
            day.parse().ok()?,
        )
    };
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn coerce_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

/// Resolves an enum literal: exact match first, then unique prefix match.
/// Several prefix candidates is an error rather than a silent pick.
fn resolve_enum(
    field: &str,
    members: &[EnumEntry],
    text: &str,
) -> Result<ResolvedValue, ValueError> {
    if let Some(entry) = members.iter().find(|e| e.matches(text)) {
        return Ok(ResolvedValue::Enum(entry.name.clone()));
    }

    let candidates: Vec<&EnumEntry> = members.iter().filter(|e| e.matches_prefix(text)).collect();
    match candidates.len() {
        1 => Ok(ResolvedValue::Enum(candidates[0].name.clone())),
        0 => {
            let expected = member_listing(members);
            let mut message =
                format!("`{text}` is not a member of field `{field}` (expected one of {expected})");
            if let Some(suggestion) = closest_member(members, text) {
                message.push_str(&format!("; did you mean `{suggestion}`?"));
            }
            Err(ValueError {
                kind: DiagnosticKind::UnknownValue,
                message,
            })
        }
        _ => {
            let listing = candidates
                .iter()
                .map(|e| format!("`{}`", e.name))
                .collect::<Vec<_>>()
                .join(", ");
            Err(ValueError {
                kind: DiagnosticKind::AmbiguousValue,
                message: format!(
                    "`{text}` is ambiguous for field `{field}`: matches {listing}"
                ),
            })
        }
    }
}

fn member_listing(members: &[EnumEntry]) -> String {
    members
        .iter()
        .map(|e| format!("`{}`", e.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Closest member within edit distance 2, for the "did you mean" hint.
fn closest_member<'a>(members: &'a [EnumEntry], text: &str) -> Option<&'a str> {
    let text = text.to_ascii_lowercase();
    members
        .iter()
        .map(|e| (e.name.as_str(), edit_distance(&e.name.to_ascii_lowercase(), &text)))
        .filter(|&(_, d)| d <= 2)
        .min_by_key(|&(_, d)| d)
        .map(|(name, _)| name)
}

/// Levenshtein distance, single-row DP.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, &ca) in a.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { prev } else { prev + 1 };
            prev = row[j + 1];
            row[j + 1] = cost.min(row[j] + 1).min(prev + 1);
        }
    }
    row[b.len()]
}

//! Accumulated diagnostics shared by every pipeline stage.
//!
//! Diagnostics are collected, never thrown: each stage reports into one
//! [`Diagnostics`] list and keeps going, so a single malformed clause never
//! blanks the feedback for the rest of the query. The only failure surfaced
//! as a `Result` is an unknown dialect identifier, which aborts before lexing.

mod collection;
mod message;
mod printer;

pub use collection::{DiagnosticBuilder, Diagnostics};
pub use message::{Diagnostic, DiagnosticKind, RelatedInfo, Severity};
pub use printer::DiagnosticsPrinter;

use rowan::TextRange;
use serde::Serializer;
use serde::ser::SerializeStruct;

pub(crate) fn serialize_text_range<S: Serializer>(
    range: &TextRange,
    s: S,
) -> Result<S::Ok, S::Error> {
    let mut state = s.serialize_struct("Span", 2)?;
    state.serialize_field("start", &u32::from(range.start()))?;
    state.serialize_field("end", &u32::from(range.end()))?;
    state.end()
}

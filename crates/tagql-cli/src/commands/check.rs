use tagql_lib::{Diagnostics, compile_with};

use crate::cli::{ColorChoice, QueryArgs};
use crate::util::{load_query, resolve_dialect};

pub fn run(query: &QueryArgs, dialect_id: &str, strict: bool, color: ColorChoice) {
    let text = load_query(query);
    let dialect = resolve_dialect(dialect_id);

    let result = compile_with(&text, dialect);
    let diagnostics: Diagnostics = result.diagnostics.iter().cloned().collect();

    if !diagnostics.is_empty() {
        eprintln!(
            "{}",
            diagnostics
                .printer()
                .source(&text)
                .colored(color.should_colorize())
                .render()
        );
    }

    let failed = if strict {
        diagnostics.has_errors() || diagnostics.has_warnings()
    } else {
        diagnostics.has_errors()
    };
    if failed {
        std::process::exit(1);
    }
    // Silent on success, like `cargo check`.
}

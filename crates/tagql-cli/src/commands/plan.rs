use tagql_lib::{Diagnostics, compile_with};

use crate::cli::{ColorChoice, QueryArgs};
use crate::util::{load_query, resolve_dialect};

pub fn run(query: &QueryArgs, dialect_id: &str, compact: bool, color: ColorChoice) {
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

    let Some(filter) = result.filter else {
        std::process::exit(1);
    };

    let json = if compact {
        serde_json::to_string(&filter)
    } else {
        serde_json::to_string_pretty(&filter)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

use tagql_lib::compile_with;

use crate::cli::QueryArgs;
use crate::util::{load_query, resolve_dialect};

pub fn run(query: &QueryArgs, dialect_id: &str, compact: bool) {
    let text = load_query(query);
    let dialect = resolve_dialect(dialect_id);

    let result = compile_with(&text, dialect);

    // Annotations are always produced, valid query or not.
    let json = if compact {
        serde_json::to_string(&result.annotations)
    } else {
        serde_json::to_string_pretty(&result.annotations)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }

    for diagnostic in &result.diagnostics {
        eprintln!("{diagnostic}");
    }
}

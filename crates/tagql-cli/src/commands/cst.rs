use tagql_lib::ast::format_syntax;
use tagql_lib::parse;

use crate::cli::QueryArgs;
use crate::util::load_query;

pub fn run(query: &QueryArgs, raw: bool) {
    let text = load_query(query);
    let result = parse(&text);

    print!("{}", format_syntax(&result.syntax(), raw));

    if !result.diagnostics().is_empty() {
        eprintln!(
            "{}",
            result.diagnostics().printer().source(&text).render()
        );
    }
}

mod cli;
mod commands;
mod util;

use clap::Parser;

use cli::{Cli, Command};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Check {
            query,
            dialect,
            strict,
            color,
        } => commands::check::run(&query, &dialect.dialect, strict, color),
        Command::Cst { query, raw } => commands::cst::run(&query, raw),
        Command::Plan {
            query,
            dialect,
            compact,
            color,
        } => commands::plan::run(&query, &dialect.dialect, compact, color),
        Command::Annotate {
            query,
            dialect,
            compact,
        } => commands::annotate::run(&query, &dialect.dialect, compact),
        Command::Dialects => commands::dialects::run(),
    }
}

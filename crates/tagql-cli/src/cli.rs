use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

#[derive(Parser)]
#[command(name = "tagql", bin_name = "tagql")]
#[command(about = "Query-language compiler for tagged-media search")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a query, printing diagnostics
    #[command(after_help = r#"EXAMPLES:
  tagql check -q 'score>=8 & artist:"jane doe"'
  tagql check -q 'favorite:yes' -d illustration --strict
  tagql check --query-file query.tql"#)]
    Check {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        dialect: DialectArg,

        /// Treat warnings as failures
        #[arg(long)]
        strict: bool,

        /// Colorize output (auto-detected by default)
        #[arg(long, default_value = "auto", value_name = "WHEN")]
        color: ColorChoice,
    },

    /// Print the concrete syntax tree for a query
    #[command(after_help = r#"EXAMPLES:
  tagql cst -q 'tag1 -tag2 | tag3'
  tagql cst -q 'score>=8' --raw"#)]
    Cst {
        #[command(flatten)]
        query: QueryArgs,

        /// Include trivia tokens (whitespace)
        #[arg(long)]
        raw: bool,
    },

    /// Compile a query and print the executable filter as JSON
    #[command(after_help = r#"EXAMPLES:
  tagql plan -q 'score>=8 & artist:"jane doe"'
  tagql plan -q 'tag1 | tag2 order:score-' --compact"#)]
    Plan {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        dialect: DialectArg,

        /// One-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,

        /// Colorize diagnostics output
        #[arg(long, default_value = "auto", value_name = "WHEN")]
        color: ColorChoice,
    },

    /// Print the visual annotation stream as JSON
    #[command(after_help = r#"EXAMPLES:
  tagql annotate -q 'score>=abc'
  tagql annotate -q 'tag1 order:id' --compact"#)]
    Annotate {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        dialect: DialectArg,

        /// One-line JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// List the built-in dialects and their fields
    Dialects,
}

#[derive(Args)]
#[group(id = "query_input", multiple = false, required = true)]
pub struct QueryArgs {
    /// Query as inline text
    #[arg(short = 'q', long = "query", value_name = "QUERY")]
    pub query_text: Option<String>,

    /// Query from file (use "-" for stdin)
    #[arg(long = "query-file", value_name = "FILE")]
    pub query_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct DialectArg {
    /// Dialect to compile against
    #[arg(
        short = 'd',
        long = "dialect",
        value_name = "DIALECT",
        default_value = "illustration"
    )]
    pub dialect: String,
}

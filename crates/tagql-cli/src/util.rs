use std::fs;
use std::io::{self, Read};

use tagql_lib::{Dialect, builtin_dialects};

use crate::cli::QueryArgs;

pub fn load_query(args: &QueryArgs) -> String {
    if let Some(ref text) = args.query_text {
        return text.clone();
    }
    if let Some(ref path) = args.query_file {
        if path.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .expect("failed to read stdin");
            return buf;
        }
        return fs::read_to_string(path).expect("failed to read query file");
    }
    unreachable!("clap enforces one query input")
}

pub fn resolve_dialect(id: &str) -> &'static Dialect {
    builtin_dialects().lookup(id).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        eprintln!();
        eprintln!("Run 'tagql dialects' for the full list.");
        std::process::exit(2);
    })
}

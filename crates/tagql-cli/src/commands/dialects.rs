use tagql_lib::builtin_dialects;

pub fn run() {
    for (i, dialect) in builtin_dialects().iter().enumerate() {
        if i > 0 {
            println!();
        }
        if dialect.aliases().is_empty() {
            println!("{}", dialect.id());
        } else {
            println!("{} (alias: {})", dialect.id(), dialect.aliases().join(", "));
        }

        for (name, spec) in dialect.fields() {
            let mut flags = String::new();
            if spec.multivalued {
                flags.push_str("  multi");
            }
            if spec.sortable {
                flags.push_str("  sortable");
            }
            let values = if spec.enum_values.is_empty() {
                String::new()
            } else {
                let members: Vec<&str> =
                    spec.enum_values.iter().map(|e| e.name.as_str()).collect();
                format!("  [{}]", members.join(", "))
            };
            println!(
                "  {:<20} {:<8} ops {}{}{}",
                name,
                spec.value_type.to_string(),
                spec.operators.describe(),
                flags,
                values
            );
        }
    }
}

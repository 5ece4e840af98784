//! Built-in dialects for the media server's entity kinds.
//!
//! These mirror the server's data model: illustrations, books, authors and
//! topics each expose their own searchable fields. Field entries list the
//! canonical name first, then its shorthand aliases.

use super::{Dialect, EnumEntry, FieldSpec, OperatorSet, ValueType};

fn number_field() -> FieldSpec {
    FieldSpec {
        value_type: ValueType::Integer,
        multivalued: false,
        operators: OperatorSet::ALL,
        enum_values: Vec::new(),
        sortable: true,
    }
}

fn decimal_field() -> FieldSpec {
    FieldSpec {
        value_type: ValueType::Decimal,
        multivalued: false,
        operators: OperatorSet::ALL,
        enum_values: Vec::new(),
        sortable: true,
    }
}

fn date_field() -> FieldSpec {
    FieldSpec {
        value_type: ValueType::Date,
        multivalued: false,
        operators: OperatorSet::ALL,
        enum_values: Vec::new(),
        sortable: true,
    }
}

fn string_field() -> FieldSpec {
    FieldSpec {
        value_type: ValueType::String,
        multivalued: false,
        operators: OperatorSet::EQUALITY,
        enum_values: Vec::new(),
        sortable: false,
    }
}

fn flag_field() -> FieldSpec {
    FieldSpec {
        value_type: ValueType::Boolean,
        multivalued: false,
        operators: OperatorSet::EQUALITY,
        enum_values: Vec::new(),
        sortable: false,
    }
}

fn enum_field(values: &[EnumEntry]) -> FieldSpec {
    FieldSpec {
        value_type: ValueType::Enum,
        multivalued: true,
        operators: OperatorSet::EQUALITY,
        enum_values: values.to_vec(),
        sortable: false,
    }
}

/// Multivalued string, matched with `:` / `=`; the shape of tag collections.
fn tag_field() -> FieldSpec {
    FieldSpec {
        value_type: ValueType::String,
        multivalued: true,
        operators: OperatorSet::EQUALITY,
        enum_values: Vec::new(),
        sortable: false,
    }
}

pub(super) fn illustration() -> Dialect {
    Dialect::builder("illustration")
        .alias("illust")
        .field(&["tag"], tag_field())
        .field(&["artist"], tag_field())
        .field(&["favorite", "f"], flag_field())
        .field(&["book-member", "bm"], flag_field())
        .field(&["id"], number_field())
        .field(&["score", "s"], decimal_field())
        .field(&["partition", "pt"], date_field())
        .field(&["ordinal", "ord"], date_field())
        .field(&["create-time", "create", "ct"], date_field())
        .field(&["update-time", "update", "ut"], date_field())
        .field(&["description", "desc"], string_field())
        .field(&["extension", "ext"], string_field())
        .field(&["filesize", "size"], number_field())
        .field(&["source-id"], number_field())
        .field(&["source-site"], string_field())
        .field(&["source-description"], string_field())
        .field(
            &["tagme"],
            enum_field(&[
                EnumEntry::new("TAG", &[]),
                EnumEntry::new("AUTHOR", &[]),
                EnumEntry::new("TOPIC", &[]),
                EnumEntry::new("SOURCE", &[]),
            ]),
        )
        .default_tag_field("tag")
        .build()
}

pub(super) fn book() -> Dialect {
    Dialect::builder("book")
        .field(&["tag"], tag_field())
        .field(&["id"], number_field())
        .field(&["title"], string_field())
        .field(&["favorite", "f"], flag_field())
        .field(&["score", "s"], decimal_field())
        .field(&["image-count", "count"], number_field())
        .field(&["create-time", "create", "ct"], date_field())
        .field(&["update-time", "update", "ut"], date_field())
        .default_tag_field("tag")
        .build()
}

pub(super) fn author() -> Dialect {
    Dialect::builder("author")
        .field(&["tag"], tag_field())
        .field(&["id"], number_field())
        .field(&["name"], string_field())
        .field(&["score", "s"], decimal_field())
        .field(&["favorite", "f"], flag_field())
        .field(&["count"], number_field())
        .field(
            &["type"],
            enum_field(&[
                EnumEntry::new("artist", &[]),
                EnumEntry::new("studio", &[]),
                EnumEntry::new("publisher", &[]),
            ]),
        )
        .field(&["create-time", "create", "ct"], date_field())
        .field(&["update-time", "update", "ut"], date_field())
        .default_tag_field("tag")
        .build()
}

pub(super) fn topic() -> Dialect {
    Dialect::builder("topic")
        .field(&["tag"], tag_field())
        .field(&["id"], number_field())
        .field(&["name"], string_field())
        .field(&["score", "s"], decimal_field())
        .field(&["favorite", "f"], flag_field())
        .field(&["count"], number_field())
        .field(
            &["type"],
            enum_field(&[
                EnumEntry::new("copyright", &["c"]),
                EnumEntry::new("ip", &[]),
                EnumEntry::new("character", &["chr"]),
            ]),
        )
        .field(&["parent"], string_field())
        .field(&["create-time", "create", "ct"], date_field())
        .field(&["update-time", "update", "ut"], date_field())
        .default_tag_field("tag")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::CompareOp;

    #[test]
    fn illustration_catalog_shape() {
        let d = illustration();
        assert_eq!(d.id(), "illustration");

        let (_, score) = d.resolve_field("score").unwrap();
        assert_eq!(score.value_type, ValueType::Decimal);
        assert!(score.operators.contains(CompareOp::GreaterEq));
        assert!(score.sortable);

        let (_, artist) = d.resolve_field("artist").unwrap();
        assert_eq!(artist.value_type, ValueType::String);
        assert!(artist.multivalued);
        assert!(!artist.operators.contains(CompareOp::Less));

        let (_, tagme) = d.resolve_field("tagme").unwrap();
        assert_eq!(tagme.value_type, ValueType::Enum);
        assert_eq!(tagme.enum_values.len(), 4);
    }

    #[test]
    fn every_builtin_has_sortable_fields() {
        for d in [illustration(), book(), author(), topic()] {
            let sortable = d.fields().filter(|(_, s)| s.sortable).count();
            assert!(sortable >= 2, "{} has too few sortable fields", d.id());
        }
    }
}

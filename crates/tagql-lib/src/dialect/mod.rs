//! Dialect registry: the per-entity-kind field vocabulary.
//!
//! A dialect is pure data - field names, value types, allowed operators,
//! enumeration members. The lexer and parser never see it; only the semantic
//! analyzer reads it. Adding an entity kind is a catalog change, not a
//! compiler change.

mod catalog;

use indexmap::IndexMap;
use serde::Serialize;

use crate::syntax::kind::SyntaxKind;
use crate::{Error, Result};

/// Declared value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Enum,
    Integer,
    Decimal,
    Date,
    Boolean,
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Enum => "enum",
            ValueType::Integer => "integer",
            ValueType::Decimal => "decimal",
            ValueType::Date => "date",
            ValueType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

impl ValueType {
    pub fn describe(self) -> &'static str {
        match self {
            ValueType::String => "a string",
            ValueType::Enum => "an enumeration member",
            ValueType::Integer => "an integer",
            ValueType::Decimal => "a number",
            ValueType::Date => "a date",
            ValueType::Boolean => "a boolean",
        }
    }
}

/// A comparison operator as written in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompareOp {
    /// `:` - membership / match.
    #[serde(rename = ":")]
    Match,
    /// `=` - exact equality.
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEq,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEq,
}

impl CompareOp {
    pub fn from_kind(kind: SyntaxKind) -> Option<Self> {
        match kind {
            SyntaxKind::Colon => Some(Self::Match),
            SyntaxKind::Eq => Some(Self::Equal),
            SyntaxKind::Gt => Some(Self::Greater),
            SyntaxKind::GtEq => Some(Self::GreaterEq),
            SyntaxKind::Lt => Some(Self::Less),
            SyntaxKind::LtEq => Some(Self::LessEq),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Match => ":",
            Self::Equal => "=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Less => "<",
            Self::LessEq => "<=",
        }
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::Greater | Self::GreaterEq | Self::Less | Self::LessEq
        )
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of allowed operators, a small bitset over [`CompareOp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorSet(u8);

impl OperatorSet {
    pub const EMPTY: OperatorSet = OperatorSet(0);
    /// `:` and `=`.
    pub const EQUALITY: OperatorSet = OperatorSet::new(&[CompareOp::Match, CompareOp::Equal]);
    /// `>`, `>=`, `<`, `<=`.
    pub const ORDERING: OperatorSet = OperatorSet::new(&[
        CompareOp::Greater,
        CompareOp::GreaterEq,
        CompareOp::Less,
        CompareOp::LessEq,
    ]);
    pub const ALL: OperatorSet = Self::EQUALITY.union(Self::ORDERING);

    #[inline]
    pub const fn new(ops: &[CompareOp]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < ops.len() {
            bits |= 1 << ops[i] as u8;
            i += 1;
        }
        OperatorSet(bits)
    }

    #[inline]
    pub const fn contains(&self, op: CompareOp) -> bool {
        self.0 & (1 << op as u8) != 0
    }

    #[inline]
    pub const fn union(self, other: OperatorSet) -> OperatorSet {
        OperatorSet(self.0 | other.0)
    }

    /// Human-readable listing for diagnostics, e.g. `:`, `=`.
    pub fn describe(&self) -> String {
        const ALL_OPS: [CompareOp; 6] = [
            CompareOp::Match,
            CompareOp::Equal,
            CompareOp::Greater,
            CompareOp::GreaterEq,
            CompareOp::Less,
            CompareOp::LessEq,
        ];
        let mut out = String::new();
        for op in ALL_OPS {
            if self.contains(op) {
                if !out.is_empty() {
                    out.push_str(", ");
                }
                out.push('`');
                out.push_str(op.as_str());
                out.push('`');
            }
        }
        out
    }
}

/// One member of an enum-typed field's value set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    /// Canonical name, the one that reaches the filter.
    pub name: String,
    pub aliases: Vec<String>,
}

impl EnumEntry {
    pub fn new(name: &str, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Case-insensitive match against the canonical name or any alias.
    pub fn matches(&self, text: &str) -> bool {
        self.name.eq_ignore_ascii_case(text)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(text))
    }

    /// Case-insensitive prefix match against the canonical name or any alias.
    pub fn matches_prefix(&self, text: &str) -> bool {
        let text = text.to_ascii_lowercase();
        self.name.to_ascii_lowercase().starts_with(&text)
            || self
                .aliases
                .iter()
                .any(|a| a.to_ascii_lowercase().starts_with(&text))
    }
}

/// Everything the analyzer needs to know about one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub value_type: ValueType,
    pub multivalued: bool,
    pub operators: OperatorSet,
    /// Only populated for `ValueType::Enum`.
    pub enum_values: Vec<EnumEntry>,
    pub sortable: bool,
}

/// A named vocabulary of fields for one entity kind.
#[derive(Debug, Clone)]
pub struct Dialect {
    id: String,
    aliases: Vec<String>,
    /// Canonical lowercase field name -> spec. Insertion order is the
    /// presentation order, hence the index map.
    fields: IndexMap<String, FieldSpec>,
    /// Lowercase alias -> canonical field name.
    field_aliases: IndexMap<String, String>,
    default_tag_field: String,
}

impl Dialect {
    pub fn builder(id: &str) -> DialectBuilder {
        DialectBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn matches_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(id))
    }

    /// Case-insensitive, alias-aware lookup of a dotted field path.
    /// Returns the canonical name alongside the spec.
    pub fn resolve_field(&self, path: &str) -> Option<(&str, &FieldSpec)> {
        let key = path.to_ascii_lowercase();
        let canonical = match self.fields.get_key_value(&key) {
            Some((name, spec)) => return Some((name.as_str(), spec)),
            None => self.field_aliases.get(&key)?,
        };
        let (name, spec) = self.fields.get_key_value(canonical)?;
        Some((name.as_str(), spec))
    }

    /// Iterates fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// All recognized spellings: canonical names and aliases.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .keys()
            .map(String::as_str)
            .chain(self.field_aliases.keys().map(String::as_str))
    }

    /// The field bare tags resolve against.
    pub fn default_tag_field(&self) -> (&str, &FieldSpec) {
        let (name, spec) = self
            .fields
            .get_key_value(&self.default_tag_field)
            .expect("default tag field is validated at build time");
        (name.as_str(), spec)
    }
}

/// Builder for [`Dialect`]; the first name of each field is canonical,
/// the rest are aliases.
pub struct DialectBuilder {
    id: String,
    aliases: Vec<String>,
    fields: IndexMap<String, FieldSpec>,
    field_aliases: IndexMap<String, String>,
    default_tag_field: Option<String>,
}

impl DialectBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_ascii_lowercase(),
            aliases: Vec::new(),
            fields: IndexMap::new(),
            field_aliases: IndexMap::new(),
            default_tag_field: None,
        }
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_ascii_lowercase());
        self
    }

    pub fn field(mut self, names: &[&str], spec: FieldSpec) -> Self {
        let (canonical, aliases) = names
            .split_first()
            .expect("a field needs at least one name");
        let canonical = canonical.to_ascii_lowercase();
        for alias in aliases {
            self.field_aliases
                .insert(alias.to_ascii_lowercase(), canonical.clone());
        }
        self.fields.insert(canonical, spec);
        self
    }

    /// Marks an already-registered field as the default tag field.
    pub fn default_tag_field(mut self, name: &str) -> Self {
        self.default_tag_field = Some(name.to_ascii_lowercase());
        self
    }

    pub fn build(self) -> Dialect {
        let default_tag_field = self
            .default_tag_field
            .expect("a dialect needs a default tag field");
        assert!(
            self.fields.contains_key(&default_tag_field),
            "default tag field `{default_tag_field}` is not registered"
        );
        Dialect {
            id: self.id,
            aliases: self.aliases,
            fields: self.fields,
            field_aliases: self.field_aliases,
            default_tag_field,
        }
    }
}

/// Process-lifetime collection of dialects, read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: Vec<Dialect>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in entity catalog: illustration, book, author, topic.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(catalog::illustration());
        registry.register(catalog::book());
        registry.register(catalog::author());
        registry.register(catalog::topic());
        registry
    }

    pub fn register(&mut self, dialect: Dialect) {
        self.dialects.push(dialect);
    }

    /// The one failing operation of the compiler surface: an unknown dialect
    /// identifier aborts before lexing, since no vocabulary exists to resolve
    /// or even annotate against.
    pub fn lookup(&self, id: &str) -> Result<&Dialect> {
        self.dialects
            .iter()
            .find(|d| d.matches_id(id))
            .ok_or_else(|| Error::UnknownDialect(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dialect> {
        self.dialects.iter()
    }
}

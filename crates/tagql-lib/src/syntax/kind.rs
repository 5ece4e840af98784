//! Syntax kinds for the query language.
//!
//! This module defines all token and node kinds used in the syntax tree,
//! along with a `TokenSet` bitset for efficient membership testing in the parser.
//!
//! ## Architecture
//!
//! The `SyntaxKind` enum has a dual role:
//! - Token kinds (terminals): produced by the lexer, represent atomic text spans
//! - Node kinds (non-terminals): created by the parser, represent composite structures
//!
//! Rowan requires a `Language` trait implementation to convert between our `SyntaxKind`
//! and its internal `rowan::SyntaxKind` (a newtype over `u16`). That's what `QueryLang`
//! provides.
//!
//! Logos is derived directly on this enum; node kinds simply lack token/regex attributes.

use logos::Logos;
use rowan::Language;

/// All kinds of tokens and nodes in the syntax tree.
///
/// ## Layout
///
/// Variants are ordered: tokens first, then nodes, then `__LAST` sentinel.
/// The `#[repr(u16)]` ensures we can safely transmute from the discriminant.
///
/// ## Token vs Node distinction
///
/// The parser only ever builds nodes; tokens come from the lexer.
/// A token's text is sliced from source on demand via its span.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SyntaxKind {
    #[token(":")]
    Colon = 0,

    #[token("=")]
    Eq,

    /// Must be matched in full; logos prefers the longest match over `>`.
    #[token(">=")]
    GtEq,

    #[token(">")]
    Gt,

    #[token("<=")]
    LtEq,

    #[token("<")]
    Lt,

    #[token("-")]
    Minus,

    #[token("+")]
    Plus,

    #[token("&")]
    Ampersand,

    #[token("|")]
    Pipe,

    #[token(".")]
    Dot,

    #[token(",")]
    Comma,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    /// Sort clause marker. Beats `Word` + `Colon` on match length, so a field
    /// actually named `order` cannot exist; the sort clause owns that spelling.
    #[token("order:", ignore(case))]
    SortMarker,

    /// Quoted string literal: double, single, or backtick quotes.
    /// Escapes cover the backslash, all three quote characters, and `\n` `\t` `\r`.
    #[regex(r#""(?:[^"\\]|\\.)*""#)]
    #[regex(r"'(?:[^'\\]|\\.)*'")]
    #[regex(r"`(?:[^`\\]|\\.)*`")]
    Str,

    /// A quote that never closes; runs to end of input so downstream stages
    /// can still use its content.
    #[regex(r#""(?:[^"\\]|\\.)*"#)]
    #[regex(r"'(?:[^'\\]|\\.)*")]
    #[regex(r"`(?:[^`\\]|\\.)*")]
    UnterminatedStr,

    /// Calendar date literal `YYYY-MM-DD`. Outranks `Word` by priority; the
    /// lexer only checks the shape, range validation happens during analysis.
    #[regex(r"[0-9]{4}-[0-9]{2}-[0-9]{2}", priority = 10)]
    Date,

    #[regex(r"[0-9]+\.[0-9]+", priority = 6)]
    Decimal,

    #[regex(r"[0-9]+", priority = 5)]
    Number,

    /// Bare word: tag names, field names, unquoted values.
    /// Interior `-`/`+` runs are allowed (`create-time`) but must be followed
    /// by more word characters, so a trailing `-` stays its own token and a
    /// sort direction suffix like `score-` splits into `score` and `-`.
    #[regex(r"[A-Za-z0-9_?*^][A-Za-z0-9_?*!]*(?:[+\-][A-Za-z0-9_?*!]+)*", priority = 3)]
    Word,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// Consecutive unrecognized characters coalesced into one token.
    UnexpectedFragment,

    /// Generic error kind: EOF sentinel for the parser, and the node kind
    /// wrapping skipped tokens during recovery.
    Error,

    /// Root node containing the entire query.
    Query,
    /// N-ary disjunction: `a | b | c`.
    OrExpr,
    /// N-ary conjunction, explicit `&` or juxtaposition: `a b`, `a & b`.
    AndExpr,
    /// Negation: `-a`.
    NotExpr,
    /// Parenthesized group: `(a | b)`.
    Group,
    /// Field comparison: `score>=8`, `author.name:x`.
    FieldTerm,
    /// Dotted field path inside a `FieldTerm`: `author.name`.
    FieldPath,
    /// The literal on the right side of a comparison.
    Value,
    /// A bare literal resolved against the dialect's default tag field.
    SimpleTag,
    /// Sort clause: `order:score-,partition`.
    SortClause,
    /// One entry of a sort clause: `score-`.
    SortField,

    // Must be last - used for bounds checking in `kind_from_raw`
    #[doc(hidden)]
    __LAST,
}

use SyntaxKind::*;

impl SyntaxKind {
    /// Returns `true` if this is a trivia token. Trivia is buffered during
    /// parsing and attached as leading trivia, keeping the CST lossless.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace)
    }

    /// Returns `true` if this is an error token.
    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Error | UnexpectedFragment)
    }

    /// Returns `true` for the literal token kinds a value or tag can be made of.
    #[inline]
    pub fn is_literal(self) -> bool {
        matches!(self, Str | UnterminatedStr | Date | Decimal | Number | Word)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    #[inline]
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language tag for parameterizing Rowan's tree types.
///
/// This is a zero-sized enum (uninhabited) used purely as a type-level marker.
/// Rowan uses it to associate syntax trees with our `SyntaxKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QueryLang {}

impl Language for QueryLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < __LAST as u16);
        // SAFETY: We've verified the value is in bounds, and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<QueryLang>;
pub type SyntaxToken = rowan::SyntaxToken<QueryLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// A set of `SyntaxKind`s implemented as a 64-bit bitset.
///
/// Used throughout the parser for O(1) membership testing of FIRST/RECOVERY
/// sets. The limitation is 64 variants max, enforced by asserts in `new()`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Creates an empty token set.
    pub const EMPTY: TokenSet = TokenSet(0);

    /// Creates a token set from a slice of kinds.
    ///
    /// Panics at compile time if any kind's discriminant >= 64.
    #[inline]
    pub const fn new(kinds: &[SyntaxKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            let kind = kinds[i] as u16;
            assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
            bits |= 1 << kind;
            i += 1;
        }
        TokenSet(bits)
    }

    /// Creates a token set containing exactly one kind.
    #[inline]
    pub const fn single(kind: SyntaxKind) -> Self {
        let kind = kind as u16;
        assert!(kind < 64, "SyntaxKind value exceeds TokenSet capacity");
        TokenSet(1 << kind)
    }

    /// Returns `true` if the set contains the given kind.
    #[inline]
    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        if kind >= 64 {
            return false;
        }
        self.0 & (1 << kind) != 0
    }

    /// Returns the union of two token sets.
    #[inline]
    pub const fn union(self, other: TokenSet) -> TokenSet {
        TokenSet(self.0 | other.0)
    }
}

impl std::fmt::Debug for TokenSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_set();
        for i in 0..64u16 {
            if self.0 & (1 << i) != 0 && i < __LAST as u16 {
                let kind: SyntaxKind = unsafe { std::mem::transmute(i) };
                list.entry(&kind);
            }
        }
        list.finish()
    }
}

/// Pre-defined token sets used throughout the parser.
///
/// Recovery sets follow the resilient-parsing approach: when the parser
/// encounters an unexpected token, it consumes tokens until it finds one in
/// the recovery set (typically the FOLLOW set of ancestor productions).
/// This prevents cascading errors and allows parsing to continue.
pub mod token_sets {
    use super::*;

    /// Tokens that can start an expression (FIRST set of `element` plus `-`).
    pub const EXPR_FIRST: TokenSet = TokenSet::new(&[
        Minus,
        ParenOpen,
        Str,
        UnterminatedStr,
        Date,
        Decimal,
        Number,
        Word,
    ]);

    /// Tokens that can appear as the right side of a comparison.
    pub const VALUE_FIRST: TokenSet =
        TokenSet::new(&[Str, UnterminatedStr, Date, Decimal, Number, Word]);

    /// The comparison operators.
    pub const CMP_OPS: TokenSet = TokenSet::new(&[Colon, Eq, Gt, GtEq, Lt, LtEq]);

    /// Tokens the parser synchronizes on during panic-mode recovery.
    pub const SYNC: TokenSet = TokenSet::new(&[Pipe, ParenClose, Comma, SortMarker]);

    /// Sort direction suffixes.
    pub const SORT_DIRECTIONS: TokenSet = TokenSet::new(&[Plus, Minus]);

    /// Trivia tokens.
    pub const TRIVIA: TokenSet = TokenSet::new(&[Whitespace]);
}

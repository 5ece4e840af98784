//! Resilient LL parser for the query language.
//!
//! # Architecture
//!
//! The parser produces a lossless concrete syntax tree (CST) via Rowan's green
//! tree builder:
//!
//! - Zero-copy parsing: tokens carry spans, text sliced only when building tree nodes
//! - Trivia buffering: whitespace collected, then attached as leading trivia
//! - Checkpoint-based wrapping: `OrExpr`/`AndExpr` wrap their first operand
//!   retroactively once a connective shows up
//! - Panic-mode recovery: per-production synchronization on `|`, `)`, `,`,
//!   the sort marker, and end of input
//!
//! The parser never fails and never consults dialect data — one grammar serves
//! every entity kind. Errors are recorded as diagnostics and also represented
//! as `SyntaxKind::Error` nodes in the tree, so the tree stays lossless even
//! for garbage input.
//!
//! # Grammar (EBNF-ish)
//!
//! ```text
//! query      = [expr] [sort_clause]
//! expr       = or_expr
//! or_expr    = and_expr ("|" and_expr)*
//! and_expr   = unary (["&"] unary)*         ; juxtaposition = implicit AND
//! unary      = "-" unary | element
//! element    = "(" expr ")" | field_term | simple_tag
//! field_term = WORD ("." WORD)* cmp_op value
//! cmp_op     = ":" | "=" | ">" | ">=" | "<" | "<="
//! value      = STRING | NUMBER | DECIMAL | DATE | WORD
//! simple_tag = STRING | NUMBER | DECIMAL | DATE | WORD
//! sort_clause = SORT_MARKER sort_field ("," sort_field)*
//! sort_field = WORD ["+" | "-"]
//! ```

mod core;
mod grammar;

use rowan::GreenNode;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::syntax::kind::{SyntaxKind, SyntaxNode};
use crate::syntax::lexer::lex;

use core::Parser;

/// Stack depth limit. Queries nest via groups and `-` chains; 128 handles any
/// human-written input while keeping malicious input from overflowing the stack.
const MAX_DEPTH: u32 = 128;

/// Parse result containing the green tree and accumulated diagnostics.
///
/// The tree is always complete — errors are recorded separately and also
/// represented as `SyntaxKind::Error` nodes in the tree itself.
#[derive(Debug, Clone)]
pub struct Parse {
    pub(crate) green: GreenNode,
    pub(crate) diagnostics: Diagnostics,
}

impl Parse {
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Creates a typed view over the immutable green tree.
    /// This is cheap — `SyntaxNode` is a thin wrapper with parent pointers.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn into_parts(self) -> (GreenNode, Diagnostics) {
        (self.green, self.diagnostics)
    }
}

/// Main entry point. Always succeeds — errors are embedded in the returned tree.
pub fn parse(source: &str) -> Parse {
    let tokens = lex(source);

    // Lexical recovery tokens are reported once, up front; the grammar then
    // treats them like ordinary tokens so spans stay covered.
    let mut diagnostics = Diagnostics::new();
    for token in &tokens {
        match token.kind {
            SyntaxKind::UnterminatedStr => diagnostics
                .report(DiagnosticKind::UnterminatedString, token.span)
                .emit(),
            SyntaxKind::UnexpectedFragment => diagnostics
                .report(DiagnosticKind::UnexpectedCharacters, token.span)
                .emit(),
            _ => {}
        }
    }

    let mut parser = Parser::new(source, tokens, diagnostics);
    parser.parse_query();
    parser.finish()
}

#[cfg(test)]
mod tests;

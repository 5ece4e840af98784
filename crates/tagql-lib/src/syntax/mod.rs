//! Lexical layer: syntax kinds, the lexer, and Rowan type aliases.

pub mod kind;
pub mod lexer;

pub use kind::{QueryLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken, TokenSet};
pub use lexer::{Token, lex, token_text};
